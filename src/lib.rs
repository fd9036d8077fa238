//! Swap Aggregator
//!
//! Provider integration and error-normalization layer for DEX swap
//! meta-aggregation: per-chain endpoint routing, normalized price/quote
//! models, and a uniform upstream error taxonomy that lets the routing
//! layer apply the same retry and fallback logic across providers.

// Core domain types - the most commonly used types
pub use swap_types::{
	price_quotient,
	// External dependency for convenience
	serde_json,
	AggregationProvider,
	ChainEndpoints,
	ErrorRecord,
	Provider,
	// Error types
	ProviderError,
	ProviderPriceResponse,
	ProviderQuoteResponse,
	ProviderResult,
	SwapRequest,
	SwapSource,
	TokenAmount,
	UpstreamFailure,
};

// Provider layer
pub use swap_providers::{
	ClientCache, ClientConfig, FibrousProvider, OpenOceanProvider, ProviderRegistry,
};

// Config
pub use swap_config::{init_tracing, load_config, Settings};

// Module aliases for downstream consumers
pub mod models {
	pub use swap_types::*;
}

pub mod providers {
	pub use swap_providers::*;
}

pub mod config {
	pub use swap_config::*;
}

pub mod mocks;

// Re-export external dependencies for tests and downstream consumers
pub use async_trait;
pub use reqwest;
