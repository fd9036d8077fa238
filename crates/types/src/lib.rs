//! Swap Types
//!
//! Shared models and traits for the swap meta-aggregation provider layer.
//! This crate contains all domain models organized by business entity.

pub mod models;
pub mod providers;

// Re-export serde_json for convenience
pub use serde_json;

// Re-export commonly used types for convenience
pub use models::TokenAmount;

pub use providers::{
	price_quotient, AggregationProvider, ChainEndpoints, ErrorRecord, Provider, ProviderError,
	ProviderPriceResponse, ProviderQuoteResponse, ProviderResult, ProviderValidationError,
	ProviderValidationResult, SwapRequest, SwapSource, UpstreamFailure,
};
