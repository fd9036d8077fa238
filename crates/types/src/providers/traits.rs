//! Core provider trait implemented by every upstream integration

use super::{Provider, ProviderResult};
use crate::providers::models::{ProviderPriceResponse, ProviderQuoteResponse, SwapRequest};
use async_trait::async_trait;
use std::fmt::Debug;

/// Core trait for DEX-aggregator provider implementations
///
/// One type per upstream. The orchestration layer holds a mapping from
/// provider name to instance and dispatches through this trait.
#[async_trait]
pub trait AggregationProvider: Send + Sync + Debug {
	/// Static identity descriptor for this provider
	fn provider_info(&self) -> &Provider;

	/// Provider name used for registration and response attribution
	fn name(&self) -> &str {
		&self.provider_info().name
	}

	/// Human-readable display name
	fn display_name(&self) -> &str {
		&self.provider_info().display_name
	}

	/// Look up the best obtainable price for a swap
	///
	/// Upstream failures are classified into the provider error taxonomy;
	/// raw transport or parsing errors never escape.
	async fn get_swap_price(&self, request: &SwapRequest)
		-> ProviderResult<ProviderPriceResponse>;

	/// Look up an executable quote for a swap
	///
	/// Requires `taker_address` on the request; rejected before any network
	/// call when it is missing.
	async fn get_swap_quote(&self, request: &SwapRequest)
		-> ProviderResult<ProviderQuoteResponse>;

	/// Probe upstream health for one chain
	///
	/// Never returns an error: callers poll many providers and one failing
	/// probe must not abort the sweep.
	async fn health_check(&self, chain_id: u64) -> bool;
}
