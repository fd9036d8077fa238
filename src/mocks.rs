//! Mock provider for examples and testing
//!
//! A simple, working provider that can be used in tests without network
//! access or complex dependencies.

use async_trait::async_trait;
use swap_types::{
	price_quotient, AggregationProvider, Provider, ProviderError, ProviderPriceResponse,
	ProviderQuoteResponse, ProviderResult, SwapRequest, SwapSource, TokenAmount,
};

/// Canned-response provider for tests and examples
#[derive(Debug, Clone)]
pub struct MockProvider {
	info: Provider,
}

impl MockProvider {
	pub fn new() -> Self {
		Self {
			info: Provider::new(
				"mock-demo".to_string(),
				"Mock Demo Provider".to_string(),
				"1.0.0".to_string(),
			),
		}
	}
}

impl Default for MockProvider {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl AggregationProvider for MockProvider {
	fn provider_info(&self) -> &Provider {
		&self.info
	}

	async fn get_swap_price(
		&self,
		request: &SwapRequest,
	) -> ProviderResult<ProviderPriceResponse> {
		// Echo the sell amount back as the buy amount: price 1, one venue
		let buy_amount = request.sell_amount.clone();
		let price = match (buy_amount.to_decimal(), request.sell_amount.to_decimal()) {
			(Ok(buy), Ok(sell)) => price_quotient(buy, sell).to_string(),
			_ => "0".to_string(),
		};

		Ok(ProviderPriceResponse {
			provider: self.info.name.clone(),
			sources: vec![SwapSource::new("MockSwap", 100.0)],
			buy_amount,
			sell_amount: request.sell_amount.clone(),
			gas: TokenAmount::from("21000"),
			gas_price: TokenAmount::zero(),
			value: TokenAmount::zero(),
			price,
			allowance_target: None,
		})
	}

	async fn get_swap_quote(
		&self,
		request: &SwapRequest,
	) -> ProviderResult<ProviderQuoteResponse> {
		if request.taker_address.is_none() {
			return Err(ProviderError::InvalidRequest {
				reason: "taker_address is required for a mock quote".to_string(),
			});
		}

		let price = self.get_swap_price(request).await?;

		Ok(ProviderQuoteResponse {
			provider: price.provider,
			sources: price.sources,
			buy_amount: price.buy_amount,
			sell_amount: price.sell_amount,
			gas: price.gas,
			gas_price: price.gas_price,
			value: price.value,
			price: price.price,
			to: "0x1111111111111111111111111111111111111111".to_string(),
			data: "0x".to_string(),
			allowance_target: None,
		})
	}

	async fn health_check(&self, _chain_id: u64) -> bool {
		true
	}
}
