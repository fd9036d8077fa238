//! End-to-end tests for the OpenOcean provider against mock upstreams

mod mocks;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use swap_aggregator::{
	AggregationProvider, OpenOceanProvider, ProviderError, Settings, SwapRequest, SwapSource,
	TokenAmount,
};

use mocks::upstream::MockUpstream;
use mocks::{default_settings, settings_with_timeout};

fn provider_for(upstream: &MockUpstream, settings: Arc<Settings>) -> OpenOceanProvider {
	OpenOceanProvider::without_cache(settings).with_base_url(upstream.base_url.clone())
}

fn price_request() -> SwapRequest {
	SwapRequest::new(
		"0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
		"0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
		TokenAmount::from("1000000000000000000"),
		1,
	)
}

#[tokio::test]
async fn swap_price_is_decimals_aware() {
	let upstream = MockUpstream::spawn_json(
		StatusCode::OK,
		json!({
			"inAmount": "1000000000000000000",
			"outAmount": "2000000",
			"estimatedGas": "210000",
			"inToken": {"address": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", "decimals": 18},
			"outToken": {"address": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "decimals": 6},
			"path": {
				"routes": [{
					"subRoutes": [{
						"dexes": [{"dex": "UniswapV3", "percentage": 100.0}],
					}],
				}],
			},
		}),
	)
	.await;
	let provider = provider_for(&upstream, default_settings());

	let response = provider.get_swap_price(&price_request()).await.unwrap();

	assert_eq!(response.provider, "openocean");
	assert_eq!(response.buy_amount.as_str(), "2000000");
	assert_eq!(response.sell_amount.as_str(), "1000000000000000000");
	// 1 WETH (18 decimals) -> 2 USDC (6 decimals): price 2, not 2e-12
	assert_eq!(response.price, "2");
	assert_eq!(response.value.as_str(), "0");
	assert_eq!(response.sources, vec![SwapSource::new("UniswapV3", 100.0)]);
}

#[tokio::test]
async fn swap_quote_returns_transaction_fields() {
	let upstream = MockUpstream::spawn_json(
		StatusCode::OK,
		json!({
			"inAmount": "1000000000000000000",
			"outAmount": "2000000",
			"estimatedGas": "210000",
			"gasPrice": "30000000000",
			"value": "0",
			"to": "0x6352a56caadC4F1E25CD6c75970Fa768A3304e64",
			"data": "0x90411a32",
			"inToken": {"address": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", "decimals": 18},
			"outToken": {"address": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "decimals": 6},
		}),
	)
	.await;
	let provider = provider_for(&upstream, default_settings());
	let request = price_request().with_taker("0x742d35Cc6634C0532925a3b8D38BA2297C33A9D7");

	let quote = provider.get_swap_quote(&request).await.unwrap();

	assert_eq!(quote.to, "0x6352a56caadC4F1E25CD6c75970Fa768A3304e64");
	assert_eq!(quote.data, "0x90411a32");
	assert_eq!(quote.gas_price.as_str(), "30000000000");
	assert_eq!(quote.price, "2");
}

#[tokio::test]
async fn missing_required_field_is_malformed_response() {
	// No `data` field in the swap response
	let upstream = MockUpstream::spawn_json(
		StatusCode::OK,
		json!({
			"inAmount": "1000000000000000000",
			"outAmount": "2000000",
			"estimatedGas": "210000",
			"gasPrice": "30000000000",
			"value": "0",
			"to": "0x6352a56caadC4F1E25CD6c75970Fa768A3304e64",
			"inToken": {"decimals": 18},
			"outToken": {"decimals": 6},
		}),
	)
	.await;
	let provider = provider_for(&upstream, default_settings());
	let request = price_request().with_taker("0x742d35Cc6634C0532925a3b8D38BA2297C33A9D7");

	let err = provider.get_swap_quote(&request).await.unwrap_err();

	match err {
		ProviderError::MalformedResponse(record) => {
			assert!(record.message.contains("data"));
		},
		other => panic!("expected MalformedResponse, got {}", other),
	}
}

#[tokio::test]
async fn error_body_falls_back_to_generic() {
	// No provider-specific pattern table: unmatched messages are generic
	let upstream = MockUpstream::spawn_json(
		StatusCode::BAD_REQUEST,
		json!({"error": "insufficient liquidity"}),
	)
	.await;
	let provider = provider_for(&upstream, default_settings());

	let err = provider.get_swap_price(&price_request()).await.unwrap_err();
	assert!(matches!(err, ProviderError::Aggregation(_)));
}

#[tokio::test]
async fn quote_without_taker_makes_no_network_calls() {
	let upstream = MockUpstream::spawn_json(StatusCode::OK, json!({})).await;
	let provider = provider_for(&upstream, default_settings());

	let err = provider.get_swap_quote(&price_request()).await.unwrap_err();
	assert!(matches!(err, ProviderError::InvalidRequest { .. }));
	assert_eq!(upstream.hit_count(), 0);
}

#[tokio::test]
async fn health_check_counts_reachable_upstream_as_healthy() {
	let upstream = MockUpstream::spawn_json(StatusCode::OK, json!({})).await;
	let provider = provider_for(&upstream, default_settings());
	assert!(provider.health_check(1).await);

	// A 4xx on the parameterless probe still means the API is up
	let upstream = MockUpstream::spawn_json(
		StatusCode::BAD_REQUEST,
		json!({"error": "amount is required"}),
	)
	.await;
	let provider = provider_for(&upstream, default_settings());
	assert!(provider.health_check(1).await);

	// Server errors and timeouts are unhealthy
	let upstream = MockUpstream::spawn_json(StatusCode::BAD_GATEWAY, json!({})).await;
	let provider = provider_for(&upstream, default_settings());
	assert!(!provider.health_check(1).await);

	let upstream = MockUpstream::spawn_with_delay(
		StatusCode::OK,
		json!({}),
		Duration::from_millis(500),
	)
	.await;
	let provider = provider_for(&upstream, settings_with_timeout(50));
	assert!(!provider.health_check(1).await);
}
