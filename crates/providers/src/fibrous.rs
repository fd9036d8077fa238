//! Fibrous Finance provider implementation
//!
//! Docs: https://docs.fibrous.finance/api-reference
//!
//! Supported networks: Base (8453), Scroll (534352), HyperEVM (999).
//! Endpoints: GET /route, GET /calldata, GET /healthCheck.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use swap_config::Settings;
use swap_types::{
	price_quotient, AggregationProvider, ChainEndpoints, Provider, ProviderError,
	ProviderPriceResponse, ProviderQuoteResponse, ProviderResult, SwapRequest, SwapSource,
	TokenAmount, UpstreamFailure,
};
use tracing::{debug, error};

use crate::classify::{classify, ErrorPatterns, PatternKind};
use crate::client_cache::{ClientCache, ClientConfig};
use crate::request::{execute, join_url};

/// Source tag attached to proxied upstream error bodies
const FIBROUS_SOURCE: &str = "proxied Fibrous API";

/// Ordered Fibrous error patterns; first match wins
const FIBROUS_ERRORS: ErrorPatterns = &[
	("insufficient liquidity", PatternKind::InsufficientLiquidity),
	("insufficient balance", PatternKind::InsufficientLiquidity),
	("cannot estimate", PatternKind::Estimation),
	("no route found", PatternKind::InsufficientLiquidity),
];

/// Client strategy for the Fibrous provider
#[derive(Debug)]
enum ClientStrategy {
	/// Use the shared client cache for connection pooling and reuse
	Cached(ClientCache),
	/// Create clients on-demand with no caching
	OnDemand,
}

/// Provider for the Fibrous Finance DEX aggregator
#[derive(Debug)]
pub struct FibrousProvider {
	info: Provider,
	endpoints: ChainEndpoints,
	settings: Arc<Settings>,
	client_strategy: ClientStrategy,
}

impl FibrousProvider {
	pub const NAME: &'static str = "fibrous";

	/// Create a new Fibrous provider with the shared client cache
	pub fn new(settings: Arc<Settings>) -> Self {
		Self::with_cache(settings, ClientCache::for_provider())
	}

	/// Create a Fibrous provider with a custom client cache
	pub fn with_cache(settings: Arc<Settings>, cache: ClientCache) -> Self {
		Self {
			info: Self::descriptor(),
			endpoints: Self::default_endpoints(),
			settings,
			client_strategy: ClientStrategy::Cached(cache),
		}
	}

	/// Create a Fibrous provider without client caching
	///
	/// Creates clients on-demand for each request. Simpler but less
	/// efficient than the cached approach.
	pub fn without_cache(settings: Arc<Settings>) -> Self {
		Self {
			info: Self::descriptor(),
			endpoints: Self::default_endpoints(),
			settings,
			client_strategy: ClientStrategy::OnDemand,
		}
	}

	/// Override the chain endpoint table (self-hosted gateways, tests)
	pub fn with_endpoints(mut self, endpoints: ChainEndpoints) -> Self {
		self.endpoints = endpoints;
		self
	}

	fn descriptor() -> Provider {
		Provider::new(
			Self::NAME.to_string(),
			"Fibrous Finance".to_string(),
			"1.0.0".to_string(),
		)
	}

	fn default_endpoints() -> ChainEndpoints {
		ChainEndpoints::new(
			Self::NAME,
			HashMap::from([
				(8453, "https://api.fibrous.finance/base".to_string()),
				(534352, "https://api.fibrous.finance/scroll".to_string()),
				(999, "https://api.fibrous.finance/hyperevm".to_string()),
			]),
		)
	}

	fn get_client(&self, base_url: &str) -> ProviderResult<Arc<reqwest::Client>> {
		let config = ClientConfig::for_provider(Self::NAME, base_url, &self.settings);
		match &self.client_strategy {
			ClientStrategy::Cached(cache) => cache.get_client(&config),
			ClientStrategy::OnDemand => ClientCache::build_client(&config),
		}
	}

	/// Query parameters shared by the /route and /calldata endpoints
	fn route_query(&self, request: &SwapRequest) -> Vec<(String, String)> {
		let mut query = vec![
			("tokenInAddress".to_string(), request.sell_token.clone()),
			("tokenOutAddress".to_string(), request.buy_token.clone()),
			("amount".to_string(), request.sell_amount.to_string()),
		];

		if let Some(bps) = request.slippage_bps() {
			query.push(("slippage".to_string(), bps.to_string()));
		}

		query
	}

	fn request_context(
		request: &SwapRequest,
		query: &[(String, String)],
	) -> HashMap<String, Value> {
		HashMap::from([
			("params".to_string(), json!(query)),
			("token_address".to_string(), json!(request.sell_token)),
			("chain_id".to_string(), json!(request.chain_id)),
		])
	}

	fn transform_context(
		response: &Value,
		method: &str,
		url: &str,
		query: &[(String, String)],
		chain_id: u64,
	) -> HashMap<String, Value> {
		HashMap::from([
			("response".to_string(), response.clone()),
			("method".to_string(), json!(method)),
			("url".to_string(), json!(url)),
			("params".to_string(), json!(query)),
			("chain_id".to_string(), json!(chain_id)),
		])
	}

	/// Amount field as a decimal-integer string, "0" when absent
	fn amount_field(response: &Value, key: &str) -> TokenAmount {
		match response.get(key) {
			Some(Value::String(s)) => TokenAmount::new(s.clone()),
			Some(Value::Number(n)) => TokenAmount::new(n.to_string()),
			_ => TokenAmount::zero(),
		}
	}

	/// Map upstream route steps to canonical swap sources
	fn convert_sources(response: &Value) -> Vec<SwapSource> {
		response
			.get("route")
			.and_then(Value::as_array)
			.map(|route| {
				route
					.iter()
					.map(|step| SwapSource {
						name: step
							.get("protocol")
							.and_then(Value::as_str)
							.unwrap_or("Unknown")
							.to_string(),
						proportion: step.get("percent").and_then(Value::as_f64).unwrap_or(100.0),
					})
					.collect()
			})
			.unwrap_or_default()
	}

	fn compute_price(buy_amount: &TokenAmount, sell_amount: &TokenAmount) -> Result<String, String> {
		let buy = buy_amount.to_decimal()?;
		let sell = sell_amount.to_decimal()?;
		Ok(price_quotient(buy, sell).to_string())
	}

	fn transform_price(
		&self,
		response: &Value,
		request: &SwapRequest,
	) -> Result<ProviderPriceResponse, String> {
		let buy_amount = Self::amount_field(response, "outputAmount");
		let gas = Self::amount_field(response, "estimatedGas");
		let price = Self::compute_price(&buy_amount, &request.sell_amount)?;

		// Native-token sells carry the sell amount as transaction value
		let value = if self.settings.is_native_token(&request.sell_token) {
			request.sell_amount.clone()
		} else {
			TokenAmount::zero()
		};

		Ok(ProviderPriceResponse {
			provider: self.info.name.clone(),
			sources: Self::convert_sources(response),
			buy_amount,
			sell_amount: request.sell_amount.clone(),
			gas,
			gas_price: request
				.gas_price
				.map(TokenAmount::from)
				.unwrap_or_else(TokenAmount::zero),
			value,
			price,
			allowance_target: None,
		})
	}

	fn transform_quote(
		&self,
		response: &Value,
		request: &SwapRequest,
	) -> Result<ProviderQuoteResponse, String> {
		let buy_amount = Self::amount_field(response, "outputAmount");
		let gas = Self::amount_field(response, "estimatedGas");
		let price = Self::compute_price(&buy_amount, &request.sell_amount)?;

		let to = response
			.get("to")
			.and_then(Value::as_str)
			.unwrap_or("")
			.to_string();
		let data = response
			.get("calldata")
			.and_then(Value::as_str)
			.unwrap_or("0x")
			.to_string();

		Ok(ProviderQuoteResponse {
			provider: self.info.name.clone(),
			sources: Self::convert_sources(response),
			buy_amount,
			sell_amount: request.sell_amount.clone(),
			gas,
			gas_price: request
				.gas_price
				.map(TokenAmount::from)
				.unwrap_or_else(TokenAmount::zero),
			value: Self::amount_field(response, "value"),
			price,
			to,
			data,
			allowance_target: None,
		})
	}
}

#[async_trait]
impl AggregationProvider for FibrousProvider {
	fn provider_info(&self) -> &Provider {
		&self.info
	}

	async fn get_swap_price(
		&self,
		request: &SwapRequest,
	) -> ProviderResult<ProviderPriceResponse> {
		let api_base = self.endpoints.resolve(request.chain_id)?.to_string();
		let url = join_url(&api_base, "route")?;
		let query = self.route_query(request);
		let client = self.get_client(&api_base)?;

		debug!(
			provider = Self::NAME,
			chain_id = request.chain_id,
			"fetching swap price from {}",
			url
		);

		let response =
			match execute(&client, Method::GET, &url, &query, None, FIBROUS_SOURCE).await {
				Ok(response) => response,
				Err(failure) => {
					return Err(classify(
						&failure,
						Self::NAME,
						&url,
						FIBROUS_ERRORS,
						Self::request_context(request, &query),
					));
				},
			};

		self.transform_price(&response, request).map_err(|reason| {
			let failure = UpstreamFailure::MalformedBody { reason };
			classify(
				&failure,
				Self::NAME,
				&url,
				FIBROUS_ERRORS,
				Self::transform_context(&response, "get_swap_price", &url, &query, request.chain_id),
			)
		})
	}

	async fn get_swap_quote(
		&self,
		request: &SwapRequest,
	) -> ProviderResult<ProviderQuoteResponse> {
		// Precondition, not an upstream failure: rejected before any
		// network call
		let taker_address = request
			.taker_address
			.as_deref()
			.filter(|taker| !taker.is_empty())
			.ok_or_else(|| ProviderError::InvalidRequest {
				reason: "taker_address is required for a Fibrous quote".to_string(),
			})?;

		let api_base = self.endpoints.resolve(request.chain_id)?.to_string();
		let url = join_url(&api_base, "calldata")?;
		let mut query = self.route_query(request);
		query.push(("userAddress".to_string(), taker_address.to_string()));
		let client = self.get_client(&api_base)?;

		debug!(
			provider = Self::NAME,
			chain_id = request.chain_id,
			"fetching swap quote from {}",
			url
		);

		let response =
			match execute(&client, Method::GET, &url, &query, None, FIBROUS_SOURCE).await {
				Ok(response) => response,
				Err(failure) => {
					let mut context = Self::request_context(request, &query);
					context.insert("wallet".to_string(), json!(taker_address));
					return Err(classify(&failure, Self::NAME, &url, FIBROUS_ERRORS, context));
				},
			};

		self.transform_quote(&response, request).map_err(|reason| {
			let failure = UpstreamFailure::MalformedBody { reason };
			classify(
				&failure,
				Self::NAME,
				&url,
				FIBROUS_ERRORS,
				Self::transform_context(&response, "get_swap_quote", &url, &query, request.chain_id),
			)
		})
	}

	async fn health_check(&self, chain_id: u64) -> bool {
		let api_base = match self.endpoints.resolve(chain_id) {
			Ok(base) => base.to_string(),
			Err(err) => {
				error!(provider = Self::NAME, chain_id, "health check failed: {}", err);
				return false;
			},
		};

		let url = match join_url(&api_base, "healthCheck") {
			Ok(url) => url,
			Err(err) => {
				error!(provider = Self::NAME, chain_id, "health check failed: {}", err);
				return false;
			},
		};

		let client = match self.get_client(&api_base) {
			Ok(client) => client,
			Err(err) => {
				error!(provider = Self::NAME, chain_id, "health check failed: {}", err);
				return false;
			},
		};

		match execute(&client, Method::GET, &url, &[], None, FIBROUS_SOURCE).await {
			Ok(response) => {
				let status_ok = response
					.get("status")
					.and_then(Value::as_str)
					.map(|status| status.eq_ignore_ascii_case("ok"))
					.unwrap_or(false);

				status_ok || response.get("healthy").map(is_truthy).unwrap_or(false)
			},
			Err(failure) => {
				error!(
					provider = Self::NAME,
					chain_id, "health check failed: {}", failure
				);
				false
			},
		}
	}
}

/// Truthiness of a loosely-typed upstream flag
fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Bool(flag) => *flag,
		Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
		Value::String(s) => !s.is_empty(),
		Value::Array(items) => !items.is_empty(),
		Value::Object(map) => !map.is_empty(),
		Value::Null => false,
	}
}
