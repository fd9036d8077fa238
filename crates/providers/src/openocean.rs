//! OpenOcean provider implementation
//!
//! Docs: https://docs.openocean.finance/dev/openocean-api-3.0/api-reference
//!
//! Chain routing is positional: the chain id is part of the URL path, so
//! there is no fixed endpoint table. Amounts come back in base units with
//! per-token decimals attached; the price is computed on the scaled values.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use swap_config::Settings;
use swap_types::{
	price_quotient, AggregationProvider, Provider, ProviderError, ProviderPriceResponse,
	ProviderQuoteResponse, ProviderResult, SwapRequest, SwapSource, TokenAmount, UpstreamFailure,
};
use tracing::{debug, error};

use crate::classify::{classify, ErrorPatterns};
use crate::client_cache::{ClientCache, ClientConfig};
use crate::request::{execute, join_url};

const OPENOCEAN_TRADING_API: &str = "https://ethapi.openocean.finance/v2";

/// Source tag attached to proxied upstream error bodies
const OPENOCEAN_SOURCE: &str = "proxied OpenOcean API";

const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// OpenOcean has no provider-specific wording to match; everything falls
/// through to the shared classifier and the generic fallback.
const OPENOCEAN_ERRORS: ErrorPatterns = &[];

/// Client strategy for the OpenOcean provider
#[derive(Debug)]
enum ClientStrategy {
	Cached(ClientCache),
	OnDemand,
}

/// Provider for the OpenOcean DEX aggregator
#[derive(Debug)]
pub struct OpenOceanProvider {
	info: Provider,
	base_url: String,
	settings: Arc<Settings>,
	client_strategy: ClientStrategy,
}

impl OpenOceanProvider {
	pub const NAME: &'static str = "openocean";

	/// Create a new OpenOcean provider with the shared client cache
	pub fn new(settings: Arc<Settings>) -> Self {
		Self::with_cache(settings, ClientCache::for_provider())
	}

	/// Create an OpenOcean provider with a custom client cache
	pub fn with_cache(settings: Arc<Settings>, cache: ClientCache) -> Self {
		Self {
			info: Self::descriptor(),
			base_url: OPENOCEAN_TRADING_API.to_string(),
			settings,
			client_strategy: ClientStrategy::Cached(cache),
		}
	}

	/// Create an OpenOcean provider without client caching
	pub fn without_cache(settings: Arc<Settings>) -> Self {
		Self {
			info: Self::descriptor(),
			base_url: OPENOCEAN_TRADING_API.to_string(),
			settings,
			client_strategy: ClientStrategy::OnDemand,
		}
	}

	/// Override the trading API base URL (self-hosted gateways, tests)
	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = base_url.into();
		self
	}

	fn descriptor() -> Provider {
		Provider::new(
			Self::NAME.to_string(),
			"OpenOcean".to_string(),
			"2.0.0".to_string(),
		)
	}

	fn get_client(&self) -> ProviderResult<Arc<reqwest::Client>> {
		let config = ClientConfig::for_provider(Self::NAME, &self.base_url, &self.settings);
		match &self.client_strategy {
			ClientStrategy::Cached(cache) => cache.get_client(&config),
			ClientStrategy::OnDemand => ClientCache::build_client(&config),
		}
	}

	/// The sentinel stands for native currency; OpenOcean expects the zero
	/// address instead
	fn remap_native(&self, token: &str) -> String {
		if self.settings.is_native_token(token) {
			ZERO_ADDRESS.to_string()
		} else {
			token.to_string()
		}
	}

	fn swap_query(&self, request: &SwapRequest) -> Vec<(String, String)> {
		let mut query = vec![
			(
				"inTokenAddress".to_string(),
				self.remap_native(&request.sell_token),
			),
			(
				"outTokenAddress".to_string(),
				self.remap_native(&request.buy_token),
			),
			("amount".to_string(), request.sell_amount.to_string()),
		];

		if let Some(bps) = request.slippage_bps() {
			query.push(("slippage".to_string(), bps.to_string()));
		}
		if let Some(gas_price) = request.gas_price {
			query.push(("gasPrice".to_string(), gas_price.to_string()));
		}
		if let Some(taker) = &request.taker_address {
			query.push(("account".to_string(), taker.clone()));
		}
		if let Some(recipient) = &request.fee_recipient {
			query.push(("referrer".to_string(), recipient.clone()));
		}
		if let Some(fee) = request.buy_token_percentage_fee {
			if let Some(fee) = Decimal::from_f64(fee) {
				let referrer_fee = (fee * Decimal::from(100u32)).normalize();
				query.push(("referrerFee".to_string(), referrer_fee.to_string()));
			}
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

	fn require_amount(response: &Value, key: &str) -> Result<TokenAmount, String> {
		match response.get(key) {
			Some(Value::String(s)) => Ok(TokenAmount::new(s.clone())),
			Some(Value::Number(n)) => Ok(TokenAmount::new(n.to_string())),
			_ => Err(format!("missing required field '{}'", key)),
		}
	}

	fn require_str(response: &Value, key: &str) -> Result<String, String> {
		response
			.get(key)
			.and_then(Value::as_str)
			.map(str::to_string)
			.ok_or_else(|| format!("missing required field '{}'", key))
	}

	fn token_decimals(response: &Value, token_key: &str) -> Result<u32, String> {
		response
			.get(token_key)
			.and_then(|token| token.get("decimals"))
			.and_then(Value::as_u64)
			.and_then(|decimals| u32::try_from(decimals).ok())
			.ok_or_else(|| format!("missing token decimals for '{}'", token_key))
	}

	/// Scale a base-unit amount down by the token's decimals
	fn scale_amount(amount: &TokenAmount, decimals: u32) -> Result<Decimal, String> {
		let mut scaled = amount.to_decimal()?;
		scaled
			.set_scale(decimals)
			.map_err(|e| format!("cannot scale amount by {} decimals: {}", decimals, e))?;
		Ok(scaled)
	}

	/// Decimals-aware price of the swap, as reported by the upstream
	fn compute_price(response: &Value) -> Result<String, String> {
		let in_amount = Self::require_amount(response, "inAmount")?;
		let out_amount = Self::require_amount(response, "outAmount")?;
		let in_decimals = Self::token_decimals(response, "inToken")?;
		let out_decimals = Self::token_decimals(response, "outToken")?;

		let sell = Self::scale_amount(&in_amount, in_decimals)?;
		let buy = Self::scale_amount(&out_amount, out_decimals)?;
		Ok(price_quotient(buy, sell).to_string())
	}

	/// Flatten the nested route tree into canonical swap sources
	fn convert_sources(response: &Value) -> Result<Vec<SwapSource>, String> {
		let routes = response
			.get("path")
			.and_then(|path| path.get("routes"))
			.and_then(Value::as_array)
			.ok_or_else(|| "missing route path in response".to_string())?;

		let mut sources = Vec::new();
		for route in routes {
			let sub_routes = route
				.get("subRoutes")
				.and_then(Value::as_array)
				.cloned()
				.unwrap_or_default();
			for sub_route in &sub_routes {
				let dexes = sub_route
					.get("dexes")
					.and_then(Value::as_array)
					.cloned()
					.unwrap_or_default();
				for dex in &dexes {
					let name = Self::require_str(dex, "dex")?;
					let proportion = dex
						.get("percentage")
						.and_then(Value::as_f64)
						.ok_or_else(|| "missing dex percentage".to_string())?;
					sources.push(SwapSource::new(name, proportion));
				}
			}
		}

		Ok(sources)
	}

	/// Native-token sells carry the input amount as transaction value
	///
	/// The upstream echoes the zero address for native sells (the sentinel
	/// is remapped before querying), so both spellings are accepted.
	fn native_value(&self, response: &Value, in_amount: &TokenAmount) -> TokenAmount {
		let in_token = response
			.get("inToken")
			.and_then(|token| token.get("address"))
			.and_then(Value::as_str)
			.unwrap_or_default();

		if self.settings.is_native_token(in_token) || in_token.eq_ignore_ascii_case(ZERO_ADDRESS) {
			in_amount.clone()
		} else {
			TokenAmount::zero()
		}
	}

	fn transform_price(
		&self,
		response: &Value,
		request: &SwapRequest,
	) -> Result<ProviderPriceResponse, String> {
		let in_amount = Self::require_amount(response, "inAmount")?;
		let out_amount = Self::require_amount(response, "outAmount")?;
		let price = Self::compute_price(response)?;

		Ok(ProviderPriceResponse {
			provider: self.info.name.clone(),
			sources: Self::convert_sources(response)?,
			value: self.native_value(response, &in_amount),
			buy_amount: out_amount,
			sell_amount: in_amount,
			gas: Self::require_amount(response, "estimatedGas")?,
			gas_price: request
				.gas_price
				.map(TokenAmount::from)
				.unwrap_or_else(TokenAmount::zero),
			price,
			allowance_target: None,
		})
	}

	fn transform_quote(&self, response: &Value) -> Result<ProviderQuoteResponse, String> {
		let price = Self::compute_price(response)?;

		Ok(ProviderQuoteResponse {
			provider: self.info.name.clone(),
			// The swap endpoint reports no route decomposition
			sources: Vec::new(),
			buy_amount: Self::require_amount(response, "outAmount")?,
			sell_amount: Self::require_amount(response, "inAmount")?,
			gas: Self::require_amount(response, "estimatedGas")?,
			gas_price: Self::require_amount(response, "gasPrice")?,
			value: Self::require_amount(response, "value")?,
			price,
			to: Self::require_str(response, "to")?,
			data: Self::require_str(response, "data")?,
			allowance_target: None,
		})
	}
}

#[async_trait]
impl AggregationProvider for OpenOceanProvider {
	fn provider_info(&self) -> &Provider {
		&self.info
	}

	async fn get_swap_price(
		&self,
		request: &SwapRequest,
	) -> ProviderResult<ProviderPriceResponse> {
		let url = join_url(&self.base_url, &format!("{}/quote", request.chain_id))?;
		let query = self.swap_query(request);
		let client = self.get_client()?;

		debug!(
			provider = Self::NAME,
			chain_id = request.chain_id,
			"fetching swap price from {}",
			url
		);

		let response =
			match execute(&client, Method::GET, &url, &query, None, OPENOCEAN_SOURCE).await {
				Ok(response) => response,
				Err(failure) => {
					return Err(classify(
						&failure,
						Self::NAME,
						&url,
						OPENOCEAN_ERRORS,
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
				OPENOCEAN_ERRORS,
				Self::transform_context(&response, "get_swap_price", &url, &query, request.chain_id),
			)
		})
	}

	async fn get_swap_quote(
		&self,
		request: &SwapRequest,
	) -> ProviderResult<ProviderQuoteResponse> {
		let taker_address = request
			.taker_address
			.as_deref()
			.filter(|taker| !taker.is_empty())
			.ok_or_else(|| ProviderError::InvalidRequest {
				reason: "taker_address is required for an OpenOcean quote".to_string(),
			})?;

		let url = join_url(&self.base_url, &format!("{}/swap", request.chain_id))?;
		let query = self.swap_query(request);
		let client = self.get_client()?;

		debug!(
			provider = Self::NAME,
			chain_id = request.chain_id,
			"fetching swap quote from {}",
			url
		);

		let response =
			match execute(&client, Method::GET, &url, &query, None, OPENOCEAN_SOURCE).await {
				Ok(response) => response,
				Err(failure) => {
					let mut context = Self::request_context(request, &query);
					context.insert("wallet".to_string(), json!(taker_address));
					return Err(classify(
						&failure,
						Self::NAME,
						&url,
						OPENOCEAN_ERRORS,
						context,
					));
				},
			};

		self.transform_quote(&response).map_err(|reason| {
			let failure = UpstreamFailure::MalformedBody { reason };
			classify(
				&failure,
				Self::NAME,
				&url,
				OPENOCEAN_ERRORS,
				Self::transform_context(&response, "get_swap_quote", &url, &query, request.chain_id),
			)
		})
	}

	async fn health_check(&self, chain_id: u64) -> bool {
		// No dedicated health endpoint; a reachable quote endpoint counts.
		// A 4xx on the parameterless probe still means the API is up.
		let url = match join_url(&self.base_url, &format!("{}/quote", chain_id)) {
			Ok(url) => url,
			Err(err) => {
				error!(provider = Self::NAME, chain_id, "health check failed: {}", err);
				return false;
			},
		};

		let client = match self.get_client() {
			Ok(client) => client,
			Err(err) => {
				error!(provider = Self::NAME, chain_id, "health check failed: {}", err);
				return false;
			},
		};

		match execute(&client, Method::GET, &url, &[], None, OPENOCEAN_SOURCE).await {
			Ok(_) => true,
			Err(UpstreamFailure::Status { status, .. }) if status < 500 => true,
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
