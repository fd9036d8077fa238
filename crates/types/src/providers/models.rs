//! Canonical request and response models shared by all providers

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::TokenAmount;

/// One leg of a swap route, in upstream execution order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SwapSource {
	/// Liquidity venue name as reported upstream
	pub name: String,
	/// Share of the swap routed through this venue, in percent
	pub proportion: f64,
}

impl SwapSource {
	pub fn new(name: impl Into<String>, proportion: f64) -> Self {
		Self {
			name: name.into(),
			proportion,
		}
	}
}

/// Parameters for a swap price or quote lookup
///
/// One request type serves both operations; quote lookups additionally
/// require `taker_address` and reject the request before any network call
/// when it is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapRequest {
	/// Token address to buy
	pub buy_token: String,
	/// Token address to sell
	pub sell_token: String,
	/// Amount to sell in base units
	pub sell_amount: TokenAmount,
	/// Target chain id
	pub chain_id: u64,
	/// Gas price in wei
	pub gas_price: Option<u64>,
	/// Fractional slippage tolerance (0.01 = 1%)
	pub slippage_percentage: Option<f64>,
	/// Wallet address executing the swap
	pub taker_address: Option<String>,
	/// Fee recipient address
	pub fee_recipient: Option<String>,
	/// Fractional fee taken from the buy token
	pub buy_token_percentage_fee: Option<f64>,
}

impl SwapRequest {
	pub fn new(
		buy_token: impl Into<String>,
		sell_token: impl Into<String>,
		sell_amount: TokenAmount,
		chain_id: u64,
	) -> Self {
		Self {
			buy_token: buy_token.into(),
			sell_token: sell_token.into(),
			sell_amount,
			chain_id,
			gas_price: None,
			slippage_percentage: None,
			taker_address: None,
			fee_recipient: None,
			buy_token_percentage_fee: None,
		}
	}

	pub fn with_gas_price(mut self, gas_price: u64) -> Self {
		self.gas_price = Some(gas_price);
		self
	}

	pub fn with_slippage(mut self, slippage_percentage: f64) -> Self {
		self.slippage_percentage = Some(slippage_percentage);
		self
	}

	pub fn with_taker(mut self, taker_address: impl Into<String>) -> Self {
		self.taker_address = Some(taker_address.into());
		self
	}

	pub fn with_fee(mut self, fee_recipient: impl Into<String>, percentage_fee: f64) -> Self {
		self.fee_recipient = Some(fee_recipient.into());
		self.buy_token_percentage_fee = Some(percentage_fee);
		self
	}

	/// Fractional slippage converted to integer basis points (0.015 -> 150)
	///
	/// Returns None when slippage is absent or zero, in which case no
	/// slippage parameter is sent upstream. The conversion goes through a
	/// decimal so the result is exact for any representable fraction.
	pub fn slippage_bps(&self) -> Option<u32> {
		let slippage = self.slippage_percentage?;
		if slippage <= 0.0 {
			return None;
		}
		let bps = Decimal::from_f64(slippage)? * Decimal::from(10_000u32);
		bps.trunc().to_u32()
	}
}

/// Price quotient of two base-unit amounts, zero when the divisor is zero
pub fn price_quotient(buy_amount: Decimal, sell_amount: Decimal) -> Decimal {
	if sell_amount.is_zero() {
		Decimal::ZERO
	} else {
		(buy_amount / sell_amount).normalize()
	}
}

/// Normalized price lookup result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderPriceResponse {
	/// Provider name the price came from
	pub provider: String,
	/// Route legs, in upstream execution order; may be empty
	pub sources: Vec<SwapSource>,
	pub buy_amount: TokenAmount,
	pub sell_amount: TokenAmount,
	pub gas: TokenAmount,
	pub gas_price: TokenAmount,
	/// Native-token amount to attach to the transaction
	pub value: TokenAmount,
	/// Decimal quotient buy_amount / sell_amount, "0" when selling zero
	pub price: String,
	/// Contract that must be approved to spend the sell token
	pub allowance_target: Option<String>,
}

/// Normalized quote lookup result: a price plus an executable transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderQuoteResponse {
	pub provider: String,
	pub sources: Vec<SwapSource>,
	pub buy_amount: TokenAmount,
	pub sell_amount: TokenAmount,
	pub gas: TokenAmount,
	pub gas_price: TokenAmount,
	pub value: TokenAmount,
	pub price: String,
	/// Execution target contract address
	pub to: String,
	/// Hex-encoded calldata for submitting the transaction
	pub data: String,
	pub allowance_target: Option<String>,
}
