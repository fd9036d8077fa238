//! Token amount model for handling large integers as strings

use rust_decimal::Decimal;
use serde;
use std::str::FromStr;

/// Token amount in base units, represented as a decimal-integer string
///
/// Preserves full precision for 18-decimal token amounts that overflow
/// native integer types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAmount(pub String);

impl TokenAmount {
	/// Create a new TokenAmount from a string
	pub fn new(value: String) -> Self {
		Self(value)
	}

	/// The zero amount
	pub fn zero() -> Self {
		Self("0".to_string())
	}

	/// Get the raw string value
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Check if the value is zero
	pub fn is_zero(&self) -> bool {
		self.0 == "0" || self.0.chars().all(|c| c == '0')
	}

	/// Validate that the string contains only digits
	pub fn validate(&self) -> Result<(), String> {
		if self.0.is_empty() {
			return Err("token amount cannot be empty".to_string());
		}

		if !self.0.chars().all(|c| c.is_ascii_digit()) {
			return Err("token amount must contain only digits".to_string());
		}

		Ok(())
	}

	/// Parse into a decimal for price arithmetic
	///
	/// Fails for values beyond the 28-29 significant digits a decimal can
	/// hold; callers surface that as a transformation failure.
	pub fn to_decimal(&self) -> Result<Decimal, String> {
		Decimal::from_str(&self.0)
			.map_err(|e| format!("token amount '{}' is not a valid decimal: {}", self.0, e))
	}
}

impl std::fmt::Display for TokenAmount {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<String> for TokenAmount {
	fn from(value: String) -> Self {
		Self(value)
	}
}

impl From<&str> for TokenAmount {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

impl From<u128> for TokenAmount {
	fn from(value: u128) -> Self {
		Self(value.to_string())
	}
}

impl From<u64> for TokenAmount {
	fn from(value: u64) -> Self {
		Self(value.to_string())
	}
}

// Custom Serde implementation to serialize/deserialize as string
impl serde::Serialize for TokenAmount {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(&self.0)
	}
}

impl<'de> serde::Deserialize<'de> for TokenAmount {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let value = String::deserialize(deserializer)?;
		let amount = Self(value);
		amount.validate().map_err(serde::de::Error::custom)?;
		Ok(amount)
	}
}
