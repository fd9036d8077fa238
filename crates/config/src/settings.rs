//! Configuration settings structures

use serde::{Deserialize, Serialize};

/// Address convention representing a chain's native currency
pub const NATIVE_TOKEN_ADDRESS: &str = "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee";

/// Main application settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
	/// Native-token sentinel address, compared case-insensitively
	pub native_token_address: String,
	pub timeouts: TimeoutSettings,
	pub http: HttpClientSettings,
	pub logging: LoggingSettings,
}

/// Timeout configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimeoutSettings {
	/// Fixed upstream request timeout shared by every provider operation
	pub request_ms: u64,
}

/// HTTP connection pool configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HttpClientSettings {
	/// Maximum number of idle connections per host
	pub max_idle_per_host: usize,
	/// Connection keep-alive timeout in milliseconds
	pub keep_alive_ms: u64,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
	pub structured: bool,
}

/// Log format options
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			native_token_address: NATIVE_TOKEN_ADDRESS.to_string(),
			timeouts: TimeoutSettings { request_ms: 5000 },
			http: HttpClientSettings {
				max_idle_per_host: 10,
				keep_alive_ms: 90_000,
			},
			logging: LoggingSettings {
				level: "info".to_string(),
				format: LogFormat::Pretty,
				structured: false,
			},
		}
	}
}

impl Settings {
	/// Whether a token address is the chain's native-token sentinel
	pub fn is_native_token(&self, token: &str) -> bool {
		token.eq_ignore_ascii_case(&self.native_token_address)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_settings() {
		let settings = Settings::default();
		assert_eq!(settings.native_token_address, NATIVE_TOKEN_ADDRESS);
		assert_eq!(settings.timeouts.request_ms, 5000);
		assert_eq!(settings.http.max_idle_per_host, 10);
	}

	#[test]
	fn test_is_native_token_case_insensitive() {
		let settings = Settings::default();
		assert!(settings.is_native_token("0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"));
		assert!(settings.is_native_token("0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE"));
		assert!(settings.is_native_token("0xEEEEEEEEEEEEEEEEEEEEEEEEEEEEEEEEEEEEEEEE"));
		assert!(!settings.is_native_token("0x4200000000000000000000000000000000000006"));
	}
}
