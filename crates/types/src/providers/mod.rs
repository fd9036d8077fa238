//! Core provider domain model and per-chain endpoint routing

use std::collections::HashMap;

pub mod errors;
pub mod models;
pub mod traits;

pub use errors::{ErrorRecord, ProviderError, ProviderValidationError, UpstreamFailure};
pub use models::{
	price_quotient, ProviderPriceResponse, ProviderQuoteResponse, SwapRequest, SwapSource,
};
pub use traits::AggregationProvider;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;
pub type ProviderValidationResult<T> = Result<T, ProviderValidationError>;

/// Static identity descriptor for one upstream integration
///
/// Read once at initialization; providers hold no other mutable state.
#[derive(Debug, Clone, PartialEq)]
pub struct Provider {
	/// Unique name used for registration and attribution
	pub name: String,
	/// Human-readable display name
	pub display_name: String,
	/// Description of the upstream service
	pub description: Option<String>,
	/// Version of the integration
	pub version: String,
}

impl Provider {
	/// Create a new provider descriptor
	pub fn new(name: String, display_name: String, version: String) -> Self {
		Self {
			name,
			display_name,
			description: None,
			version,
		}
	}

	pub fn with_description(mut self, description: String) -> Self {
		self.description = Some(description);
		self
	}

	/// Validate the descriptor
	pub fn validate(&self) -> ProviderValidationResult<()> {
		if self.name.is_empty() {
			return Err(ProviderValidationError::MissingRequiredField {
				field: "name".to_string(),
			});
		}

		if !self
			.name
			.chars()
			.all(|c| c.is_alphanumeric() || c == '-' || c == '_')
		{
			return Err(ProviderValidationError::InvalidProviderName {
				name: self.name.clone(),
			});
		}

		if self.display_name.is_empty() {
			return Err(ProviderValidationError::MissingRequiredField {
				field: "display_name".to_string(),
			});
		}

		if self.version.is_empty() {
			return Err(ProviderValidationError::MissingRequiredField {
				field: "version".to_string(),
			});
		}

		if !is_valid_semver(&self.version) {
			return Err(ProviderValidationError::InvalidVersion {
				version: self.version.clone(),
			});
		}

		Ok(())
	}
}

/// Immutable chain-id to base-URL table owned by one provider
///
/// Built at provider initialization. Lookups for unmapped chain ids fail
/// explicitly with `UnsupportedChain`, never a silent default.
#[derive(Debug, Clone)]
pub struct ChainEndpoints {
	provider: String,
	endpoints: HashMap<u64, String>,
}

impl ChainEndpoints {
	pub fn new(provider: impl Into<String>, endpoints: HashMap<u64, String>) -> Self {
		Self {
			provider: provider.into(),
			endpoints,
		}
	}

	/// Base URL for a chain's upstream deployment
	pub fn resolve(&self, chain_id: u64) -> Result<&str, ProviderError> {
		self.endpoints
			.get(&chain_id)
			.map(String::as_str)
			.ok_or_else(|| ProviderError::UnsupportedChain {
				provider: self.provider.clone(),
				chain_id,
			})
	}

	pub fn contains(&self, chain_id: u64) -> bool {
		self.endpoints.contains_key(&chain_id)
	}

	/// Supported chain ids, in no particular order
	pub fn chain_ids(&self) -> impl Iterator<Item = u64> + '_ {
		self.endpoints.keys().copied()
	}
}

/// Helper function to validate semantic version format
fn is_valid_semver(version: &str) -> bool {
	// Basic semver validation: X.Y.Z where X, Y, Z are numbers
	let parts: Vec<&str> = version.split('.').collect();
	if parts.len() != 3 {
		return false;
	}

	parts.iter().all(|part| part.parse::<u32>().is_ok())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn create_test_provider() -> Provider {
		Provider::new(
			"test-provider".to_string(),
			"Test Provider".to_string(),
			"1.0.0".to_string(),
		)
	}

	#[test]
	fn test_provider_creation() {
		let provider = create_test_provider();

		assert_eq!(provider.name, "test-provider");
		assert_eq!(provider.display_name, "Test Provider");
		assert_eq!(provider.version, "1.0.0");
		assert!(provider.validate().is_ok());
	}

	#[test]
	fn test_provider_validation() {
		let mut provider = create_test_provider();
		provider.name = "bad name!".to_string();
		assert!(provider.validate().is_err());

		let mut provider = create_test_provider();
		provider.version = "1.0".to_string();
		assert!(provider.validate().is_err());

		let mut provider = create_test_provider();
		provider.display_name = String::new();
		assert!(provider.validate().is_err());
	}

	#[test]
	fn test_chain_endpoints_resolve() {
		let endpoints = ChainEndpoints::new(
			"test-provider",
			HashMap::from([
				(8453, "https://api.example.com/base".to_string()),
				(534352, "https://api.example.com/scroll".to_string()),
			]),
		);

		assert_eq!(
			endpoints.resolve(8453).unwrap(),
			"https://api.example.com/base"
		);
		assert_eq!(
			endpoints.resolve(534352).unwrap(),
			"https://api.example.com/scroll"
		);
		assert!(endpoints.contains(8453));
		assert!(!endpoints.contains(1));
	}

	#[test]
	fn test_chain_endpoints_unmapped_chain_fails_explicitly() {
		let endpoints = ChainEndpoints::new(
			"test-provider",
			HashMap::from([(8453, "https://api.example.com/base".to_string())]),
		);

		match endpoints.resolve(1) {
			Err(ProviderError::UnsupportedChain { provider, chain_id }) => {
				assert_eq!(provider, "test-provider");
				assert_eq!(chain_id, 1);
			},
			other => panic!("expected UnsupportedChain, got {:?}", other.map(|_| ())),
		}
	}
}
