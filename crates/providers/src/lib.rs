//! Swap Providers
//!
//! Upstream DEX-aggregator integrations for the swap meta-aggregation
//! layer: one module per provider plus the shared request plumbing and
//! exception classification they build on.

pub mod classify;
pub mod client_cache;
pub mod fibrous;
pub mod openocean;
mod request;

pub use classify::{classify, extract_message, ErrorPatterns, PatternKind};
pub use client_cache::{global_client_cache, ClientCache, ClientConfig};
pub use fibrous::FibrousProvider;
pub use openocean::OpenOceanProvider;
pub use swap_types::{AggregationProvider, ProviderError, ProviderResult};

use std::collections::HashMap;
use std::sync::Arc;
use swap_config::Settings;

/// Registry of providers keyed by provider name
///
/// The routing layer selects providers by name from configuration and
/// dispatches through the `AggregationProvider` trait.
pub struct ProviderRegistry {
	providers: HashMap<String, Box<dyn AggregationProvider>>,
}

impl ProviderRegistry {
	pub fn new() -> Self {
		Self {
			providers: HashMap::new(),
		}
	}

	/// Registry with every built-in provider registered
	pub fn with_defaults(settings: Arc<Settings>) -> Self {
		let mut registry = Self::new();
		registry
			.register(Box::new(FibrousProvider::new(Arc::clone(&settings))))
			.expect("built-in provider names are unique");
		registry
			.register(Box::new(OpenOceanProvider::new(settings)))
			.expect("built-in provider names are unique");
		registry
	}

	/// Register a provider; invalid descriptors and duplicate names are
	/// rejected
	pub fn register(&mut self, provider: Box<dyn AggregationProvider>) -> ProviderResult<()> {
		provider.provider_info().validate()?;

		let name = provider.name().to_string();
		if self.providers.contains_key(&name) {
			return Err(ProviderError::InvalidRequest {
				reason: format!("provider '{}' is already registered", name),
			});
		}
		self.providers.insert(name, provider);
		Ok(())
	}

	pub fn get(&self, name: &str) -> Option<&dyn AggregationProvider> {
		self.providers.get(name).map(Box::as_ref)
	}

	pub fn get_all(&self) -> &HashMap<String, Box<dyn AggregationProvider>> {
		&self.providers
	}

	/// Registered provider names, in no particular order
	pub fn names(&self) -> Vec<&str> {
		self.providers.keys().map(String::as_str).collect()
	}
}

impl Default for ProviderRegistry {
	fn default() -> Self {
		Self::new()
	}
}
