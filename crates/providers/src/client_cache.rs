//! HTTP client cache for optimized connection management
//!
//! Provides per-provider client instances with connection pooling and
//! keep-alive optimization. The fixed upstream request timeout is applied
//! at client construction; TLS verification is always on.

use dashmap::DashMap;
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::time::{Duration, Instant};
use swap_config::Settings;
use swap_types::{ProviderError, ProviderResult};
use tracing::{debug, warn};

/// Configuration for creating optimized HTTP clients
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientConfig {
	/// Base endpoint the client talks to
	pub base_url: String,
	/// Provider name for cache differentiation
	pub provider: String,
	/// Fixed request timeout in milliseconds
	pub request_timeout_ms: u64,
	/// Maximum number of idle connections per host
	pub max_idle_per_host: usize,
	/// Connection keep-alive timeout
	pub keep_alive_timeout_ms: u64,
}

impl ClientConfig {
	/// Build a client configuration for one provider endpoint
	pub fn for_provider(provider: &str, base_url: &str, settings: &Settings) -> Self {
		Self {
			base_url: base_url.to_string(),
			provider: provider.to_string(),
			request_timeout_ms: settings.timeouts.request_ms,
			max_idle_per_host: settings.http.max_idle_per_host,
			keep_alive_timeout_ms: settings.http.keep_alive_ms,
		}
	}
}

/// Cached client with creation timestamp for TTL management
#[derive(Debug, Clone)]
struct CachedClient {
	client: Arc<Client>,
	created_at: Instant,
}

impl CachedClient {
	fn new(client: Client) -> Self {
		Self {
			client: Arc::new(client),
			created_at: Instant::now(),
		}
	}

	fn is_expired(&self, ttl: Duration) -> bool {
		self.created_at.elapsed() > ttl
	}
}

/// Thread-safe cache for HTTP clients optimized per provider endpoint with TTL
#[derive(Clone, Debug)]
pub struct ClientCache {
	clients: Arc<DashMap<ClientConfig, CachedClient>>,
	ttl: Duration,
}

impl ClientCache {
	/// Create a new client cache with default 30-minute TTL
	pub fn new() -> Self {
		Self {
			clients: Arc::new(DashMap::new()),
			ttl: Duration::from_secs(30 * 60), // 30 minutes
		}
	}

	/// Create a new client cache with custom TTL
	pub fn with_ttl(ttl: Duration) -> Self {
		Self {
			clients: Arc::new(DashMap::new()),
			ttl,
		}
	}

	/// Get or create an optimized client for the given configuration
	pub fn get_client(&self, config: &ClientConfig) -> ProviderResult<Arc<Client>> {
		// Atomic check and potential removal of expired client
		self.clients.remove_if(config, |_, cached_client| {
			let is_expired = cached_client.is_expired(self.ttl);
			if is_expired {
				warn!(
					"Client cache expired for {} (age: {:?}), will create new client",
					config.base_url,
					cached_client.created_at.elapsed()
				);
			}
			is_expired
		});

		// Check if we have a valid (non-expired) client
		if let Some(cached_client_ref) = self.clients.get(config) {
			let cached_client = cached_client_ref.value();
			debug!(
				"Reusing cached client for {} (age: {:?})",
				config.base_url,
				cached_client.created_at.elapsed()
			);
			return Ok(cached_client.client.clone());
		}

		// Create new client with optimized settings
		debug!("Creating new optimized client for {}", config.base_url);
		let client = Self::build_raw_client(config)?;
		let cached_client = CachedClient::new(client);
		let client_arc = cached_client.client.clone();

		// Atomic insert using entry API to handle concurrent access
		use dashmap::mapref::entry::Entry;

		match self.clients.entry(config.clone()) {
			Entry::Occupied(entry) => {
				// Another thread beat us to it, use the existing client
				debug!(
					"Another thread created client for {}, using existing",
					config.base_url
				);
				return Ok(entry.get().client.clone());
			},
			Entry::Vacant(entry) => {
				entry.insert(cached_client);
				debug!("Successfully cached new client for {}", config.base_url);
			},
		}

		Ok(client_arc)
	}

	/// Build an uncached client for the given configuration
	pub fn build_client(config: &ClientConfig) -> ProviderResult<Arc<Client>> {
		Ok(Arc::new(Self::build_raw_client(config)?))
	}

	fn build_raw_client(config: &ClientConfig) -> ProviderResult<Client> {
		ClientBuilder::new()
			// Fixed timeout shared by all operations of the provider
			.timeout(Duration::from_millis(config.request_timeout_ms))
			// Connection pool optimization
			.pool_max_idle_per_host(config.max_idle_per_host)
			.pool_idle_timeout(Duration::from_millis(config.keep_alive_timeout_ms))
			.tcp_keepalive(Duration::from_secs(60))
			.user_agent("swap-aggregator/0.1")
			.build()
			.map_err(|e| ProviderError::InvalidRequest {
				reason: format!("failed to build HTTP client: {}", e),
			})
	}

	/// Remove all expired clients from the cache
	pub fn cleanup_expired(&self) -> usize {
		let mut removed_count = 0;

		self.clients.retain(|config, cached_client| {
			let is_expired = cached_client.is_expired(self.ttl);
			if is_expired {
				removed_count += 1;
				debug!(
					"Removed expired client for {} (age: {:?})",
					config.base_url,
					cached_client.created_at.elapsed()
				);
			}
			!is_expired // Keep non-expired clients
		});

		if removed_count > 0 {
			debug!("Cleaned up {} expired clients from cache", removed_count);
		}

		removed_count
	}

	/// Clear the cache (useful for testing or memory management)
	pub fn clear(&self) {
		let count = self.clients.len();
		self.clients.clear();
		debug!("Cleared all {} clients from cache", count);
	}

	/// Get the configured TTL duration
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Convenience constructor for provider implementations
	///
	/// The recommended way for providers to share the pooled client
	/// infrastructure.
	pub fn for_provider() -> Self {
		global_client_cache().clone()
	}
}

impl Default for ClientCache {
	fn default() -> Self {
		Self::new()
	}
}

lazy_static::lazy_static! {
	static ref GLOBAL_CLIENT_CACHE: ClientCache = ClientCache::new();
}

/// Get the global client cache instance
pub fn global_client_cache() -> &'static ClientCache {
	&GLOBAL_CLIENT_CACHE
}
