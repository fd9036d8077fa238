//! Shared helpers for integration tests

pub mod upstream;

use std::sync::Arc;
use swap_aggregator::Settings;

/// Default settings shared by most tests
#[allow(dead_code)]
pub fn default_settings() -> Arc<Settings> {
	Arc::new(Settings::default())
}

/// Settings with a short request timeout for failure tests
#[allow(dead_code)]
pub fn settings_with_timeout(request_ms: u64) -> Arc<Settings> {
	let mut settings = Settings::default();
	settings.timeouts.request_ms = request_ms;
	Arc::new(settings)
}
