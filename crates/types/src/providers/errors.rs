//! Error types for provider operations

use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Validation errors for provider descriptors
#[derive(Error, Debug)]
pub enum ProviderValidationError {
	#[error("Invalid provider name: {name}")]
	InvalidProviderName { name: String },

	#[error("Invalid version format: {version}")]
	InvalidVersion { version: String },

	#[error("Missing required field: {field}")]
	MissingRequiredField { field: String },
}

/// Structured failure context carried by classified provider errors
///
/// Constructed at the failure site, logged once by the classifier, then
/// returned inside the error. Never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
	/// Provider name the failure belongs to
	pub provider: String,
	/// Human-readable message, extracted from the upstream body when possible
	pub message: String,
	/// URL of the request that failed
	pub url: String,
	/// Request parameters, chain id, wallet, response body and similar
	pub context: HashMap<String, Value>,
}

impl ErrorRecord {
	pub fn new(
		provider: impl Into<String>,
		message: impl Into<String>,
		url: impl Into<String>,
	) -> Self {
		Self {
			provider: provider.into(),
			message: message.into(),
			url: url.into(),
			context: HashMap::new(),
		}
	}

	/// Attach structured context for logging
	pub fn with_context(mut self, context: HashMap<String, Value>) -> Self {
		self.context = context;
		self
	}
}

impl std::fmt::Display for ErrorRecord {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}: {} (url: {})", self.provider, self.message, self.url)
	}
}

/// Domain error taxonomy returned by provider operations
///
/// Callers use the kind to decide between retrying, falling back to another
/// provider, or reporting the failure to the user.
#[derive(Error, Debug)]
pub enum ProviderError {
	#[error("Provider validation failed: {0}")]
	Validation(#[from] ProviderValidationError),

	#[error("Chain {chain_id} is not supported by provider {provider}")]
	UnsupportedChain { provider: String, chain_id: u64 },

	#[error("Invalid request: {reason}")]
	InvalidRequest { reason: String },

	#[error("Transport failure: {0}")]
	Transport(ErrorRecord),

	#[error("Malformed upstream response: {0}")]
	MalformedResponse(ErrorRecord),

	#[error("Rate limit exceeded: {0}")]
	RateLimited(ErrorRecord),

	#[error("Authentication failed: {0}")]
	Unauthorized(ErrorRecord),

	#[error("Insufficient liquidity: {0}")]
	InsufficientLiquidity(ErrorRecord),

	#[error("Estimation failed: {0}")]
	Estimation(ErrorRecord),

	#[error("Aggregation provider error: {0}")]
	Aggregation(ErrorRecord),
}

impl ProviderError {
	/// The error record carried by classified kinds, if any
	pub fn record(&self) -> Option<&ErrorRecord> {
		match self {
			ProviderError::Transport(record)
			| ProviderError::MalformedResponse(record)
			| ProviderError::RateLimited(record)
			| ProviderError::Unauthorized(record)
			| ProviderError::InsufficientLiquidity(record)
			| ProviderError::Estimation(record)
			| ProviderError::Aggregation(record) => Some(record),
			_ => None,
		}
	}

	/// Whether the caller may reasonably retry against the same provider
	pub fn is_retryable(&self) -> bool {
		matches!(
			self,
			ProviderError::Transport(_) | ProviderError::RateLimited(_)
		)
	}
}

/// Low-level failure raised by the shared request executor
///
/// Always consumed by the exception classifier; never crosses the provider
/// boundary raw.
#[derive(Error, Debug)]
pub enum UpstreamFailure {
	#[error("upstream request timed out")]
	Timeout,

	#[error("transport error: {0}")]
	Transport(String),

	#[error("HTTP {status}")]
	Status { status: u16, body: Value },

	#[error("malformed response body: {reason}")]
	MalformedBody { reason: String },
}

impl UpstreamFailure {
	/// HTTP status code, when the failure carries one
	pub fn status(&self) -> Option<u16> {
		match self {
			UpstreamFailure::Status { status, .. } => Some(*status),
			_ => None,
		}
	}
}

impl From<reqwest::Error> for UpstreamFailure {
	fn from(err: reqwest::Error) -> Self {
		if err.is_timeout() {
			UpstreamFailure::Timeout
		} else {
			UpstreamFailure::Transport(err.to_string())
		}
	}
}
