//! Two-tier exception classification shared by all providers
//!
//! Shared conditions every upstream has in common (timeouts, disconnects,
//! malformed bodies, rate limiting, auth) are recognized first; only then
//! does the provider's own ordered pattern table get a say. Classification
//! is deterministic and order-sensitive: the first matching pattern wins.

use serde_json::Value;
use std::collections::HashMap;
use swap_types::{ErrorRecord, ProviderError, UpstreamFailure};
use tracing::{error, warn};

/// Domain kinds a provider pattern table can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
	InsufficientLiquidity,
	Estimation,
}

/// Ordered, case-insensitive substring patterns; first match wins
///
/// Matching is deliberately unanchored: upstream message formats are not
/// contractually stable, so the table is kept as plain substrings rather
/// than anchored expressions.
pub type ErrorPatterns = &'static [(&'static str, PatternKind)];

/// Classify an upstream failure into a domain error
///
/// The shared tier is consulted first and logged at error severity; a
/// provider's patterns never override it. Otherwise the extracted message
/// is scanned against the ordered pattern table and the result is logged
/// at warning severity, falling back to the generic aggregation error.
/// The caller is responsible for propagating the returned error.
pub fn classify(
	failure: &UpstreamFailure,
	provider: &str,
	url: &str,
	patterns: ErrorPatterns,
	context: HashMap<String, Value>,
) -> ProviderError {
	if let Some(err) = classify_shared(failure, provider, url, &context) {
		if let Some(record) = err.record() {
			error!(
				provider = %record.provider,
				url = %record.url,
				context = ?record.context,
				"{}",
				record.message
			);
		}
		return err;
	}

	let message = extract_message(failure);
	let lowered = message.to_lowercase();
	let kind = patterns
		.iter()
		.find(|(pattern, _)| lowered.contains(&pattern.to_lowercase()))
		.map(|(_, kind)| *kind);

	let record = ErrorRecord::new(provider, message, url).with_context(context);
	warn!(
		provider = %record.provider,
		url = %record.url,
		context = ?record.context,
		"{}",
		record.message
	);

	match kind {
		Some(PatternKind::InsufficientLiquidity) => ProviderError::InsufficientLiquidity(record),
		Some(PatternKind::Estimation) => ProviderError::Estimation(record),
		None => ProviderError::Aggregation(record),
	}
}

/// Cross-provider classification of generic upstream conditions
fn classify_shared(
	failure: &UpstreamFailure,
	provider: &str,
	url: &str,
	context: &HashMap<String, Value>,
) -> Option<ProviderError> {
	let record = |message: String| {
		ErrorRecord::new(provider, message, url).with_context(context.clone())
	};

	match failure {
		UpstreamFailure::Timeout => Some(ProviderError::Transport(record(
			"upstream request timed out".to_string(),
		))),
		UpstreamFailure::Transport(reason) => Some(ProviderError::Transport(record(format!(
			"transport error: {}",
			reason
		)))),
		UpstreamFailure::MalformedBody { reason } => Some(ProviderError::MalformedResponse(
			record(format!("malformed upstream response: {}", reason)),
		)),
		UpstreamFailure::Status { status: 429, .. } => Some(ProviderError::RateLimited(record(
			"upstream rate limit exceeded".to_string(),
		))),
		UpstreamFailure::Status {
			status: 401 | 403, ..
		} => Some(ProviderError::Unauthorized(record(
			"upstream authentication failed".to_string(),
		))),
		UpstreamFailure::Status { .. } => None,
	}
}

/// Best human-readable message for a failure
///
/// Status-failure bodies prefer the `error` field, then `message`, looked
/// up on the first mapping of a sequence or on the mapping itself; anything
/// else falls back to the failure's own text.
pub fn extract_message(failure: &UpstreamFailure) -> String {
	if let UpstreamFailure::Status { body, .. } = failure {
		let object = match body {
			Value::Array(items) => items.first().and_then(Value::as_object),
			Value::Object(map) => Some(map),
			_ => None,
		};
		if let Some(map) = object {
			for key in ["error", "message"] {
				if let Some(text) = map.get(key).and_then(Value::as_str) {
					return text.to_string();
				}
			}
		}
	}
	failure.to_string()
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	const TEST_PATTERNS: ErrorPatterns = &[
		("insufficient liquidity", PatternKind::InsufficientLiquidity),
		("insufficient balance", PatternKind::InsufficientLiquidity),
		("cannot estimate", PatternKind::Estimation),
		("no route found", PatternKind::InsufficientLiquidity),
	];

	fn status_failure(status: u16, body: Value) -> UpstreamFailure {
		UpstreamFailure::Status { status, body }
	}

	fn classify_test(failure: &UpstreamFailure) -> ProviderError {
		classify(
			failure,
			"test-provider",
			"https://api.example.com/route",
			TEST_PATTERNS,
			HashMap::new(),
		)
	}

	#[test]
	fn test_liquidity_pattern_any_case() {
		let failure = status_failure(400, json!({"error": "Insufficient Liquidity for pair"}));
		assert!(matches!(
			classify_test(&failure),
			ProviderError::InsufficientLiquidity(_)
		));

		let failure = status_failure(400, json!({"error": "INSUFFICIENT LIQUIDITY"}));
		assert!(matches!(
			classify_test(&failure),
			ProviderError::InsufficientLiquidity(_)
		));
	}

	#[test]
	fn test_estimation_pattern() {
		let failure = status_failure(400, json!({"error": "cannot estimate gas for swap"}));
		assert!(matches!(classify_test(&failure), ProviderError::Estimation(_)));
	}

	#[test]
	fn test_first_match_wins() {
		// Message matches both "cannot estimate" and "insufficient
		// liquidity"; table order decides, not match position in the
		// message
		let failure = status_failure(
			400,
			json!({"error": "cannot estimate swap: insufficient liquidity in pool"}),
		);
		match classify_test(&failure) {
			ProviderError::InsufficientLiquidity(record) => {
				assert!(record.message.contains("cannot estimate"));
			},
			other => panic!("expected InsufficientLiquidity, got {}", other),
		}
	}

	#[test]
	fn test_unmatched_message_falls_back_to_generic() {
		let failure = status_failure(400, json!({"error": "something entirely else"}));
		assert!(matches!(
			classify_test(&failure),
			ProviderError::Aggregation(_)
		));
	}

	#[test]
	fn test_shared_tier_wins_over_patterns() {
		// A 429 whose body mentions liquidity still classifies as rate
		// limiting; provider patterns never override the shared tier
		let failure = status_failure(429, json!({"error": "insufficient liquidity"}));
		assert!(matches!(
			classify_test(&failure),
			ProviderError::RateLimited(_)
		));

		let failure = status_failure(401, json!({"error": "cannot estimate"}));
		assert!(matches!(
			classify_test(&failure),
			ProviderError::Unauthorized(_)
		));
	}

	#[test]
	fn test_timeout_and_malformed_classification() {
		assert!(matches!(
			classify_test(&UpstreamFailure::Timeout),
			ProviderError::Transport(_)
		));
		assert!(matches!(
			classify_test(&UpstreamFailure::Transport("connection reset".to_string())),
			ProviderError::Transport(_)
		));
		assert!(matches!(
			classify_test(&UpstreamFailure::MalformedBody {
				reason: "expected value at line 1".to_string()
			}),
			ProviderError::MalformedResponse(_)
		));
	}

	#[test]
	fn test_extract_message_priority() {
		// `error` beats `message`
		let failure = status_failure(400, json!({"error": "the error", "message": "the message"}));
		assert_eq!(extract_message(&failure), "the error");

		// `message` used when `error` is absent
		let failure = status_failure(400, json!({"message": "the message"}));
		assert_eq!(extract_message(&failure), "the message");

		// First mapping of a sequence
		let failure = status_failure(400, json!([{"error": "from array"}]));
		assert_eq!(extract_message(&failure), "from array");

		// Neither field present: raw failure text
		let failure = status_failure(502, json!({"status": "bad"}));
		assert_eq!(extract_message(&failure), "HTTP 502");
	}

	#[test]
	fn test_classified_error_keeps_context() {
		let context = HashMap::from([
			("chain_id".to_string(), json!(8453)),
			("token_address".to_string(), json!("0xsell")),
		]);
		let failure = status_failure(400, json!({"error": "no route found"}));
		let err = classify(
			&failure,
			"test-provider",
			"https://api.example.com/route",
			TEST_PATTERNS,
			context,
		);

		let record = err.record().unwrap();
		assert_eq!(record.provider, "test-provider");
		assert_eq!(record.url, "https://api.example.com/route");
		assert_eq!(record.context.get("chain_id"), Some(&json!(8453)));
	}
}
