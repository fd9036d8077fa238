//! Shared upstream request execution

use reqwest::{Client, Method};
use serde_json::{json, Value};
use swap_types::{ProviderError, UpstreamFailure};
use tracing::debug;
use url::Url;

/// Clamp out-of-range HTTP status codes to 500
///
/// Some upstream transports report status 0 on failure; anything outside
/// 100-599 is treated as an internal server error before classification.
pub(crate) fn normalize_status(status: i64) -> u16 {
	if (100..600).contains(&status) {
		status as u16
	} else {
		500
	}
}

/// Join a path onto a base URL, treating the base as a directory
pub(crate) fn join_url(base_url: &str, path: &str) -> Result<String, ProviderError> {
	let mut base = Url::parse(base_url).map_err(|e| ProviderError::InvalidRequest {
		reason: format!("invalid base URL '{}': {}", base_url, e),
	})?;

	// Ensure the base URL is treated as a directory by ensuring it ends with a slash
	if !base.path().ends_with('/') {
		base.set_path(&format!("{}/", base.path()));
	}

	let joined = base.join(path).map_err(|e| ProviderError::InvalidRequest {
		reason: format!("failed to join '{}' to base '{}': {}", path, base_url, e),
	})?;

	Ok(joined.to_string())
}

/// Execute an upstream request and parse the body
///
/// The full body is read before the status is inspected so error bodies
/// keep their diagnostic JSON. Empty bodies parse to an empty mapping.
/// Non-2xx responses carry the normalized status and the parsed body
/// tagged with a `source` label for the classifier.
pub(crate) async fn execute(
	client: &Client,
	method: Method,
	url: &str,
	query: &[(String, String)],
	body: Option<&Value>,
	source: &str,
) -> Result<Value, UpstreamFailure> {
	let mut request = client.request(method.clone(), url);
	if !query.is_empty() {
		request = request.query(query);
	}
	if let Some(body) = body {
		request = request.json(body);
	}

	let response = request.send().await?;
	let status = response.status();
	debug!("Request {} {}", method, response.url());

	let bytes = response.bytes().await?;
	if bytes.is_empty() {
		return Ok(json!({}));
	}

	let mut data: Value =
		serde_json::from_slice(&bytes).map_err(|e| UpstreamFailure::MalformedBody {
			reason: e.to_string(),
		})?;

	if !status.is_success() {
		let status = normalize_status(i64::from(status.as_u16()));
		if let Some(map) = data.as_object_mut() {
			map.insert("source".to_string(), Value::String(source.to_string()));
		}
		return Err(UpstreamFailure::Status { status, body: data });
	}

	Ok(data)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_normalize_status_out_of_range() {
		assert_eq!(normalize_status(0), 500);
		assert_eq!(normalize_status(-1), 500);
		assert_eq!(normalize_status(700), 500);
		assert_eq!(normalize_status(600), 500);
		assert_eq!(normalize_status(99), 500);
	}

	#[test]
	fn test_normalize_status_in_range() {
		assert_eq!(normalize_status(100), 100);
		assert_eq!(normalize_status(404), 404);
		assert_eq!(normalize_status(599), 599);
	}

	#[test]
	fn test_join_url() {
		assert_eq!(
			join_url("https://api.fibrous.finance/base", "route").unwrap(),
			"https://api.fibrous.finance/base/route"
		);
		assert_eq!(
			join_url("https://api.fibrous.finance/base/", "route").unwrap(),
			"https://api.fibrous.finance/base/route"
		);
		assert_eq!(
			join_url("https://api.example.com", "healthCheck").unwrap(),
			"https://api.example.com/healthCheck"
		);
	}

	#[test]
	fn test_join_url_invalid_base() {
		assert!(join_url("not a url", "route").is_err());
	}
}
