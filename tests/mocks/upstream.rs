//! Mock upstream HTTP servers for provider integration tests
//!
//! Spawns real axum routers on 127.0.0.1:0 so providers are exercised over
//! actual HTTP, including timeouts and malformed bodies.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// One running mock upstream with request counting
pub struct MockUpstream {
	pub base_url: String,
	hits: Arc<AtomicUsize>,
	handle: JoinHandle<()>,
}

#[derive(Clone)]
struct UpstreamState {
	status: StatusCode,
	body: String,
	delay: Option<Duration>,
	hits: Arc<AtomicUsize>,
}

async fn respond(State(state): State<UpstreamState>) -> impl IntoResponse {
	state.hits.fetch_add(1, Ordering::SeqCst);
	if let Some(delay) = state.delay {
		tokio::time::sleep(delay).await;
	}
	(state.status, state.body.clone())
}

#[allow(dead_code)]
impl MockUpstream {
	/// Server answering every path with the given status and JSON body
	pub async fn spawn_json(status: StatusCode, body: Value) -> Self {
		Self::spawn_inner(status, body.to_string(), None).await
	}

	/// Server answering with a raw (possibly empty or non-JSON) body
	pub async fn spawn_raw(status: StatusCode, body: impl Into<String>) -> Self {
		Self::spawn_inner(status, body.into(), None).await
	}

	/// Server that sleeps before answering, for timeout tests
	pub async fn spawn_with_delay(status: StatusCode, body: Value, delay: Duration) -> Self {
		Self::spawn_inner(status, body.to_string(), Some(delay)).await
	}

	async fn spawn_inner(status: StatusCode, body: String, delay: Option<Duration>) -> Self {
		let hits = Arc::new(AtomicUsize::new(0));
		let state = UpstreamState {
			status,
			body,
			delay,
			hits: hits.clone(),
		};
		let app = Router::new().fallback(respond).with_state(state);

		let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
			.await
			.expect("bind test port");
		let addr = listener.local_addr().unwrap();
		let base_url = format!("http://{}", addr);

		let handle = tokio::spawn(async move {
			let _ = axum::serve(listener, app).await;
		});

		// Give the server time to start
		tokio::time::sleep(Duration::from_millis(10)).await;

		Self {
			base_url,
			hits,
			handle,
		}
	}

	/// Number of requests the server has received
	pub fn hit_count(&self) -> usize {
		self.hits.load(Ordering::SeqCst)
	}

	pub fn abort(&self) {
		self.handle.abort();
	}
}
