use async_trait::async_trait;
use serde_json::Value;

/// Markup produced by the SSR server for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SsrResponse {
	/// Head tags, one per line.
	pub head: String,
	/// Markup replacing the root mount element.
	pub body: String,
}

impl SsrResponse {
	pub fn new(head: impl Into<String>, body: impl Into<String>) -> Self {
		Self {
			head: head.into(),
			body: body.into(),
		}
	}
}

/// Renders page objects to markup.
#[async_trait]
pub trait Gateway: Send + Sync {
	/// Renders `page`, or returns `None` when SSR is disabled or failed.
	async fn dispatch(&self, page: &Value) -> Option<SsrResponse>;
}

/// Health probe for operational tooling. Not used on the request path.
#[async_trait]
pub trait HasHealthCheck: Send + Sync {
	async fn is_healthy(&self) -> bool;
}

/// Gateway that never renders.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopGateway;

#[async_trait]
impl Gateway for NoopGateway {
	async fn dispatch(&self, _page: &Value) -> Option<SsrResponse> {
		None
	}
}
