//! HTTP gateway to an external SSR server.
//!
//! The server is expected to accept `POST /render` with the page object as
//! JSON and answer `{"head": ["<title>..</title>", ...], "body": "<div ..>"}`.
//! `GET /health` answers with a success status when the server is up.

use async_trait::async_trait;
use reinhardt_inertia_conf::SsrConfig;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

use crate::bundle::BundleDetector;
use crate::error::SsrDispatchError;
use crate::gateway::{Gateway, HasHealthCheck, SsrResponse};

#[derive(Debug, Deserialize)]
struct RenderedPage {
	head: Vec<String>,
	body: String,
}

/// Dispatches pages to an SSR server over HTTP.
pub struct HttpGateway {
	config: SsrConfig,
	client: Client,
	detector: BundleDetector,
}

impl HttpGateway {
	/// Creates a gateway for `config`, probing for bundles under `root`.
	///
	/// # Errors
	///
	/// Returns an error if the HTTP client cannot be built.
	pub fn new(config: SsrConfig, root: impl Into<PathBuf>) -> Result<Self, SsrDispatchError> {
		let client = Client::builder()
			.timeout(Duration::from_secs(config.timeout_secs))
			.build()?;

		Ok(Self::with_client(config, root, client))
	}

	/// Creates a gateway with a custom client.
	pub fn with_client(config: SsrConfig, root: impl Into<PathBuf>, client: Client) -> Self {
		let detector = BundleDetector::new(root).with_bundle(config.bundle.clone());
		Self {
			config,
			client,
			detector,
		}
	}

	pub fn config(&self) -> &SsrConfig {
		&self.config
	}

	fn should_dispatch(&self) -> bool {
		if !self.config.enabled {
			return false;
		}
		if !self.config.ensure_bundle_exists {
			return true;
		}
		self.detector.detect().is_some()
	}

	/// Builds `{scheme}://{host}:{port}{path}` from the configured URL.
	///
	/// Any path, query or credentials in the configured URL are dropped.
	pub fn endpoint(&self, path: &str) -> Result<String, SsrDispatchError> {
		let invalid = |message: String| SsrDispatchError::InvalidUrl {
			url: self.config.url.clone(),
			message,
		};

		let parsed = url::Url::parse(&self.config.url).map_err(|e| invalid(e.to_string()))?;
		let host = parsed
			.host_str()
			.ok_or_else(|| invalid("missing host".to_string()))?;
		let port = parsed
			.port_or_known_default()
			.ok_or_else(|| invalid("missing port".to_string()))?;

		let path = if path.starts_with('/') {
			path.to_string()
		} else {
			format!("/{path}")
		};

		Ok(format!("{}://{}:{}{}", parsed.scheme(), host, port, path))
	}

	async fn render(&self, page: &Value) -> Result<Option<SsrResponse>, SsrDispatchError> {
		let response = self
			.client
			.post(self.endpoint("/render")?)
			.json(page)
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			return Err(SsrDispatchError::Status(status.as_u16()));
		}

		let bytes = response.bytes().await?;
		let rendered: Option<RenderedPage> = serde_json::from_slice(&bytes)?;

		Ok(rendered.map(|page| SsrResponse::new(page.head.join("\n"), page.body)))
	}
}

#[async_trait]
impl Gateway for HttpGateway {
	async fn dispatch(&self, page: &Value) -> Option<SsrResponse> {
		if !self.should_dispatch() {
			tracing::debug!(
				enabled = self.config.enabled,
				"SSR dispatch skipped, rendering on the client"
			);
			return None;
		}

		match self.render(page).await {
			Ok(rendered) => rendered,
			Err(error) => {
				tracing::warn!(%error, url = %self.config.url, "SSR dispatch failed, rendering on the client");
				None
			}
		}
	}
}

#[async_trait]
impl HasHealthCheck for HttpGateway {
	async fn is_healthy(&self) -> bool {
		let Ok(url) = self.endpoint("/health") else {
			return false;
		};

		match self.client.get(url).send().await {
			Ok(response) => response.status().is_success(),
			Err(error) => {
				tracing::debug!(%error, "SSR health check failed");
				false
			}
		}
	}
}
