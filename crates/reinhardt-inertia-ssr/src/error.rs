use thiserror::Error;

/// Reasons an SSR dispatch produced no markup.
///
/// These never reach the request path: gateways log them and return `None`.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SsrDispatchError {
	#[error("Invalid SSR URL {url}: {message}")]
	InvalidUrl { url: String, message: String },

	#[cfg(feature = "http-gateway")]
	#[error("SSR transport error: {0}")]
	Transport(#[from] reqwest::Error),

	#[error("SSR server responded with status {0}")]
	Status(u16),

	#[error("Malformed SSR payload: {0}")]
	Payload(#[from] serde_json::Error),
}
