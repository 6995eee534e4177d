//! Error type shared by handlers and middleware.

use thiserror::Error;

/// Errors raised while building requests or producing responses.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
	/// The request URI could not be parsed.
	#[error("Invalid URI: {0}")]
	InvalidUri(String),

	/// A header name or value was rejected.
	#[error("Invalid header: {0}")]
	InvalidHeader(String),

	/// A body could not be serialized.
	#[error("Serialization error: {0}")]
	Serialization(String),

	/// A handler failed in a way the client cannot correct.
	#[error("Internal server error: {0}")]
	Internal(String),
}

/// Result alias used across the HTTP boundary.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
	/// Returns the HTTP status code this error maps to.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_inertia_http::Error;
	///
	/// assert_eq!(Error::InvalidUri("::".into()).status_code(), 400);
	/// assert_eq!(Error::Internal("boom".into()).status_code(), 500);
	/// ```
	pub fn status_code(&self) -> u16 {
		match self {
			Error::InvalidUri(_) | Error::InvalidHeader(_) => 400,
			Error::Serialization(_) | Error::Internal(_) => 500,
		}
	}
}

impl From<serde_json::Error> for Error {
	fn from(error: serde_json::Error) -> Self {
		Error::Serialization(error.to_string())
	}
}
