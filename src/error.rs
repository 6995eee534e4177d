//! Error types for Inertia rendering.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by fallible prop producers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while rendering an Inertia response.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
	/// Page checking is enabled and no file matches the component.
	#[error("Inertia page component [{component}] not found. Searched in paths: {}", display_paths(.searched_paths))]
	ComponentNotFound {
		component: String,
		searched_paths: Vec<PathBuf>,
	},

	/// A prop producer failed. The producer's error is passed through as-is.
	#[error(transparent)]
	Prop(BoxError),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	/// A handler asked for the response factory but the Inertia middleware
	/// did not run for this request.
	#[error("Inertia context missing from request extensions; is InertiaMiddleware installed?")]
	MissingContext,

	#[error(transparent)]
	Http(#[from] reinhardt_inertia_http::Error),
}

/// Result alias for Inertia operations.
pub type Result<T> = std::result::Result<T, Error>;

fn display_paths(paths: &[PathBuf]) -> String {
	paths
		.iter()
		.map(|path| path.display().to_string())
		.collect::<Vec<_>>()
		.join(", ")
}

impl From<Error> for reinhardt_inertia_http::Error {
	fn from(error: Error) -> Self {
		match error {
			Error::Http(inner) => inner,
			Error::Serialization(inner) => Self::Serialization(inner.to_string()),
			other => Self::Internal(other.to_string()),
		}
	}
}
