use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Unsupported configuration format: {0}")]
	UnsupportedFormat(String),

	#[error("Invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
