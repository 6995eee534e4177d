//! Inertia configuration types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{ConfigError, Result};

pub const DEFAULT_SSR_URL: &str = "http://127.0.0.1:13714";
pub const DEFAULT_SSR_TIMEOUT_SECS: u64 = 5;

/// Server-side rendering gateway settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsrConfig {
	/// Dispatch full page visits to the SSR server.
	pub enabled: bool,
	/// Base URL of the SSR server.
	pub url: String,
	/// Explicit bundle path. When unset the default locations are probed.
	pub bundle: Option<PathBuf>,
	/// Skip dispatch when no bundle can be found on disk.
	pub ensure_bundle_exists: bool,
	/// Upper bound for one dispatch round trip.
	pub timeout_secs: u64,
}

impl Default for SsrConfig {
	fn default() -> Self {
		Self {
			enabled: false,
			url: DEFAULT_SSR_URL.to_string(),
			bundle: None,
			ensure_bundle_exists: true,
			timeout_secs: DEFAULT_SSR_TIMEOUT_SECS,
		}
	}
}

impl SsrConfig {
	/// Enabled SSR pointing at `url`.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_inertia_conf::SsrConfig;
	///
	/// let ssr = SsrConfig::enabled("http://localhost:13714");
	/// assert!(ssr.enabled);
	/// assert!(ssr.ensure_bundle_exists);
	/// ```
	pub fn enabled(url: impl Into<String>) -> Self {
		Self {
			enabled: true,
			url: url.into(),
			..Self::default()
		}
	}

	pub fn with_bundle(mut self, bundle: impl Into<PathBuf>) -> Self {
		self.bundle = Some(bundle.into());
		self
	}

	pub fn ensure_bundle_exists(mut self, ensure: bool) -> Self {
		self.ensure_bundle_exists = ensure;
		self
	}

	pub fn with_timeout_secs(mut self, secs: u64) -> Self {
		self.timeout_secs = secs;
		self
	}
}

/// Page component existence checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
	/// Fail rendering when no page file matches the component name.
	pub ensure_pages_exist: bool,
	/// Directories searched for page components.
	pub page_paths: Vec<PathBuf>,
	/// File extensions tried for each component, with or without a leading dot.
	pub page_extensions: Vec<String>,
}

impl Default for PageConfig {
	fn default() -> Self {
		Self {
			ensure_pages_exist: false,
			page_paths: vec![PathBuf::from("app/")],
			page_extensions: ["js", "jsx", "svelte", "ts", "tsx", "vue"]
				.into_iter()
				.map(str::to_string)
				.collect(),
		}
	}
}

impl PageConfig {
	/// Page checking enabled for the given directories, default extensions.
	pub fn checked<I, P>(paths: I) -> Self
	where
		I: IntoIterator<Item = P>,
		P: Into<PathBuf>,
	{
		Self {
			ensure_pages_exist: true,
			page_paths: paths.into_iter().map(Into::into).collect(),
			..Self::default()
		}
	}

	pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.page_extensions = extensions.into_iter().map(Into::into).collect();
		self
	}
}

/// Browser history settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
	/// Default for `encryptHistory` when a request does not set it.
	pub encrypt: bool,
}

/// Top-level Inertia configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InertiaConfig {
	pub ssr: SsrConfig,
	pub pages: PageConfig,
	pub history: HistoryConfig,
	pub transform_pagination: bool,
}

impl Default for InertiaConfig {
	fn default() -> Self {
		Self {
			ssr: SsrConfig::default(),
			pages: PageConfig::default(),
			history: HistoryConfig::default(),
			transform_pagination: true,
		}
	}
}

impl InertiaConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_ssr(mut self, ssr: SsrConfig) -> Self {
		self.ssr = ssr;
		self
	}

	pub fn with_pages(mut self, pages: PageConfig) -> Self {
		self.pages = pages;
		self
	}

	pub fn encrypt_history(mut self, encrypt: bool) -> Self {
		self.history.encrypt = encrypt;
		self
	}

	pub fn transform_pagination(mut self, transform: bool) -> Self {
		self.transform_pagination = transform;
		self
	}

	/// Parses configuration from TOML text.
	pub fn from_toml_str(source: &str) -> Result<Self> {
		Ok(toml::from_str(source)?)
	}

	/// Parses configuration from JSON text.
	pub fn from_json_str(source: &str) -> Result<Self> {
		Ok(serde_json::from_str(source)?)
	}

	/// Loads configuration from a `.toml` or `.json` file.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::UnsupportedFormat`] for any other extension.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let extension = path
			.extension()
			.and_then(|ext| ext.to_str())
			.map(str::to_lowercase);

		match extension.as_deref() {
			Some("toml") => Self::from_toml_str(&std::fs::read_to_string(path)?),
			Some("json") => Self::from_json_str(&std::fs::read_to_string(path)?),
			_ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
		}
	}

	/// Defaults overridden by `INERTIA_*` environment variables.
	pub fn from_env() -> Result<Self> {
		let mut config = Self::default();
		config.apply_env()?;
		Ok(config)
	}

	/// Applies `INERTIA_*` environment variable overrides in place.
	pub fn apply_env(&mut self) -> Result<()> {
		crate::env::apply_overrides(self, |key| std::env::var(key).ok())
	}

	/// Checks option combinations that cannot work at runtime.
	///
	/// # Errors
	///
	/// - the SSR URL does not parse or lacks a host while SSR is enabled
	/// - page checking is enabled without any extension to try
	pub fn validate(&self) -> Result<()> {
		if self.ssr.enabled {
			let parsed = url::Url::parse(&self.ssr.url).map_err(|e| ConfigError::InvalidValue {
				key: "ssr.url".to_string(),
				message: e.to_string(),
			})?;
			if parsed.host_str().is_none() {
				return Err(ConfigError::InvalidValue {
					key: "ssr.url".to_string(),
					message: format!("{} has no host", self.ssr.url),
				});
			}
		}

		if self.pages.ensure_pages_exist && self.pages.page_extensions.is_empty() {
			return Err(ConfigError::InvalidValue {
				key: "pages.page_extensions".to_string(),
				message: "at least one extension is required when page checking is enabled"
					.to_string(),
			});
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults() {
		let config = InertiaConfig::default();

		assert!(!config.ssr.enabled);
		assert_eq!(config.ssr.url, "http://127.0.0.1:13714");
		assert_eq!(config.ssr.bundle, None);
		assert!(config.ssr.ensure_bundle_exists);
		assert!(!config.pages.ensure_pages_exist);
		assert_eq!(config.pages.page_paths, vec![PathBuf::from("app/")]);
		assert_eq!(
			config.pages.page_extensions,
			vec!["js", "jsx", "svelte", "ts", "tsx", "vue"]
		);
		assert!(!config.history.encrypt);
		assert!(config.transform_pagination);
	}

	#[rstest]
	fn test_partial_toml_keeps_defaults() {
		let config = InertiaConfig::from_toml_str(
			r#"
			[history]
			encrypt = true

			[pages]
			ensure_pages_exist = true
			page_paths = ["resources/js/Pages"]
			"#,
		)
		.unwrap();

		assert!(config.history.encrypt);
		assert!(config.pages.ensure_pages_exist);
		assert_eq!(config.pages.page_paths, vec![PathBuf::from("resources/js/Pages")]);
		assert_eq!(config.pages.page_extensions.len(), 6);
		assert_eq!(config.ssr, SsrConfig::default());
	}

	#[rstest]
	fn test_json_source() {
		let config =
			InertiaConfig::from_json_str(r#"{"ssr": {"enabled": true, "bundle": "ssr/app.js"}}"#)
				.unwrap();

		assert!(config.ssr.enabled);
		assert_eq!(config.ssr.bundle, Some(PathBuf::from("ssr/app.js")));
		assert!(config.transform_pagination);
	}

	#[rstest]
	fn test_builder_methods() {
		let config = InertiaConfig::new()
			.with_ssr(SsrConfig::enabled("http://localhost:13714").ensure_bundle_exists(false))
			.with_pages(PageConfig::checked(["pages"]).with_extensions([".vue"]))
			.encrypt_history(true)
			.transform_pagination(false);

		assert!(config.ssr.enabled);
		assert!(!config.ssr.ensure_bundle_exists);
		assert!(config.pages.ensure_pages_exist);
		assert_eq!(config.pages.page_extensions, vec![".vue"]);
		assert!(config.history.encrypt);
		assert!(!config.transform_pagination);
	}

	#[rstest]
	#[case("not a url")]
	#[case("unix:/run/ssr.sock")]
	fn test_validate_rejects_bad_ssr_url(#[case] url: &str) {
		let config = InertiaConfig::new().with_ssr(SsrConfig::enabled(url));
		assert!(matches!(
			config.validate(),
			Err(ConfigError::InvalidValue { ref key, .. }) if key == "ssr.url"
		));
	}

	#[rstest]
	fn test_validate_ignores_url_when_ssr_disabled() {
		let mut config = InertiaConfig::new();
		config.ssr.url = "not a url".to_string();
		assert!(config.validate().is_ok());
	}

	#[rstest]
	fn test_validate_requires_extensions_when_checking_pages() {
		let config = InertiaConfig::new()
			.with_pages(PageConfig::checked(["pages"]).with_extensions(Vec::<String>::new()));
		assert!(config.validate().is_err());
	}
}
