//! Environment variable overrides.
//!
//! | Variable | Field |
//! |---|---|
//! | `INERTIA_SSR_ENABLED` | `ssr.enabled` |
//! | `INERTIA_SSR_URL` | `ssr.url` |
//! | `INERTIA_SSR_BUNDLE` | `ssr.bundle` |
//! | `INERTIA_SSR_ENSURE_BUNDLE_EXISTS` | `ssr.ensure_bundle_exists` |
//! | `INERTIA_SSR_TIMEOUT_SECS` | `ssr.timeout_secs` |
//! | `INERTIA_ENSURE_PAGES_EXIST` | `pages.ensure_pages_exist` |
//! | `INERTIA_PAGE_PATHS` | `pages.page_paths` (comma-separated) |
//! | `INERTIA_PAGE_EXTENSIONS` | `pages.page_extensions` (comma-separated) |
//! | `INERTIA_HISTORY_ENCRYPT` | `history.encrypt` |
//! | `INERTIA_TRANSFORM_PAGINATION` | `transform_pagination` |

use std::path::PathBuf;

use crate::{ConfigError, InertiaConfig, Result};

pub const ENV_PREFIX: &str = "INERTIA_";

/// Parses a boolean flag the way Django-style settings do.
///
/// # Examples
///
/// ```
/// use reinhardt_inertia_conf::env::parse_bool;
///
/// assert_eq!(parse_bool("yes"), Some(true));
/// assert_eq!(parse_bool(" OFF "), Some(false));
/// assert_eq!(parse_bool("maybe"), None);
/// ```
pub fn parse_bool(value: &str) -> Option<bool> {
	match value.trim().to_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Some(true),
		"false" | "0" | "no" | "off" => Some(false),
		_ => None,
	}
}

/// Splits a comma-separated list, dropping empty entries.
pub fn parse_list(value: &str) -> Vec<String> {
	value
		.split(',')
		.map(str::trim)
		.filter(|item| !item.is_empty())
		.map(str::to_string)
		.collect()
}

fn bool_var(key: &str, value: &str) -> Result<bool> {
	parse_bool(value).ok_or_else(|| ConfigError::InvalidValue {
		key: key.to_string(),
		message: format!("expected a boolean, got {value:?}"),
	})
}

/// Applies overrides read through `lookup` (variable name to value).
///
/// Unset variables leave the corresponding field untouched.
pub fn apply_overrides<F>(config: &mut InertiaConfig, lookup: F) -> Result<()>
where
	F: Fn(&str) -> Option<String>,
{
	let var = |name: &str| {
		let key = format!("{ENV_PREFIX}{name}");
		lookup(&key).map(|value| (key, value))
	};

	if let Some((key, value)) = var("SSR_ENABLED") {
		config.ssr.enabled = bool_var(&key, &value)?;
	}
	if let Some((_, value)) = var("SSR_URL") {
		config.ssr.url = value.trim().to_string();
	}
	if let Some((_, value)) = var("SSR_BUNDLE") {
		let value = value.trim();
		config.ssr.bundle = (!value.is_empty()).then(|| PathBuf::from(value));
	}
	if let Some((key, value)) = var("SSR_ENSURE_BUNDLE_EXISTS") {
		config.ssr.ensure_bundle_exists = bool_var(&key, &value)?;
	}
	if let Some((key, value)) = var("SSR_TIMEOUT_SECS") {
		config.ssr.timeout_secs =
			value
				.trim()
				.parse()
				.map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
					key,
					message: e.to_string(),
				})?;
	}
	if let Some((key, value)) = var("ENSURE_PAGES_EXIST") {
		config.pages.ensure_pages_exist = bool_var(&key, &value)?;
	}
	if let Some((_, value)) = var("PAGE_PATHS") {
		config.pages.page_paths = parse_list(&value).into_iter().map(PathBuf::from).collect();
	}
	if let Some((_, value)) = var("PAGE_EXTENSIONS") {
		config.pages.page_extensions = parse_list(&value);
	}
	if let Some((key, value)) = var("HISTORY_ENCRYPT") {
		config.history.encrypt = bool_var(&key, &value)?;
	}
	if let Some((key, value)) = var("TRANSFORM_PAGINATION") {
		config.transform_pagination = bool_var(&key, &value)?;
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::collections::HashMap;

	fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |key| map.get(key).cloned()
	}

	#[rstest]
	#[case("true", Some(true))]
	#[case("1", Some(true))]
	#[case("On", Some(true))]
	#[case("no", Some(false))]
	#[case("0", Some(false))]
	#[case("", None)]
	fn test_parse_bool(#[case] input: &str, #[case] expected: Option<bool>) {
		assert_eq!(parse_bool(input), expected);
	}

	#[rstest]
	fn test_parse_list_drops_empty_entries() {
		assert_eq!(parse_list("js, vue,,tsx ,"), vec!["js", "vue", "tsx"]);
		assert!(parse_list("").is_empty());
	}

	#[rstest]
	fn test_apply_overrides() {
		let mut config = InertiaConfig::default();
		let lookup = lookup_from(&[
			("INERTIA_SSR_ENABLED", "yes"),
			("INERTIA_SSR_URL", "http://ssr.internal:9000"),
			("INERTIA_SSR_BUNDLE", "build/ssr.mjs"),
			("INERTIA_PAGE_PATHS", "frontend/pages,shared/pages"),
			("INERTIA_HISTORY_ENCRYPT", "1"),
			("INERTIA_TRANSFORM_PAGINATION", "off"),
		]);

		apply_overrides(&mut config, lookup).unwrap();

		assert!(config.ssr.enabled);
		assert_eq!(config.ssr.url, "http://ssr.internal:9000");
		assert_eq!(config.ssr.bundle, Some(PathBuf::from("build/ssr.mjs")));
		assert_eq!(
			config.pages.page_paths,
			vec![PathBuf::from("frontend/pages"), PathBuf::from("shared/pages")]
		);
		assert!(config.history.encrypt);
		assert!(!config.transform_pagination);
		// untouched
		assert!(config.ssr.ensure_bundle_exists);
		assert!(!config.pages.ensure_pages_exist);
	}

	#[rstest]
	fn test_apply_overrides_rejects_bad_boolean() {
		let mut config = InertiaConfig::default();
		let lookup = lookup_from(&[("INERTIA_SSR_ENABLED", "sometimes")]);

		let error = apply_overrides(&mut config, lookup).unwrap_err();

		assert!(
			matches!(error, ConfigError::InvalidValue { ref key, .. } if key == "INERTIA_SSR_ENABLED")
		);
	}

	#[rstest]
	fn test_apply_overrides_rejects_bad_timeout() {
		let mut config = InertiaConfig::default();
		let lookup = lookup_from(&[("INERTIA_SSR_TIMEOUT_SECS", "soon")]);

		assert!(apply_overrides(&mut config, lookup).is_err());
	}
}
