//! The page object: the JSON document describing one navigation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::resolver::ResolvedProps;

/// Canonical description of the page a client mounts.
///
/// Directive fields are omitted from the JSON when empty.
///
/// # Examples
///
/// ```
/// use reinhardt_inertia::PageObject;
/// use serde_json::json;
///
/// let page = PageObject::new("Users/Index", "/users", "abc123");
///
/// assert_eq!(
///     serde_json::to_value(&page).unwrap(),
///     json!({
///         "component": "Users/Index",
///         "props": {},
///         "url": "/users",
///         "version": "abc123",
///         "clearHistory": false,
///         "encryptHistory": false,
///     })
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageObject {
	pub component: String,
	pub props: Map<String, Value>,
	pub url: String,
	pub version: String,
	pub clear_history: bool,
	pub encrypt_history: bool,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub merge_props: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub deep_merge_props: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub match_props_on: Vec<String>,
	#[serde(default, skip_serializing_if = "IndexMap::is_empty")]
	pub deferred_props: IndexMap<String, Vec<String>>,
	/// Seconds-to-live per cache directive.
	#[serde(default, skip_serializing_if = "IndexMap::is_empty")]
	pub cache: IndexMap<String, i64>,
}

impl PageObject {
	pub fn new(component: impl Into<String>, url: impl Into<String>, version: impl Into<String>) -> Self {
		Self {
			component: component.into(),
			url: url.into(),
			version: version.into(),
			..Self::default()
		}
	}

	/// Moves resolved props and their directives into the page.
	pub fn with_resolved(mut self, resolved: ResolvedProps) -> Self {
		self.props = resolved.props;
		self.merge_props = resolved.merge_props;
		self.deep_merge_props = resolved.deep_merge_props;
		self.match_props_on = resolved.match_props_on;
		self.deferred_props = resolved.deferred_props;
		self
	}

	pub fn with_history(mut self, clear: bool, encrypt: bool) -> Self {
		self.clear_history = clear;
		self.encrypt_history = encrypt;
		self
	}

	pub fn with_cache(mut self, cache: &[CacheFor]) -> Self {
		self.cache = cache_directives(cache);
		self
	}
}

/// A cache lifetime, normalized to whole seconds.
///
/// # Examples
///
/// ```
/// use reinhardt_inertia::CacheFor;
/// use std::time::Duration;
///
/// assert_eq!(CacheFor::from(30).seconds(), 30);
/// assert_eq!(CacheFor::from(Duration::from_secs(90)).seconds(), 90);
/// assert_eq!(CacheFor::from(chrono::TimeDelta::minutes(2)).seconds(), 120);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheFor(i64);

impl CacheFor {
	pub fn seconds(self) -> i64 {
		self.0
	}
}

impl From<i64> for CacheFor {
	fn from(seconds: i64) -> Self {
		Self(seconds)
	}
}

impl From<i32> for CacheFor {
	fn from(seconds: i32) -> Self {
		Self(i64::from(seconds))
	}
}

impl From<u32> for CacheFor {
	fn from(seconds: u32) -> Self {
		Self(i64::from(seconds))
	}
}

impl From<Duration> for CacheFor {
	fn from(duration: Duration) -> Self {
		Self(i64::try_from(duration.as_secs()).unwrap_or(i64::MAX))
	}
}

impl From<chrono::TimeDelta> for CacheFor {
	fn from(delta: chrono::TimeDelta) -> Self {
		Self(delta.num_seconds())
	}
}

/// Cache directives keyed by position, in the order given.
pub fn cache_directives(cache: &[CacheFor]) -> IndexMap<String, i64> {
	cache
		.iter()
		.enumerate()
		.map(|(index, lifetime)| (index.to_string(), lifetime.seconds()))
		.collect()
}
