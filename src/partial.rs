//! Partial-reload request parsing.

use indexmap::IndexSet;
use reinhardt_inertia_http::Request;

use crate::header;

/// Filters a partial reload applies to the rendered component's props.
///
/// A request is partial only when it targets the component actually being
/// rendered. Otherwise it is treated as a full load, whatever other filters
/// it carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialReload {
	pub is_partial: bool,
	/// Component named by the request, if any.
	pub component: Option<String>,
	pub only: IndexSet<String>,
	pub except: IndexSet<String>,
	/// Keys the client replaces instead of merging.
	pub reset: IndexSet<String>,
}

impl PartialReload {
	/// Builds filters from raw header values.
	///
	/// Missing or empty values parse to empty sets. Blank entries are
	/// dropped, so `"a,,b,"` yields `{a, b}`.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_inertia::PartialReload;
	///
	/// let partial = PartialReload::parse("Users/Index", Some("Users/Index"), Some("users, filters,"), None, None);
	///
	/// assert!(partial.is_partial);
	/// assert_eq!(partial.only.iter().collect::<Vec<_>>(), vec!["users", "filters"]);
	/// assert!(partial.except.is_empty());
	/// ```
	pub fn parse(
		rendered: &str,
		component: Option<&str>,
		only: Option<&str>,
		except: Option<&str>,
		reset: Option<&str>,
	) -> Self {
		Self {
			is_partial: component == Some(rendered),
			component: component.map(str::to_string),
			only: split_keys(only),
			except: split_keys(except),
			reset: split_keys(reset),
		}
	}

	/// Reads the partial-reload headers of `request` for `rendered`.
	pub fn from_request(request: &Request, rendered: &str) -> Self {
		Self::parse(
			rendered,
			request.header(header::PARTIAL_COMPONENT),
			request.header(header::PARTIAL_ONLY),
			request.header(header::PARTIAL_EXCEPT),
			request.header(header::RESET),
		)
	}

	/// Whether a merge-enabled prop under `key` is reported to the client.
	///
	/// The `only` and `except` lists apply here even on full loads.
	pub fn reports_merge(&self, key: &str) -> bool {
		!self.reset.contains(key)
			&& (self.only.is_empty() || self.only.contains(key))
			&& !self.except.contains(key)
	}
}

/// Splits a comma-separated key list, trimming entries and dropping blanks.
pub fn split_keys(value: Option<&str>) -> IndexSet<String> {
	value
		.unwrap_or_default()
		.split(',')
		.map(str::trim)
		.filter(|key| !key.is_empty())
		.map(str::to_string)
		.collect()
}
