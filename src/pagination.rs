//! Paginated datasets and the link/meta shape the client paginators expect.

use reinhardt_inertia_http::Request;
use serde::Serialize;
use serde_json::{Value, json};

/// An already-paginated slice of a larger dataset.
///
/// Produced by the application's data layer; the renderer only reads it.
///
/// # Examples
///
/// ```
/// use reinhardt_inertia::PaginatedData;
/// use serde_json::json;
///
/// let page = PaginatedData::new(vec![json!({"id": 11}), json!({"id": 12})], 2, 10, 42);
///
/// assert_eq!(page.total_pages, 5);
/// assert_eq!(page.offset, 10);
/// assert_eq!(page.previous_page, Some(1));
/// assert_eq!(page.next_page, Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginatedData {
	pub data: Vec<Value>,
	pub current_page: u64,
	pub total_pages: u64,
	pub total_items: u64,
	pub items_per_page: u64,
	pub offset: u64,
	pub count: u64,
	pub previous_page: Option<u64>,
	pub next_page: Option<u64>,
	pub page_range: Vec<u64>,
}

impl PaginatedData {
	/// Number of page links in [`PaginatedData::page_range`] unless
	/// overridden with [`PaginatedData::with_max_links`].
	pub const DEFAULT_MAX_LINKS: u64 = 10;

	/// Builds the page metadata for `data`, the items of `current_page`.
	///
	/// `current_page` is clamped into `1..=total_pages`; an empty dataset has
	/// one page.
	pub fn new(data: Vec<Value>, current_page: u64, items_per_page: u64, total_items: u64) -> Self {
		let items_per_page = items_per_page.max(1);
		let total_pages = total_items.div_ceil(items_per_page).max(1);
		let current_page = current_page.clamp(1, total_pages);
		let count = data.len() as u64;

		Self {
			data,
			current_page,
			total_pages,
			total_items,
			items_per_page,
			offset: (current_page - 1) * items_per_page,
			count,
			previous_page: (current_page > 1).then(|| current_page - 1),
			next_page: (current_page < total_pages).then(|| current_page + 1),
			page_range: page_window(current_page, total_pages, Self::DEFAULT_MAX_LINKS),
		}
	}

	/// Serializes each item of a page.
	pub fn from_items<T: Serialize>(
		items: &[T],
		current_page: u64,
		items_per_page: u64,
		total_items: u64,
	) -> crate::Result<Self> {
		let data = items
			.iter()
			.map(serde_json::to_value)
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Self::new(data, current_page, items_per_page, total_items))
	}

	/// Recomputes the page window to hold at most `max_links` pages.
	pub fn with_max_links(mut self, max_links: u64) -> Self {
		self.page_range = page_window(self.current_page, self.total_pages, max_links.max(1));
		self
	}
}

fn page_window(current: u64, total: u64, max_links: u64) -> Vec<u64> {
	let start = current.saturating_sub(max_links / 2).max(1);
	let end = (start + max_links - 1).min(total);
	let start = (end + 1).saturating_sub(max_links).max(1);
	(start..=end).collect()
}

/// Converts [`PaginatedData`] into `{data, links, meta}` with page URLs built
/// from the current request.
pub struct PaginatorAdapter<'a> {
	paginated: &'a PaginatedData,
	request: &'a Request,
}

impl<'a> PaginatorAdapter<'a> {
	pub fn new(paginated: &'a PaginatedData, request: &'a Request) -> Self {
		Self { paginated, request }
	}

	/// # Examples
	///
	/// ```
	/// use reinhardt_inertia::{PaginatedData, PaginatorAdapter};
	/// use reinhardt_inertia_http::Request;
	/// use serde_json::json;
	///
	/// let request = Request::builder().uri("/users?sort=name&page=1").build().unwrap();
	/// let page = PaginatedData::new(vec![json!("ada")], 1, 1, 2);
	///
	/// let value = PaginatorAdapter::new(&page, &request).to_json();
	///
	/// assert_eq!(value["links"]["next"], json!("/users?sort=name&page=2"));
	/// assert_eq!(value["meta"]["to"], json!(1));
	/// ```
	pub fn to_json(&self) -> Value {
		let page = self.paginated;
		json!({
			"data": page.data,
			"links": {
				"first": self.url_for_page(1),
				"last": self.url_for_page(page.total_pages),
				"prev": page.previous_page.map(|p| self.url_for_page(p)),
				"next": page.next_page.map(|p| self.url_for_page(p)),
			},
			"meta": {
				"current_page": page.current_page,
				"from": page.offset + 1,
				"last_page": page.total_pages,
				"links": self.meta_links(),
				"path": self.request.path(),
				"per_page": page.items_per_page,
				"to": page.offset + page.count,
				"total": page.total_items,
			},
		})
	}

	fn meta_links(&self) -> Vec<Value> {
		let page = self.paginated;
		let mut links = Vec::with_capacity(page.page_range.len() + 2);

		links.push(json!({
			"url": page.previous_page.map(|p| self.url_for_page(p)),
			"label": "&laquo; Previous",
			"active": false,
		}));
		for &number in &page.page_range {
			links.push(json!({
				"url": self.url_for_page(number),
				"label": number.to_string(),
				"active": number == page.current_page,
			}));
		}
		links.push(json!({
			"url": page.next_page.map(|p| self.url_for_page(p)),
			"label": "Next &raquo;",
			"active": false,
		}));

		links
	}

	fn url_for_page(&self, number: u64) -> String {
		let mut query = self.request.query_pairs();
		match query.iter_mut().find(|(key, _)| key == "page") {
			Some((_, value)) => *value = number.to_string(),
			None => query.push(("page".to_string(), number.to_string())),
		}
		query.retain(|(key, _)| !key.is_empty());

		let encoded = serde_urlencoded::to_string(&query).unwrap_or_else(|_| format!("page={number}"));
		format!("{}?{}", self.request.path(), encoded)
	}
}
