//! HTML rendering for first visits.
//!
//! A full page load receives an HTML document. The document embeds the page
//! object in the `data-page` attribute of a mount element, or carries the
//! server-rendered markup in its place when SSR produced some.

use reinhardt_inertia_ssr::SsrResponse;
use serde_json::{Map, Value};
use std::borrow::Cow;

use crate::error::Result;
use crate::page::PageObject;

/// Root view name used until a handler or the middleware picks another.
pub const DEFAULT_ROOT_VIEW: &str = "inertia";

/// `id` of the mount element rendered by [`DefaultRootView`].
pub const DEFAULT_ROOT_ID: &str = "app";

/// Everything a root view needs to render the document.
#[derive(Debug, Clone)]
pub struct InertiaView {
	/// Name of the root view, for renderers serving several layouts.
	pub root_view: String,
	pub page: PageObject,
	/// Extra template data that is not sent to the client as props.
	pub view_data: Map<String, Value>,
	pub ssr_head: Option<String>,
	pub ssr_body: Option<String>,
}

impl InertiaView {
	pub fn new(root_view: impl Into<String>, page: PageObject) -> Self {
		Self {
			root_view: root_view.into(),
			page,
			view_data: Map::new(),
			ssr_head: None,
			ssr_body: None,
		}
	}

	pub fn with_view_data(mut self, view_data: Map<String, Value>) -> Self {
		self.view_data = view_data;
		self
	}

	pub fn with_ssr(mut self, ssr: Option<SsrResponse>) -> Self {
		if let Some(ssr) = ssr {
			self.ssr_head = Some(ssr.head);
			self.ssr_body = Some(ssr.body);
		}
		self
	}

	/// The mount element, or the SSR body when there is one.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_inertia::{InertiaView, PageObject};
	///
	/// let view = InertiaView::new("inertia", PageObject::new("Home", "/", ""));
	///
	/// let html = view.inertia("app").unwrap();
	/// assert!(html.starts_with(r#"<div id="app" data-page="{&quot;component&quot;:&quot;Home&quot;"#));
	/// assert!(html.ends_with("\"></div>"));
	/// ```
	pub fn inertia(&self, id: &str) -> Result<String> {
		if let Some(body) = &self.ssr_body {
			return Ok(body.clone());
		}

		let page = serde_json::to_string(&self.page)?;
		Ok(format!(
			r#"<div id="{}" data-page="{}"></div>"#,
			escape_html(id),
			escape_html(&page)
		))
	}

	/// SSR head markup, empty without SSR.
	pub fn inertia_head(&self) -> &str {
		self.ssr_head.as_deref().unwrap_or_default()
	}
}

/// Renders the HTML document for a first visit.
pub trait RootView: Send + Sync {
	fn render(&self, view: &InertiaView) -> Result<String>;
}

impl<F> RootView for F
where
	F: Fn(&InertiaView) -> Result<String> + Send + Sync,
{
	fn render(&self, view: &InertiaView) -> Result<String> {
		self(view)
	}
}

/// Minimal HTML5 document with the SSR head in `<head>` and the mount
/// element in `<body>`.
///
/// A string `title` in the view data becomes the document title.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRootView;

impl RootView for DefaultRootView {
	fn render(&self, view: &InertiaView) -> Result<String> {
		let title = view
			.view_data
			.get("title")
			.and_then(Value::as_str)
			.map(|title| format!("\n<title>{}</title>", escape_html(title)))
			.unwrap_or_default();

		Ok(format!(
			"<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">{title}\n{head}\n</head>\n<body>\n{body}\n</body>\n</html>\n",
			head = view.inertia_head(),
			body = view.inertia(DEFAULT_ROOT_ID)?,
		))
	}
}

/// Escapes `& < > " '` for use in HTML text and quoted attributes.
///
/// # Examples
///
/// ```
/// use reinhardt_inertia::view::escape_html;
///
/// assert_eq!(escape_html(r#"<a href="x">Tom's</a>"#), "&lt;a href=&quot;x&quot;&gt;Tom&#039;s&lt;/a&gt;");
/// assert_eq!(escape_html("plain"), "plain");
/// ```
pub fn escape_html(s: &str) -> Cow<'_, str> {
	if !s.contains(['&', '<', '>', '"', '\'']) {
		return Cow::Borrowed(s);
	}

	let mut escaped = String::with_capacity(s.len() + 16);
	for c in s.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#039;"),
			_ => escaped.push(c),
		}
	}
	Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	fn page() -> PageObject {
		let mut page = PageObject::new("User/Edit", "/user/123", "123");
		page.props.insert("name".into(), json!("O'Brien & <Co>"));
		page
	}

	#[rstest]
	fn test_data_page_round_trips_through_attribute_escaping() {
		let view = InertiaView::new(DEFAULT_ROOT_VIEW, page());

		let html = view.inertia("app").unwrap();

		let attribute = html
			.strip_prefix(r#"<div id="app" data-page=""#)
			.and_then(|rest| rest.strip_suffix(r#""></div>"#))
			.unwrap();
		assert!(!attribute.contains(['"', '\'', '<', '>']));
		let decoded = attribute
			.replace("&quot;", "\"")
			.replace("&#039;", "'")
			.replace("&lt;", "<")
			.replace("&gt;", ">")
			.replace("&amp;", "&");
		let parsed: PageObject = serde_json::from_str(&decoded).unwrap();
		assert_eq!(parsed, page());
	}

	#[rstest]
	fn test_ssr_output_replaces_mount_element() {
		let view = InertiaView::new(DEFAULT_ROOT_VIEW, page()).with_ssr(Some(SsrResponse::new(
			"<title>Edit</title>",
			"<div id=\"app\">rendered</div>",
		)));

		assert_eq!(view.inertia("app").unwrap(), "<div id=\"app\">rendered</div>");
		assert_eq!(view.inertia_head(), "<title>Edit</title>");
	}

	#[rstest]
	fn test_head_is_empty_without_ssr() {
		let view = InertiaView::new(DEFAULT_ROOT_VIEW, page()).with_ssr(None);

		assert_eq!(view.inertia_head(), "");
	}

	#[rstest]
	fn test_default_root_view_document() {
		let mut data = Map::new();
		data.insert("title".into(), json!("Users <admin>"));
		let view = InertiaView::new(DEFAULT_ROOT_VIEW, page()).with_view_data(data);

		let html = DefaultRootView.render(&view).unwrap();

		assert!(html.starts_with("<!DOCTYPE html>"));
		assert!(html.contains("<title>Users &lt;admin&gt;</title>"));
		assert!(html.contains(r#"<div id="app" data-page="{&quot;component&quot;:&quot;User/Edit&quot;"#));
	}

	#[rstest]
	fn test_closures_are_root_views() {
		let renderer = |view: &InertiaView| -> Result<String> { Ok(format!("<main>{}</main>", view.inertia("root")?)) };
		let view = InertiaView::new("custom", page());

		let html = renderer.render(&view).unwrap();

		assert!(html.starts_with(r#"<main><div id="root" data-page="#));
	}
}
