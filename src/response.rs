//! Pending Inertia responses and protocol-aware redirects.

use hyper::Method;
use reinhardt_inertia_http::{Request, Response};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::factory::{Inertia, UrlResolver};
use crate::header;
use crate::page::{CacheFor, PageObject};
use crate::props::{PropMap, PropValue};
use crate::resolver::PropResolver;
use crate::version::is_stale;
use crate::view::InertiaView;

/// Session key holding a pending "clear history" request.
pub const CLEAR_HISTORY_SESSION_KEY: &str = "inertia.clear_history";

/// A rendered component whose props have not been resolved yet.
///
/// Nothing is evaluated until [`InertiaResponse::materialize`] runs, so the
/// response can still be adjusted after [`crate::ResponseFactory::render`].
pub struct InertiaResponse {
	component: String,
	props: PropMap,
	view_data: Map<String, Value>,
	root_view: String,
	version: String,
	clear_history: bool,
	encrypt_history: bool,
	cache: Vec<CacheFor>,
	url_resolver: Option<Arc<UrlResolver>>,
	app: Inertia,
}

/// Page settings captured from the factory at render time.
pub(crate) struct PageSettings {
	pub root_view: String,
	pub version: String,
	pub clear_history: bool,
	pub encrypt_history: bool,
	pub url_resolver: Option<Arc<UrlResolver>>,
}

impl InertiaResponse {
	pub(crate) fn new(app: Inertia, component: String, props: PropMap, settings: PageSettings) -> Self {
		Self {
			component,
			props,
			view_data: Map::new(),
			root_view: settings.root_view,
			version: settings.version,
			clear_history: settings.clear_history,
			encrypt_history: settings.encrypt_history,
			cache: Vec::new(),
			url_resolver: settings.url_resolver,
			app,
		}
	}

	/// Adds or replaces one prop. The key is used as given; a dotted key is
	/// unpacked when the props are resolved.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
		self.props.insert(key, value);
		self
	}

	/// Merges `props` over the current props.
	pub fn with_props(mut self, props: impl Into<PropMap>) -> Self {
		self.props.extend(props.into());
		self
	}

	/// Adds data for the root view only. It never reaches the client.
	pub fn with_view_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.view_data.insert(key.into(), value.into());
		self
	}

	pub fn root_view(mut self, root_view: impl Into<String>) -> Self {
		self.root_view = root_view.into();
		self
	}

	/// Sets the cache lifetimes reported in the page's `cache` directive.
	///
	/// # Examples
	///
	/// ```no_run
	/// # use reinhardt_inertia::ResponseFactory;
	/// # use reinhardt_inertia::props::PropMap;
	/// # use std::time::Duration;
	/// # fn demo(inertia: &ResponseFactory) -> reinhardt_inertia::Result<()> {
	/// let response = inertia
	///     .render("Dashboard", PropMap::new().with("stats", 1))?
	///     .cache([Duration::from_secs(30), Duration::from_secs(300)]);
	/// # Ok(())
	/// # }
	/// ```
	pub fn cache<I, C>(mut self, lifetimes: I) -> Self
	where
		I: IntoIterator<Item = C>,
		C: Into<CacheFor>,
	{
		self.cache = lifetimes.into_iter().map(Into::into).collect();
		self
	}

	pub fn component(&self) -> &str {
		&self.component
	}

	pub fn props(&self) -> &PropMap {
		&self.props
	}

	/// Resolves the props and assembles the page object.
	pub async fn page(&self, request: &Request) -> Result<PageObject> {
		let resolved = PropResolver::new(request, &self.component)
			.transform_pagination(self.app.config().transform_pagination)
			.resolve(self.props.clone())
			.await?;

		Ok(PageObject::new(&self.component, self.url(request), &self.version)
			.with_resolved(resolved)
			.with_history(self.resolve_clear_history(request), self.encrypt_history)
			.with_cache(&self.cache))
	}

	/// Produces the HTTP response.
	///
	/// Inertia requests get the page object as JSON, or a `409` asking for a
	/// full reload when a `GET` carries a stale asset version. Other requests
	/// get the HTML document, server-rendered when SSR is enabled and
	/// available.
	pub async fn materialize(self, request: &Request) -> Result<Response> {
		let is_inertia = request.has_header(header::INERTIA);

		if is_inertia
			&& request.method == Method::GET
			&& is_stale(request.header(header::VERSION), &self.version)
		{
			debug!(
				component = %self.component,
				current = %self.version,
				"Client asset version is stale, requesting a full reload"
			);
			return Ok(Response::conflict().with_header(header::LOCATION, &request.request_uri()));
		}

		let page = self.page(request).await?;

		if is_inertia {
			return Ok(Response::ok()
				.with_header(header::INERTIA, "true")
				.with_json(&page)?);
		}

		let ssr = if self.app.config().ssr.enabled {
			self.app.gateway().dispatch(&serde_json::to_value(&page)?).await
		} else {
			None
		};

		let view = InertiaView::new(self.root_view, page)
			.with_view_data(self.view_data)
			.with_ssr(ssr);
		let html = self.app.root_view_renderer().render(&view)?;

		Ok(Response::ok().with_html(html))
	}

	fn url(&self, request: &Request) -> String {
		if let Some(resolver) = &self.url_resolver {
			return resolver(request);
		}

		let uri = request.request_uri();
		match request.header(header::FORWARDED_PREFIX).filter(|prefix| !prefix.is_empty()) {
			Some(prefix) => format!("{}{}", prefix.trim_end_matches('/'), uri),
			None => uri,
		}
	}

	fn resolve_clear_history(&self, request: &Request) -> bool {
		request
			.session()
			.and_then(|session| session.get(CLEAR_HISTORY_SESSION_KEY))
			.and_then(|value| value.as_bool())
			.unwrap_or(self.clear_history)
	}
}

impl fmt::Debug for InertiaResponse {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InertiaResponse")
			.field("component", &self.component)
			.field("props", &self.props)
			.field("root_view", &self.root_view)
			.field("version", &self.version)
			.finish_non_exhaustive()
	}
}

/// Redirects to `url`, possibly outside the Inertia application.
///
/// Inertia requests get `409` with `x-inertia-location` so the client does a
/// full visit; other requests get a plain `302`.
///
/// # Examples
///
/// ```
/// use reinhardt_inertia::location;
/// use reinhardt_inertia_http::{Request, StatusCode};
///
/// let request = Request::builder().header("x-inertia", "true").build().unwrap();
/// let response = location(&request, "https://example.com/billing");
///
/// assert_eq!(response.status, StatusCode::CONFLICT);
/// assert_eq!(response.header("x-inertia-location"), Some("https://example.com/billing"));
/// assert!(response.body.is_empty());
/// ```
pub fn location(request: &Request, url: &str) -> Response {
	if request.has_header(header::INERTIA) {
		Response::conflict().with_header(header::LOCATION, url)
	} else {
		Response::temporary_redirect(url)
	}
}

/// Like [`location`], taking the target from an existing redirect. Non-Inertia
/// requests get the redirect back unchanged.
pub fn location_from_redirect(request: &Request, redirect: Response) -> Response {
	if !request.has_header(header::INERTIA) {
		return redirect;
	}

	match redirect.header("location").map(str::to_string) {
		Some(url) => Response::conflict().with_header(header::LOCATION, &url),
		None => redirect,
	}
}
