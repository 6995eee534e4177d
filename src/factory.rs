//! Application-wide Inertia setup and the request-scoped response factory.

use parking_lot::Mutex;
use reinhardt_inertia_conf::InertiaConfig;
use reinhardt_inertia_http::{Request, Response, SessionHandle};
use reinhardt_inertia_ssr::{Gateway, NoopGateway};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::error::{Error, Result};
use crate::pages::ComponentFinder;
use crate::props::{self, Prop, PropMap, PropValue, ProvidesProps, get_path, set_path};
use crate::response::{CLEAR_HISTORY_SESSION_KEY, InertiaResponse, PageSettings, location};
use crate::version::AssetVersion;
use crate::view::{DEFAULT_ROOT_VIEW, DefaultRootView, RootView};

/// Computes the page URL from the request, replacing the default
/// request-URI based one.
pub type UrlResolver = dyn Fn(&Request) -> String + Send + Sync;

/// Application-wide Inertia services: configuration, SSR gateway, root view
/// renderer and the page component finder.
///
/// Cheap to clone. Built once at startup and handed to
/// [`crate::InertiaMiddleware`], which derives a fresh [`ResponseFactory`]
/// for every request.
///
/// # Examples
///
/// ```
/// use reinhardt_inertia::Inertia;
/// use reinhardt_inertia_conf::InertiaConfig;
///
/// let inertia = Inertia::new(InertiaConfig::default().encrypt_history(true));
/// assert!(inertia.config().history.encrypt);
/// ```
#[derive(Clone)]
pub struct Inertia {
	config: Arc<InertiaConfig>,
	gateway: Arc<dyn Gateway>,
	root_view: Arc<dyn RootView>,
	finder: Arc<ComponentFinder>,
}

impl Inertia {
	/// Uses [`NoopGateway`] and [`DefaultRootView`].
	pub fn new(config: InertiaConfig) -> Self {
		let finder = ComponentFinder::new(config.pages.clone());
		Self {
			config: Arc::new(config),
			gateway: Arc::new(NoopGateway),
			root_view: Arc::new(DefaultRootView),
			finder: Arc::new(finder),
		}
	}

	pub fn with_gateway(mut self, gateway: Arc<dyn Gateway>) -> Self {
		self.gateway = gateway;
		self
	}

	/// Dispatches SSR over HTTP to the configured server, looking for the
	/// bundle under `root`.
	#[cfg(feature = "ssr")]
	pub fn with_http_gateway(
		self,
		root: impl Into<std::path::PathBuf>,
	) -> std::result::Result<Self, reinhardt_inertia_ssr::SsrDispatchError> {
		let gateway = reinhardt_inertia_ssr::HttpGateway::new(self.config.ssr.clone(), root)?;
		Ok(self.with_gateway(Arc::new(gateway)))
	}

	pub fn with_root_view_renderer(mut self, renderer: Arc<dyn RootView>) -> Self {
		self.root_view = renderer;
		self
	}

	pub fn config(&self) -> &InertiaConfig {
		&self.config
	}

	pub fn gateway(&self) -> &dyn Gateway {
		self.gateway.as_ref()
	}

	pub fn root_view_renderer(&self) -> &dyn RootView {
		self.root_view.as_ref()
	}

	pub fn component_finder(&self) -> &ComponentFinder {
		&self.finder
	}

	/// A fresh factory with no shared props, bound to the request's session.
	pub fn factory_for(&self, request: &Request) -> ResponseFactory {
		ResponseFactory::new(self.clone(), request.session())
	}
}

impl fmt::Debug for Inertia {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Inertia")
			.field("config", &self.config)
			.finish_non_exhaustive()
	}
}

struct SharedState {
	props: PropMap,
	version: AssetVersion,
	root_view: String,
	url_resolver: Option<Arc<UrlResolver>>,
	clear_history: bool,
	encrypt_history: Option<bool>,
}

impl Default for SharedState {
	fn default() -> Self {
		Self {
			props: PropMap::new(),
			version: AssetVersion::None,
			root_view: DEFAULT_ROOT_VIEW.to_string(),
			url_resolver: None,
			clear_history: false,
			encrypt_history: None,
		}
	}
}

/// Request-scoped Inertia state: shared props, asset version, root view,
/// URL resolver and history flags.
///
/// Clones share the same state, so middleware and handlers of one request
/// see each other's changes. Separate requests never do.
///
/// # Examples
///
/// ```
/// use reinhardt_inertia::{Inertia, ResponseFactory};
/// use reinhardt_inertia::props::PropMap;
/// use reinhardt_inertia_conf::InertiaConfig;
/// use reinhardt_inertia_http::Request;
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let inertia = Inertia::new(InertiaConfig::default());
/// let request = Request::builder().uri("/users").header("x-inertia", "true").build().unwrap();
///
/// let factory = inertia.factory_for(&request);
/// factory.share("app.name", "Reinhardt");
/// factory.version("v1");
///
/// let response = factory
///     .render("Users/Index", PropMap::new().with("users", json!([])))
///     .unwrap()
///     .materialize(&request)
///     .await
///     .unwrap();
///
/// let page: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
/// assert_eq!(page["props"]["app"]["name"], json!("Reinhardt"));
/// assert_eq!(page["version"], json!("v1"));
/// # });
/// ```
#[derive(Clone)]
pub struct ResponseFactory {
	app: Inertia,
	session: Option<SessionHandle>,
	state: Arc<Mutex<SharedState>>,
}

impl ResponseFactory {
	pub fn new(app: Inertia, session: Option<SessionHandle>) -> Self {
		Self {
			app,
			session,
			state: Arc::new(Mutex::new(SharedState::default())),
		}
	}

	/// The factory installed by [`crate::InertiaMiddleware`].
	///
	/// # Errors
	///
	/// Returns [`Error::MissingContext`] when the middleware did not run.
	pub fn from_request(request: &Request) -> Result<Self> {
		request.extension::<ResponseFactory>().cloned().ok_or_else(|| {
			warn!(path = request.path(), "Inertia response factory requested without InertiaMiddleware");
			Error::MissingContext
		})
	}

	pub fn app(&self) -> &Inertia {
		&self.app
	}

	/// Shares a prop with every response of this request. A dotted key is
	/// stored as a nested path.
	pub fn share(&self, key: &str, value: impl Into<PropValue>) {
		set_path(&mut self.state.lock().props, key, value.into());
	}

	/// Merges `props` over the shared props.
	pub fn share_many(&self, props: impl Into<PropMap>) {
		self.state.lock().props.extend(props.into());
	}

	/// Shares every prop `provider` contributes.
	pub fn share_provider(&self, provider: impl ProvidesProps + 'static) {
		self.state.lock().props.provide(Arc::new(provider));
	}

	/// Shared value at a dotted `key`.
	pub fn get_shared(&self, key: &str) -> Option<PropValue> {
		get_path(&self.state.lock().props, key)
	}

	pub fn shared(&self) -> PropMap {
		self.state.lock().props.clone()
	}

	pub fn flush_shared(&self) {
		self.state.lock().props = PropMap::new();
	}

	pub fn version(&self, version: impl Into<AssetVersion>) {
		self.state.lock().version = version.into();
	}

	pub fn get_version(&self) -> String {
		let version = self.state.lock().version.clone();
		version.resolve()
	}

	pub fn set_root_view(&self, name: impl Into<String>) {
		self.state.lock().root_view = name.into();
	}

	pub fn resolve_url_using(&self, resolver: impl Fn(&Request) -> String + Send + Sync + 'static) {
		self.state.lock().url_resolver = Some(Arc::new(resolver));
	}

	pub(crate) fn set_url_resolver(&self, resolver: Option<Arc<UrlResolver>>) {
		self.state.lock().url_resolver = resolver;
	}

	/// Asks the client to clear its history on the next page. The request
	/// stays flagged in the session until the session entry is removed.
	pub fn clear_history(&self) {
		match &self.session {
			Some(session) => session.put(CLEAR_HISTORY_SESSION_KEY, Value::Bool(true)),
			None => warn!("Clearing history without a session only affects this request"),
		}
		self.state.lock().clear_history = true;
	}

	/// Overrides the configured history encryption for this request.
	pub fn encrypt_history(&self, encrypt: bool) {
		self.state.lock().encrypt_history = Some(encrypt);
	}

	pub fn always(&self, value: impl Into<PropValue>) -> Prop {
		props::always(value)
	}

	pub fn optional(&self, value: impl Into<PropValue>) -> Prop {
		props::optional(value)
	}

	/// Same as [`optional`](Self::optional). For a plain callable evaluated
	/// on every load, use [`props::lazy`](crate::props::lazy).
	#[deprecated(note = "use `optional` instead")]
	pub fn lazy(&self, value: impl Into<PropValue>) -> Prop {
		props::optional(value)
	}

	pub fn defer(&self, value: impl Into<PropValue>) -> Prop {
		props::defer(value)
	}

	pub fn defer_in(&self, value: impl Into<PropValue>, group: impl Into<String>) -> Prop {
		props::defer_in(value, group)
	}

	pub fn merge(&self, value: impl Into<PropValue>) -> Prop {
		props::merge(value)
	}

	pub fn deep_merge(&self, value: impl Into<PropValue>) -> Prop {
		props::deep_merge(value)
	}

	/// Renders `component` with the shared props overlaid by `props`.
	///
	/// # Errors
	///
	/// Returns [`Error::ComponentNotFound`] when page checking is enabled and
	/// no file matches `component`.
	pub fn render(&self, component: &str, props: impl Into<PropMap>) -> Result<InertiaResponse> {
		if self.app.config().pages.ensure_pages_exist {
			self.app.component_finder().ensure_exists(component)?;
		}

		let version = self.get_version();
		let state = self.state.lock();
		let mut combined = state.props.clone();
		combined.extend(props.into());

		let settings = PageSettings {
			root_view: state.root_view.clone(),
			version,
			clear_history: state.clear_history,
			encrypt_history: state.encrypt_history.unwrap_or(self.app.config().history.encrypt),
			url_resolver: state.url_resolver.clone(),
		};

		Ok(InertiaResponse::new(self.app.clone(), component.to_string(), combined, settings))
	}

	/// See [`crate::location`].
	pub fn location(&self, request: &Request, url: &str) -> Response {
		location(request, url)
	}
}

impl fmt::Debug for ResponseFactory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.lock();
		f.debug_struct("ResponseFactory")
			.field("shared", &state.props)
			.field("version", &state.version)
			.field("root_view", &state.root_view)
			.field("clear_history", &state.clear_history)
			.field("encrypt_history", &state.encrypt_history)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use reinhardt_inertia_conf::PageConfig;
	use reinhardt_inertia_http::{MemorySession, Session};
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn inertia() -> Inertia {
		Inertia::new(InertiaConfig::default())
	}

	fn request() -> Request {
		Request::builder().uri("/").build().unwrap()
	}

	#[rstest]
	fn test_share_dotted_key_nests(inertia: Inertia) {
		let factory = inertia.factory_for(&request());

		factory.share("auth.user", json!({"name": "Ada"}));
		factory.share("auth.team", "core");

		assert!(matches!(factory.get_shared("auth.user.name"), Some(PropValue::Json(v)) if v == json!("Ada")));
		assert!(matches!(factory.get_shared("auth.team"), Some(PropValue::Json(v)) if v == json!("core")));
		assert_eq!(factory.shared().len(), 1);
	}

	#[rstest]
	fn test_flush_shared(inertia: Inertia) {
		let factory = inertia.factory_for(&request());
		factory.share_many(PropMap::new().with("a", 1).with("b", 2));

		factory.flush_shared();

		assert!(factory.shared().is_empty());
	}

	#[rstest]
	fn test_factories_do_not_share_state(inertia: Inertia) {
		let first = inertia.factory_for(&request());
		let second = inertia.factory_for(&request());

		first.share("user", "ada");
		first.version("v1");

		assert!(second.get_shared("user").is_none());
		assert_eq!(second.get_version(), "");
	}

	#[rstest]
	fn test_clones_share_state(inertia: Inertia) {
		let factory = inertia.factory_for(&request());
		let clone = factory.clone();

		clone.share("user", "ada");

		assert!(factory.get_shared("user").is_some());
	}

	#[rstest]
	fn test_version_sources(inertia: Inertia) {
		let factory = inertia.factory_for(&request());

		factory.version(AssetVersion::computed(|| "computed".to_string()));
		assert_eq!(factory.get_version(), "computed");

		factory.version(7);
		assert_eq!(factory.get_version(), "7");

		factory.version(None::<String>);
		assert_eq!(factory.get_version(), "");
	}

	#[rstest]
	fn test_clear_history_writes_session(inertia: Inertia) {
		let session = Arc::new(MemorySession::new());
		let request = Request::builder()
			.session(SessionHandle::new(session.clone()))
			.build()
			.unwrap();
		let factory = inertia.factory_for(&request);

		factory.clear_history();

		assert_eq!(session.get(CLEAR_HISTORY_SESSION_KEY), Some(json!(true)));
	}

	#[rstest]
	fn test_render_checks_pages_when_enabled() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("Home.vue"), "").unwrap();
		let inertia = Inertia::new(InertiaConfig::default().with_pages(PageConfig::checked([dir.path()])));
		let factory = inertia.factory_for(&request());

		assert!(factory.render("Home", PropMap::new()).is_ok());
		assert!(matches!(
			factory.render("Missing", PropMap::new()),
			Err(Error::ComponentNotFound { .. })
		));
	}

	#[rstest]
	fn test_render_skips_page_check_by_default(inertia: Inertia) {
		let factory = inertia.factory_for(&request());

		assert!(factory.render("Anything/At/All", PropMap::new()).is_ok());
	}

	#[rstest]
	fn test_from_request_requires_middleware() {
		let error = ResponseFactory::from_request(&request()).unwrap_err();

		assert!(matches!(error, Error::MissingContext));
	}

	#[rstest]
	fn test_from_request_returns_installed_factory(inertia: Inertia) {
		let mut request = request();
		let factory = inertia.factory_for(&request);
		factory.share("installed", true);
		request.insert_extension(factory);

		let found = ResponseFactory::from_request(&request).unwrap();

		assert!(found.get_shared("installed").is_some());
	}
}
