//! Request middleware installing the Inertia factory and enforcing the
//! protocol's response rules.
//!
//! ```
//! use reinhardt_inertia::{Inertia, InertiaMiddleware, ResponseFactory};
//! use reinhardt_inertia::props::PropMap;
//! use reinhardt_inertia_conf::InertiaConfig;
//! use reinhardt_inertia_http::{Handler, MiddlewareChain, Request, Response, Result};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct Dashboard;
//!
//! #[async_trait]
//! impl Handler for Dashboard {
//!     async fn handle(&self, request: Request) -> Result<Response> {
//!         let inertia = ResponseFactory::from_request(&request)?;
//!         let response = inertia.render("Dashboard", PropMap::new().with("visits", 42))?;
//!         Ok(response.materialize(&request).await?)
//!     }
//! }
//!
//! let inertia = Inertia::new(InertiaConfig::default());
//! let app = MiddlewareChain::new(Arc::new(Dashboard))
//!     .with_middleware(Arc::new(InertiaMiddleware::new(inertia)));
//! ```

use async_trait::async_trait;
use hyper::header::{HeaderValue, VARY};
use hyper::{Method, StatusCode};
use reinhardt_inertia_http::{Handler, Middleware, Request, Response, Result};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::factory::{Inertia, ResponseFactory, UrlResolver};
use crate::header;
use crate::props::{PropMap, always};
use crate::version::{AssetVersion, is_stale};
use crate::view::DEFAULT_ROOT_VIEW;

/// Session key holding validation errors as `{field: [messages...]}`.
pub const VALIDATION_ERRORS_SESSION_KEY: &str = "_validation_errors";

/// Per-application hooks run by [`InertiaMiddleware`] before each request.
///
/// Every method has a default, so an empty implementation behaves like
/// [`DefaultSetup`].
///
/// # Examples
///
/// ```
/// use reinhardt_inertia::{AssetVersion, InertiaSetup, validation_errors};
/// use reinhardt_inertia::props::{PropMap, always};
/// use reinhardt_inertia_http::Request;
///
/// struct App;
///
/// impl InertiaSetup for App {
///     fn version(&self) -> AssetVersion {
///         AssetVersion::from(env!("CARGO_PKG_VERSION"))
///     }
///
///     fn share(&self, request: &Request) -> PropMap {
///         PropMap::new()
///             .with("errors", always(validation_errors(request)))
///             .with("app", "billing")
///     }
/// }
/// ```
pub trait InertiaSetup: Send + Sync {
	fn root_view(&self, _request: &Request) -> String {
		DEFAULT_ROOT_VIEW.to_string()
	}

	/// Defaults to [`AssetVersion::detect`] in the working directory.
	fn version(&self) -> AssetVersion {
		AssetVersion::detect(".")
	}

	/// Props shared with every response. Defaults to `errors`, always sent.
	fn share(&self, request: &Request) -> PropMap {
		PropMap::new().with("errors", always(validation_errors(request)))
	}

	fn url_resolver(&self) -> Option<Arc<UrlResolver>> {
		None
	}
}

/// The default hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSetup;

impl InertiaSetup for DefaultSetup {}

/// Installs a request-scoped [`ResponseFactory`] and applies the protocol
/// rules to responses.
///
/// - every response gets `Vary: x-inertia`,
/// - an Inertia `GET` with a stale asset version is answered with `409` and
///   `x-inertia-location` before the handler runs,
/// - a `302` answering an Inertia `POST`, `PUT` or `PATCH` becomes `303`.
pub struct InertiaMiddleware<S = DefaultSetup> {
	inertia: Inertia,
	setup: S,
}

impl InertiaMiddleware<DefaultSetup> {
	pub fn new(inertia: Inertia) -> Self {
		Self::with_setup(inertia, DefaultSetup)
	}
}

impl<S: InertiaSetup> InertiaMiddleware<S> {
	pub fn with_setup(inertia: Inertia, setup: S) -> Self {
		Self { inertia, setup }
	}

	fn prepare(&self, request: &Request) -> ResponseFactory {
		let factory = self.inertia.factory_for(request);
		factory.set_root_view(self.setup.root_view(request));
		factory.share_many(self.setup.share(request));
		factory.version(self.setup.version());
		if let Some(resolver) = self.setup.url_resolver() {
			factory.set_url_resolver(Some(resolver));
		}
		factory
	}
}

#[async_trait]
impl<S: InertiaSetup + 'static> Middleware for InertiaMiddleware<S> {
	async fn process(&self, mut request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let factory = self.prepare(&request);
		let is_inertia = request.has_header(header::INERTIA);

		let response = if is_inertia
			&& request.method == Method::GET
			&& is_stale(request.header(header::VERSION), &factory.get_version())
		{
			debug!(path = request.path(), "Asset version changed, forcing a full reload");
			if let Some(session) = request.session() {
				session.reflash();
			}
			factory.location(&request, &request.request_uri())
		} else {
			let method = request.method.clone();
			request.insert_extension(factory);
			let mut response = next.handle(request).await?;

			if is_inertia
				&& response.status == StatusCode::FOUND
				&& matches!(method, Method::POST | Method::PUT | Method::PATCH)
			{
				response.status = StatusCode::SEE_OTHER;
			}
			response
		};

		Ok(response.append_header(VARY, HeaderValue::from_static(header::INERTIA)))
	}
}

/// Turns history encryption on for every response of the request.
///
/// Must run after [`InertiaMiddleware`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EncryptHistoryMiddleware;

#[async_trait]
impl Middleware for EncryptHistoryMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		match request.extension::<ResponseFactory>() {
			Some(factory) => factory.encrypt_history(true),
			None => warn!("EncryptHistoryMiddleware ran before InertiaMiddleware"),
		}
		next.handle(request).await
	}
}

/// Validation errors stored in the session, one message per field.
///
/// Each field keeps its first message. With an `x-inertia-error-bag` header
/// the errors are nested under the bag name. Without errors the result is
/// an empty object.
pub fn validation_errors(request: &Request) -> Value {
	let stored = request
		.session()
		.and_then(|session| session.get(VALIDATION_ERRORS_SESSION_KEY));

	let fields = match stored {
		Some(Value::Object(fields)) if !fields.is_empty() => fields,
		_ => return Value::Object(Map::new()),
	};

	let errors: Map<String, Value> = fields
		.into_iter()
		.map(|(field, messages)| {
			let first = match messages {
				Value::Array(messages) => messages.into_iter().next().unwrap_or(Value::Null),
				message => message,
			};
			(field, first)
		})
		.collect();

	match request.header(header::ERROR_BAG).filter(|bag| !bag.is_empty()) {
		Some(bag) => {
			let mut bagged = Map::new();
			bagged.insert(bag.to_string(), Value::Object(errors));
			Value::Object(bagged)
		}
		None => Value::Object(errors),
	}
}
