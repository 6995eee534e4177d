//! # Reinhardt Inertia
//!
//! Server-side adapter for the [Inertia](https://inertiajs.com) protocol.
//!
//! A handler names a client-side page component and hands over its props.
//! The adapter answers the first visit with an HTML document embedding the
//! page object, and later visits (`x-inertia: true`) with the page object as
//! JSON. Everything in between is handled here:
//!
//! - prop wrappers: [`props::always`], [`props::optional`], [`props::defer`],
//!   [`props::merge`] and [`props::deep_merge`]
//! - partial reloads driven by the `x-inertia-partial-*` headers
//! - nested, lazy and provider-contributed props resolved in one pass
//! - asset version negotiation with `409` full-reload responses
//! - history encryption and clearing
//! - server-side rendering through an external process
//!
//! ## Quick Start
//!
//! ```rust
//! use reinhardt_inertia::{Inertia, InertiaMiddleware, ResponseFactory};
//! use reinhardt_inertia::props::{PropMap, defer, optional};
//! use reinhardt_inertia_conf::InertiaConfig;
//! use reinhardt_inertia_http::{Handler, MiddlewareChain, Request, Response, Result};
//! use async_trait::async_trait;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! struct ShowUser;
//!
//! #[async_trait]
//! impl Handler for ShowUser {
//!     async fn handle(&self, request: Request) -> Result<Response> {
//!         let inertia = ResponseFactory::from_request(&request)?;
//!         let props = PropMap::new()
//!             .with("user", json!({"id": 123, "name": "Jonathan"}))
//!             .with("teams", optional(json!(["Ops"])))
//!             .with("activity", defer(json!([])));
//!
//!         Ok(inertia.render("User/Show", props)?.materialize(&request).await?)
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let app = MiddlewareChain::new(Arc::new(ShowUser))
//!     .with_middleware(Arc::new(InertiaMiddleware::new(Inertia::new(InertiaConfig::default()))));
//!
//! let request = Request::builder()
//!     .uri("/users/123")
//!     .header("x-inertia", "true")
//!     .build()
//!     .unwrap();
//! let response = app.handle(request).await.unwrap();
//!
//! let page: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
//! assert_eq!(page["component"], json!("User/Show"));
//! assert_eq!(page["props"]["user"]["name"], json!("Jonathan"));
//! assert!(page["props"].get("teams").is_none());
//! assert_eq!(page["deferredProps"], json!({"default": ["activity"]}));
//! # });
//! ```
//!
//! ## Feature Flags
//!
//! - `ssr` (default): [`Inertia::with_http_gateway`], dispatching to an SSR
//!   server over HTTP

pub mod error;
pub mod factory;
pub mod header;
pub mod middleware;
pub mod page;
pub mod pages;
pub mod pagination;
pub mod partial;
pub mod props;
pub mod resolver;
pub mod response;
pub mod version;
pub mod view;

pub use error::{BoxError, Error, Result};
pub use factory::{Inertia, ResponseFactory, UrlResolver};
pub use middleware::{
	DefaultSetup, EncryptHistoryMiddleware, InertiaMiddleware, InertiaSetup, VALIDATION_ERRORS_SESSION_KEY,
	validation_errors,
};
pub use page::{CacheFor, PageObject};
pub use pages::ComponentFinder;
pub use pagination::{PaginatedData, PaginatorAdapter};
pub use partial::PartialReload;
pub use resolver::{PropResolver, ResolvedProps};
pub use response::{CLEAR_HISTORY_SESSION_KEY, InertiaResponse, location, location_from_redirect};
pub use version::AssetVersion;
pub use view::{DefaultRootView, InertiaView, RootView};

pub use reinhardt_inertia_conf as conf;
pub use reinhardt_inertia_http as http;
pub use reinhardt_inertia_ssr as ssr;
