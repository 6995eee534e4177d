//! Server-side rendering dispatch for Inertia pages.
//!
//! A [`Gateway`] receives a finished page object and may return pre-rendered
//! markup. Every failure collapses to `None`, and the caller falls back to
//! client-side rendering.
//!
//! - [`HttpGateway`]: posts the page to an SSR server (`POST {url}/render`)
//! - [`NoopGateway`]: never renders
//! - [`BundleDetector`]: locates the SSR bundle on disk
//!
//! ```no_run
//! use reinhardt_inertia_conf::SsrConfig;
//! use reinhardt_inertia_ssr::{Gateway, HttpGateway};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let gateway = HttpGateway::new(SsrConfig::enabled("http://127.0.0.1:13714"), ".").unwrap();
//! let page = json!({"component": "Home", "props": {}, "url": "/", "version": ""});
//!
//! match gateway.dispatch(&page).await {
//!     Some(rendered) => println!("{}", rendered.body),
//!     None => println!("client-side rendering"),
//! }
//! # }
//! ```

pub mod bundle;
pub mod error;
pub mod gateway;
#[cfg(feature = "http-gateway")]
pub mod http_gateway;

pub use bundle::BundleDetector;
pub use error::SsrDispatchError;
pub use gateway::{Gateway, HasHealthCheck, NoopGateway, SsrResponse};
#[cfg(feature = "http-gateway")]
pub use http_gateway::HttpGateway;
