//! HTTP boundary types for the Reinhardt Inertia adapter.
//!
//! This crate provides the small request/response surface the Inertia
//! protocol layer is written against:
//!
//! - [`Request`] and [`RequestBuilder`] for incoming requests
//! - [`Response`] for outgoing responses
//! - [`Handler`], [`Middleware`] and [`MiddlewareChain`] for composing
//!   request processing
//! - [`Session`], [`MemorySession`] and [`SessionHandle`] for the
//!   session-storage boundary
//!
//! ## Quick Start
//!
//! ```rust
//! use reinhardt_inertia_http::{Request, Response};
//! use hyper::Method;
//!
//! let request = Request::builder()
//!     .method(Method::GET)
//!     .uri("/users?page=2")
//!     .header("x-inertia", "true")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(request.path(), "/users");
//! assert_eq!(request.header("x-inertia"), Some("true"));
//!
//! let response = Response::ok().with_body("Hello");
//! assert_eq!(response.status, hyper::StatusCode::OK);
//! ```

pub mod error;
pub mod middleware;
pub mod request;
pub mod response;
pub mod session;

pub use error::{Error, Result};
pub use middleware::{Handler, Middleware, MiddlewareChain};
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use session::{MemorySession, Session, SessionHandle};

// Re-export the hyper types that appear in public signatures
pub use hyper::{HeaderMap, Method, StatusCode, Uri, Version};
