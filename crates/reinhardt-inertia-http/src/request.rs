//! Incoming HTTP request representation.

use bytes::Bytes;
use hyper::header::{HeaderName, HeaderValue};
use hyper::http::Extensions;
use hyper::{HeaderMap, Method, Uri, Version};

use crate::session::SessionHandle;
use crate::{Error, Result};

/// HTTP request as seen by handlers and middleware.
///
/// Request-scoped state (the session handle, the Inertia response factory)
/// travels in `extensions`.
#[derive(Debug)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	pub extensions: Extensions,
}

impl Request {
	/// Starts building a request.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_inertia_http::Request;
	/// use hyper::Method;
	///
	/// let request = Request::builder()
	///     .method(Method::POST)
	///     .uri("/users")
	///     .build()
	///     .unwrap();
	/// assert_eq!(request.method, Method::POST);
	/// ```
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	/// Returns the path portion of the URI.
	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Returns the raw query string, if any.
	pub fn query_string(&self) -> Option<&str> {
		self.uri.query()
	}

	/// Returns the request URI as path plus query string.
	///
	/// Absolute-form URIs are reduced to their origin form, so a request for
	/// `http://example.com/users?page=2` yields `/users?page=2`.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_inertia_http::Request;
	///
	/// let request = Request::builder().uri("/users/?sort=name").build().unwrap();
	/// assert_eq!(request.request_uri(), "/users/?sort=name");
	/// ```
	pub fn request_uri(&self) -> String {
		self.uri
			.path_and_query()
			.map(|pq| pq.as_str().to_string())
			.unwrap_or_else(|| "/".to_string())
	}

	/// Decodes the query string into ordered key/value pairs.
	///
	/// A malformed query string yields no pairs.
	pub fn query_pairs(&self) -> Vec<(String, String)> {
		self.query_string()
			.and_then(|query| serde_urlencoded::from_str::<Vec<(String, String)>>(query).ok())
			.unwrap_or_default()
	}

	/// Returns a header value as a string, ignoring values that are not
	/// visible ASCII.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	/// Returns true if the header is present, whatever its value.
	pub fn has_header(&self, name: &str) -> bool {
		self.headers.contains_key(name)
	}

	/// Returns a typed value previously stored in the request extensions.
	pub fn extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
		self.extensions.get::<T>()
	}

	/// Stores a typed value in the request extensions, replacing any
	/// previous value of the same type.
	pub fn insert_extension<T: Clone + Send + Sync + 'static>(&mut self, value: T) {
		self.extensions.insert(value);
	}

	/// Returns the session attached to this request, if session middleware
	/// ran before the handler.
	pub fn session(&self) -> Option<SessionHandle> {
		self.extensions.get::<SessionHandle>().cloned()
	}
}

/// Builder for [`Request`].
#[derive(Debug, Default)]
pub struct RequestBuilder {
	method: Method,
	uri: Option<String>,
	version: Version,
	headers: HeaderMap,
	body: Bytes,
	extensions: Extensions,
	invalid_header: Option<String>,
}

impl RequestBuilder {
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = Some(uri.into());
		self
	}

	pub fn version(mut self, version: Version) -> Self {
		self.version = version;
		self
	}

	/// Replaces all headers.
	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	/// Appends a single header.
	///
	/// Invalid names or values are reported by [`RequestBuilder::build`].
	pub fn header(mut self, name: &str, value: &str) -> Self {
		match (
			HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value),
		) {
			(Ok(name), Ok(value)) => {
				self.headers.append(name, value);
			}
			_ => {
				self.invalid_header.get_or_insert_with(|| name.to_string());
			}
		}
		self
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Attaches a session handle.
	pub fn session(self, session: SessionHandle) -> Self {
		self.extension(session)
	}

	pub fn extension<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
		self.extensions.insert(value);
		self
	}

	/// Builds the request.
	///
	/// # Errors
	///
	/// Returns [`Error::InvalidUri`] if the URI does not parse and
	/// [`Error::InvalidHeader`] if a header added with
	/// [`RequestBuilder::header`] was rejected.
	pub fn build(self) -> Result<Request> {
		if let Some(name) = self.invalid_header {
			return Err(Error::InvalidHeader(name));
		}

		let raw = self.uri.unwrap_or_else(|| "/".to_string());
		let uri = raw
			.parse::<Uri>()
			.map_err(|e| Error::InvalidUri(format!("{raw}: {e}")))?;

		Ok(Request {
			method: self.method,
			uri,
			version: self.version,
			headers: self.headers,
			body: self.body,
			extensions: self.extensions,
		})
	}
}
