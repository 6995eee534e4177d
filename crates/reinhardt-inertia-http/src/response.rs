use bytes::Bytes;
use hyper::header::{self, HeaderName, HeaderValue};
use hyper::{HeaderMap, StatusCode};
use serde::Serialize;

/// HTTP Response representation
#[derive(Debug, Clone)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Response {
	/// Create a new Response with the given status code
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_inertia_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::new(StatusCode::OK);
	/// assert_eq!(response.status, StatusCode::OK);
	/// assert!(response.body.is_empty());
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	/// Create a Response with HTTP 200 OK status
	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	/// Create a Response with HTTP 409 Conflict status
	///
	/// The Inertia protocol uses this status to ask the client for a full
	/// page visit.
	pub fn conflict() -> Self {
		Self::new(StatusCode::CONFLICT)
	}

	/// Create a Response with HTTP 500 Internal Server Error status
	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR)
	}

	/// Create a Response with HTTP 302 Found (temporary redirect)
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_inertia_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::temporary_redirect("/login");
	/// assert_eq!(response.status, StatusCode::FOUND);
	/// assert_eq!(response.header("location"), Some("/login"));
	/// ```
	pub fn temporary_redirect(location: impl AsRef<str>) -> Self {
		Self::new(StatusCode::FOUND).with_location(location.as_ref())
	}

	/// Create a Response with HTTP 303 See Other
	pub fn see_other(location: impl AsRef<str>) -> Self {
		Self::new(StatusCode::SEE_OTHER).with_location(location.as_ref())
	}

	/// Set the response body
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Set the status code
	pub fn with_status(mut self, status: StatusCode) -> Self {
		self.status = status;
		self
	}

	/// Add a custom header to the response, replacing existing values.
	///
	/// Names or values that are not valid header syntax are ignored.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_inertia_http::Response;
	///
	/// let response = Response::ok().with_header("X-Inertia", "true");
	/// assert_eq!(response.header("x-inertia"), Some("true"));
	/// ```
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (
			HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value),
		) {
			self.headers.insert(name, value);
		}
		self
	}

	/// Append a header value without removing existing values.
	pub fn append_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.append(name, value);
		self
	}

	/// Add a Location header to the response
	pub fn with_location(mut self, location: &str) -> Self {
		if let Ok(value) = HeaderValue::from_str(location) {
			self.headers.insert(header::LOCATION, value);
		}
		self
	}

	/// Set the response body to JSON and add appropriate Content-Type header
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_inertia_http::Response;
	/// use serde_json::json;
	///
	/// let response = Response::ok().with_json(&json!({"ok": true})).unwrap();
	/// assert_eq!(response.header("content-type"), Some("application/json"));
	/// assert_eq!(response.body, r#"{"ok":true}"#);
	/// ```
	pub fn with_json<T: Serialize>(mut self, data: &T) -> crate::Result<Self> {
		let json = serde_json::to_vec(data)?;
		self.body = Bytes::from(json);
		self.headers.insert(
			header::CONTENT_TYPE,
			HeaderValue::from_static("application/json"),
		);
		Ok(self)
	}

	/// Set the response body to an HTML document
	pub fn with_html(mut self, html: impl Into<String>) -> Self {
		self.body = Bytes::from(html.into());
		self.headers.insert(
			header::CONTENT_TYPE,
			HeaderValue::from_static("text/html; charset=utf-8"),
		);
		self
	}

	/// Returns a header value as a string.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	/// Returns true if the response is a redirect (3xx).
	pub fn is_redirect(&self) -> bool {
		self.status.is_redirection()
	}
}

impl From<crate::Error> for Response {
	fn from(error: crate::Error) -> Self {
		let status =
			StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		let body = serde_json::json!({
			"error": error.to_string(),
		});

		Response::new(status)
			.with_json(&body)
			.unwrap_or_else(|_| Response::internal_server_error())
	}
}
