//! Prop values and the wrappers that control when they are sent.
//!
//! A page's props are declared as a [`PropMap`]: an ordered map from key to
//! [`PropValue`]. Values can be plain JSON, nested maps, lazily evaluated
//! callables, policy wrappers ([`Prop`]), providers contributing several
//! props at once, transformers, paginated datasets or nested responses.
//!
//! ```
//! use reinhardt_inertia::props::{PropMap, defer, lazy, merge, optional};
//! use serde_json::json;
//!
//! let props = PropMap::new()
//!     .with("user", json!({"name": "Jonathan"}))
//!     .with("stats", optional(lazy(|_| json!({"visits": 42}))))
//!     .with("feed", defer(lazy(|_| json!(["post-1", "post-2"]))).merge())
//!     .with("tags", merge(json!(["rust"])).match_on(["id"]));
//!
//! assert_eq!(props.len(), 4);
//! ```

mod path;
mod provider;
mod wrapper;

pub use path::{forget_path, get_path, set_json_path, set_path};
pub use provider::{PropertyContext, ProvidesProp, ProvidesProps, RenderContext};
pub use wrapper::{MergeStrategy, Prop, always, deep_merge, defer, defer_in, merge, optional};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use reinhardt_inertia_http::{Request, Response};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::error::BoxError;
use crate::pagination::PaginatedData;

type SyncProducer = dyn Fn(&Request) -> Result<PropValue, BoxError> + Send + Sync;
type AsyncProducer = dyn Fn(&Request) -> BoxFuture<'static, Result<PropValue, BoxError>> + Send + Sync;

/// A zero-argument producer, invoked with the current request when the
/// value is materialized.
#[derive(Clone)]
pub enum Callable {
	Sync(Arc<SyncProducer>),
	Async(Arc<AsyncProducer>),
}

impl Callable {
	/// Runs the producer. Errors are returned unchanged.
	pub async fn invoke(&self, request: &Request) -> Result<PropValue, BoxError> {
		match self {
			Callable::Sync(producer) => producer(request),
			Callable::Async(producer) => producer(request).await,
		}
	}
}

impl fmt::Debug for Callable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Callable::Sync(_) => f.write_str("Callable::Sync(..)"),
			Callable::Async(_) => f.write_str("Callable::Async(..)"),
		}
	}
}

/// Key of a declared prop.
///
/// Providers added without a name are stored under positional keys and
/// expanded into named props during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropKey {
	Name(String),
	Index(usize),
}

impl PropKey {
	pub fn as_name(&self) -> Option<&str> {
		match self {
			PropKey::Name(name) => Some(name),
			PropKey::Index(_) => None,
		}
	}
}

impl fmt::Display for PropKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PropKey::Name(name) => f.write_str(name),
			PropKey::Index(index) => write!(f, "{index}"),
		}
	}
}

impl From<&str> for PropKey {
	fn from(name: &str) -> Self {
		PropKey::Name(name.to_string())
	}
}

impl From<String> for PropKey {
	fn from(name: String) -> Self {
		PropKey::Name(name)
	}
}

/// A declared prop value.
#[derive(Clone)]
pub enum PropValue {
	/// Already-plain JSON.
	Json(Value),
	/// Nested map whose values may still be lazy.
	Map(PropMap),
	/// List whose items may still be lazy.
	List(Vec<PropValue>),
	/// Closure evaluated at materialization.
	Callable(Callable),
	/// Value tagged with an inclusion policy.
	Prop(Box<Prop>),
	/// Object contributing several props.
	Provider(Arc<dyn ProvidesProps>),
	/// Object converting itself given its position in the prop tree.
	Transformer(Arc<dyn ProvidesProp>),
	/// Already-paginated dataset.
	Paginated(PaginatedData),
	/// Nested response, unwrapped to its body.
	Response(Response),
}

impl PropValue {
	/// Serializes any [`serde::Serialize`] value into a plain JSON prop.
	pub fn serialize<T: serde::Serialize>(value: &T) -> crate::Result<Self> {
		Ok(PropValue::Json(serde_json::to_value(value)?))
	}

	/// The policy wrapper, if this value carries one.
	pub fn as_prop(&self) -> Option<&Prop> {
		match self {
			PropValue::Prop(prop) => Some(prop.as_ref()),
			_ => None,
		}
	}

	/// True for optional and deferred props.
	pub fn is_excluded_from_first_load(&self) -> bool {
		self.as_prop().is_some_and(Prop::is_excluded_from_first_load)
	}

	/// True for props wrapped with [`always`].
	pub fn is_always(&self) -> bool {
		self.as_prop().is_some_and(Prop::is_always)
	}
}

impl fmt::Debug for PropValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PropValue::Json(value) => f.debug_tuple("Json").field(value).finish(),
			PropValue::Map(map) => f.debug_tuple("Map").field(map).finish(),
			PropValue::List(items) => f.debug_tuple("List").field(items).finish(),
			PropValue::Callable(callable) => callable.fmt(f),
			PropValue::Prop(prop) => f.debug_tuple("Prop").field(prop).finish(),
			PropValue::Provider(_) => f.write_str("Provider(..)"),
			PropValue::Transformer(_) => f.write_str("Transformer(..)"),
			PropValue::Paginated(data) => f.debug_tuple("Paginated").field(data).finish(),
			PropValue::Response(response) => f.debug_tuple("Response").field(&response.status).finish(),
		}
	}
}

macro_rules! json_prop_from {
	($($ty:ty),* $(,)?) => {
		$(
			impl From<$ty> for PropValue {
				fn from(value: $ty) -> Self {
					PropValue::Json(Value::from(value))
				}
			}
		)*
	};
}

json_prop_from!(&str, String, bool, i32, i64, u32, u64, f64);

impl From<Value> for PropValue {
	fn from(value: Value) -> Self {
		PropValue::Json(value)
	}
}

impl From<PropMap> for PropValue {
	fn from(map: PropMap) -> Self {
		PropValue::Map(map)
	}
}

impl From<Vec<PropValue>> for PropValue {
	fn from(items: Vec<PropValue>) -> Self {
		PropValue::List(items)
	}
}

impl From<Callable> for PropValue {
	fn from(callable: Callable) -> Self {
		PropValue::Callable(callable)
	}
}

impl From<Prop> for PropValue {
	fn from(prop: Prop) -> Self {
		PropValue::Prop(Box::new(prop))
	}
}

impl From<PaginatedData> for PropValue {
	fn from(data: PaginatedData) -> Self {
		PropValue::Paginated(data)
	}
}

impl From<Response> for PropValue {
	fn from(response: Response) -> Self {
		PropValue::Response(response)
	}
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
	fn from(value: Option<T>) -> Self {
		value.map_or(PropValue::Json(Value::Null), Into::into)
	}
}

/// Ordered map of declared props.
///
/// Inserting an existing name replaces the value in place, keeping the
/// original position.
#[derive(Clone, Default)]
pub struct PropMap {
	entries: IndexMap<PropKey, PropValue>,
	next_index: usize,
}

impl PropMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style [`PropMap::insert`].
	pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
		self.insert(key, value);
		self
	}

	/// Builder-style [`PropMap::provide`].
	pub fn with_provider(mut self, provider: Arc<dyn ProvidesProps>) -> Self {
		self.provide(provider);
		self
	}

	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Option<PropValue> {
		self.entries.insert(PropKey::Name(key.into()), value.into())
	}

	/// Appends a value under the next positional key.
	pub fn push(&mut self, value: impl Into<PropValue>) {
		let index = self.next_index;
		self.next_index += 1;
		self.entries.insert(PropKey::Index(index), value.into());
	}

	/// Appends a provider whose props are expanded at resolution time.
	pub fn provide(&mut self, provider: Arc<dyn ProvidesProps>) {
		self.push(PropValue::Provider(provider));
	}

	pub fn get(&self, key: &str) -> Option<&PropValue> {
		self.entries.get(&PropKey::from(key))
	}

	pub fn get_mut(&mut self, key: &str) -> Option<&mut PropValue> {
		self.entries.get_mut(&PropKey::from(key))
	}

	pub(crate) fn get_key(&self, key: &PropKey) -> Option<&PropValue> {
		self.entries.get(key)
	}

	pub(crate) fn get_key_mut(&mut self, key: &PropKey) -> Option<&mut PropValue> {
		self.entries.get_mut(key)
	}

	pub(crate) fn insert_key(&mut self, key: PropKey, value: PropValue) {
		if let PropKey::Index(index) = key {
			self.next_index = self.next_index.max(index + 1);
		}
		self.entries.insert(key, value);
	}

	/// Removes `key`, keeping the order of the remaining entries.
	pub fn remove(&mut self, key: &str) -> Option<PropValue> {
		self.remove_key(&PropKey::from(key))
	}

	pub(crate) fn remove_key(&mut self, key: &PropKey) -> Option<PropValue> {
		self.entries.shift_remove(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.get(key).is_some()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&PropKey, &PropValue)> {
		self.entries.iter()
	}

	/// Named keys in declaration order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().filter_map(PropKey::as_name)
	}

	/// Merges `other` into `self`: names overwrite, positional entries are
	/// appended under fresh positions.
	pub fn extend(&mut self, other: PropMap) {
		for (key, value) in other.entries {
			match key {
				PropKey::Name(_) => {
					self.entries.insert(key, value);
				}
				PropKey::Index(_) => self.push(value),
			}
		}
	}

	/// Keeps only the entries for which `keep` returns true.
	pub fn retain(&mut self, mut keep: impl FnMut(&PropKey, &PropValue) -> bool) {
		self.entries.retain(|key, value| keep(key, value));
	}
}

impl fmt::Debug for PropMap {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.entries.iter()).finish()
	}
}

impl IntoIterator for PropMap {
	type Item = (PropKey, PropValue);
	type IntoIter = indexmap::map::IntoIter<PropKey, PropValue>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}

impl<K, V> FromIterator<(K, V)> for PropMap
where
	K: Into<String>,
	V: Into<PropValue>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut map = PropMap::new();
		for (key, value) in iter {
			map.insert(key, value);
		}
		map
	}
}

impl From<serde_json::Map<String, Value>> for PropMap {
	fn from(object: serde_json::Map<String, Value>) -> Self {
		object.into_iter().collect()
	}
}

impl From<Arc<dyn ProvidesProps>> for PropMap {
	fn from(provider: Arc<dyn ProvidesProps>) -> Self {
		PropMap::new().with_provider(provider)
	}
}

/// Wraps a closure evaluated when the prop is materialized.
///
/// # Examples
///
/// ```
/// use reinhardt_inertia::props::{PropValue, lazy};
/// use serde_json::json;
///
/// let value = lazy(|request| json!({"path": request.path()}));
/// assert!(matches!(value, PropValue::Callable(_)));
/// ```
pub fn lazy<F, V>(producer: F) -> PropValue
where
	F: Fn(&Request) -> V + Send + Sync + 'static,
	V: Into<PropValue>,
{
	PropValue::Callable(Callable::Sync(Arc::new(
		move |request: &Request| -> Result<PropValue, BoxError> { Ok(producer(request).into()) },
	)))
}

/// Like [`lazy`] for producers that can fail. The error aborts rendering
/// and is returned unchanged as [`crate::Error::Prop`].
pub fn try_lazy<F, V, E>(producer: F) -> PropValue
where
	F: Fn(&Request) -> Result<V, E> + Send + Sync + 'static,
	V: Into<PropValue>,
	E: Into<BoxError>,
{
	PropValue::Callable(Callable::Sync(Arc::new(
		move |request: &Request| -> Result<PropValue, BoxError> {
			producer(request).map(Into::into).map_err(Into::into)
		},
	)))
}

/// Wraps an async producer. It is awaited in declaration order.
pub fn lazy_async<F, Fut, V>(producer: F) -> PropValue
where
	F: Fn(&Request) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = V> + Send + 'static,
	V: Into<PropValue>,
{
	PropValue::Callable(Callable::Async(Arc::new(
		move |request: &Request| -> BoxFuture<'static, Result<PropValue, BoxError>> {
			let future = producer(request);
			Box::pin(async move { Ok(future.await.into()) })
		},
	)))
}

/// Like [`lazy_async`] for producers that can fail.
pub fn try_lazy_async<F, Fut, V, E>(producer: F) -> PropValue
where
	F: Fn(&Request) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<V, E>> + Send + 'static,
	V: Into<PropValue>,
	E: Into<BoxError>,
{
	PropValue::Callable(Callable::Async(Arc::new(
		move |request: &Request| -> BoxFuture<'static, Result<PropValue, BoxError>> {
			let future = producer(request);
			Box::pin(async move { future.await.map(Into::into).map_err(Into::into) })
		},
	)))
}

/// Wraps a transformer invoked with its key path and sibling props.
pub fn transformer(transformer: impl ProvidesProp + 'static) -> PropValue {
	PropValue::Transformer(Arc::new(transformer))
}

/// Wraps a provider. Under a name it resolves to a nested map; pushed
/// positionally it is expanded into top-level props.
pub fn provider(provider: impl ProvidesProps + 'static) -> PropValue {
	PropValue::Provider(Arc::new(provider))
}
