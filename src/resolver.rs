//! Prop resolution: turns declared props into the JSON tree sent to the
//! client, plus the merge and deferral directives describing it.
//!
//! Resolution runs in stages:
//!
//! 1. positional providers are expanded into top-level props,
//! 2. partial-reload filters are applied (`only`, then `except`), or
//!    first-load exclusions on full loads,
//! 3. `always` props are put back over the filtered result,
//! 4. every value is materialized depth-first in declaration order,
//! 5. dotted top-level keys are unpacked into nested objects, after every
//!    plain key, so an `always` prop under a dotted key lands last.
//!
//! Transformers see the declared siblings of their prop, before any
//! filtering. Directives are computed from the provider-expanded declaration, not from
//! the filtered result.

use futures::future::BoxFuture;
use indexmap::IndexMap;
use reinhardt_inertia_http::{Request, Response};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::pagination::PaginatorAdapter;
use crate::partial::PartialReload;
use crate::props::{
	PropKey, PropMap, PropValue, PropertyContext, RenderContext, forget_path, get_path,
	set_json_path, set_path,
};

/// Output of [`PropResolver::resolve`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedProps {
	pub props: Map<String, Value>,
	pub merge_props: Vec<String>,
	pub deep_merge_props: Vec<String>,
	/// Entries of the form `{key}.{path}`.
	pub match_props_on: Vec<String>,
	/// Deferred keys by group, in first-seen order. Empty on partial reloads.
	pub deferred_props: IndexMap<String, Vec<String>>,
}

/// Resolves one component's props for one request.
///
/// # Examples
///
/// ```
/// use reinhardt_inertia::PropResolver;
/// use reinhardt_inertia::props::{PropMap, defer, lazy};
/// use reinhardt_inertia_http::Request;
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let request = Request::builder().uri("/dashboard").build().unwrap();
/// let props = PropMap::new()
///     .with("user", json!({"name": "Jonathan"}))
///     .with("feed", defer(lazy(|_| json!(["post"]))));
///
/// let resolved = PropResolver::new(&request, "Dashboard").resolve(props).await.unwrap();
///
/// assert_eq!(resolved.props["user"]["name"], json!("Jonathan"));
/// assert!(!resolved.props.contains_key("feed"));
/// assert_eq!(resolved.deferred_props["default"], vec!["feed"]);
/// # });
/// ```
pub struct PropResolver<'a> {
	request: &'a Request,
	component: &'a str,
	partial: PartialReload,
	transform_pagination: bool,
}

impl<'a> PropResolver<'a> {
	/// Reads the partial-reload filters from `request`. Pagination
	/// transformation is on.
	pub fn new(request: &'a Request, component: &'a str) -> Self {
		Self {
			request,
			component,
			partial: PartialReload::from_request(request, component),
			transform_pagination: true,
		}
	}

	/// Replaces the filters read from the request.
	pub fn with_partial(mut self, partial: PartialReload) -> Self {
		self.partial = partial;
		self
	}

	pub fn transform_pagination(mut self, enabled: bool) -> Self {
		self.transform_pagination = enabled;
		self
	}

	pub fn partial(&self) -> &PartialReload {
		&self.partial
	}

	/// Runs every stage and computes the directives.
	///
	/// # Errors
	///
	/// Returns [`Error::Prop`] with the producer's error when a fallible
	/// callable fails. Resolution stops at the first failure.
	pub async fn resolve(&self, declared: PropMap) -> Result<ResolvedProps> {
		debug!(
			component = self.component,
			partial = self.partial.is_partial,
			"Resolving Inertia props"
		);

		let declared = self.expand_providers(declared);
		let filtered = self.filter(&declared);
		let props = self.materialize_map(&filtered, &declared, None, true).await?;
		let (merge_props, deep_merge_props, match_props_on) = self.merge_directives(&declared);

		Ok(ResolvedProps {
			props,
			merge_props,
			deep_merge_props,
			match_props_on,
			deferred_props: self.deferred_groups(&declared),
		})
	}

	/// Expands positional providers into the top level. Later keys overwrite
	/// earlier ones in place.
	pub fn expand_providers(&self, declared: PropMap) -> PropMap {
		let mut expanded = PropMap::new();
		self.expand_into(&mut expanded, declared);
		expanded
	}

	fn expand_into(&self, target: &mut PropMap, source: PropMap) {
		for (key, value) in source {
			match (key, value) {
				(PropKey::Index(_), PropValue::Provider(provider)) => {
					let provided = provider.to_props(&self.render_context());
					self.expand_into(target, provided);
				}
				(PropKey::Index(_), value) => target.push(value),
				(key, value) => target.insert_key(key, value),
			}
		}
	}

	fn render_context(&self) -> RenderContext<'_> {
		RenderContext {
			component: self.component,
			request: self.request,
		}
	}

	/// Applies first-load exclusions or partial-reload filters, then puts
	/// `always` props back. Whatever the filters selected under an `always`
	/// key's dotted path is dropped in its favour.
	pub fn filter(&self, declared: &PropMap) -> PropMap {
		let mut filtered = if self.partial.is_partial {
			self.filter_partial(declared)
		} else {
			let mut props = declared.clone();
			props.retain(|_, value| !value.is_excluded_from_first_load());
			props
		};

		let mut result = PropMap::new();
		for (key, value) in declared.iter().filter(|(_, value)| value.is_always()) {
			if let Some(name) = key.as_name().filter(|name| name.contains('.')) {
				forget_path(&mut filtered, name);
			}
			result.insert_key(key.clone(), value.clone());
		}
		for (key, value) in filtered {
			if result.get_key(&key).is_none() {
				result.insert_key(key, value);
			}
		}
		result
	}

	fn filter_partial(&self, declared: &PropMap) -> PropMap {
		let mut props = if self.partial.only.is_empty() {
			declared.clone()
		} else {
			let mut selected = PropMap::new();
			for path in &self.partial.only {
				let value = get_path(declared, path).unwrap_or(PropValue::Json(Value::Null));
				set_path(&mut selected, path, value);
			}
			selected
		};

		for path in &self.partial.except {
			forget_path(&mut props, path);
		}
		props
	}

	/// Returns `(mergeProps, deepMergeProps, matchPropsOn)`.
	pub fn merge_directives(&self, declared: &PropMap) -> (Vec<String>, Vec<String>, Vec<String>) {
		let mut shallow = Vec::new();
		let mut deep = Vec::new();
		let mut match_on = Vec::new();

		for (key, value) in declared.iter() {
			let Some(strategy) = value.as_prop().and_then(|prop| prop.merge_strategy()) else {
				continue;
			};
			let key = key.to_string();
			if !self.partial.reports_merge(&key) {
				continue;
			}

			match_on.extend(strategy.match_on.iter().map(|path| format!("{key}.{path}")));
			if strategy.deep {
				deep.push(key);
			} else {
				shallow.push(key);
			}
		}

		(shallow, deep, match_on)
	}

	/// Groups deferred keys. Partial reloads never report groups.
	pub fn deferred_groups(&self, declared: &PropMap) -> IndexMap<String, Vec<String>> {
		let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
		if self.partial.is_partial {
			return groups;
		}

		for (key, value) in declared.iter() {
			if let Some(group) = value.as_prop().and_then(|prop| prop.deferred_group()) {
				groups.entry(group.to_string()).or_default().push(key.to_string());
			}
		}
		groups
	}

	fn materialize_map<'f>(
		&'f self,
		map: &'f PropMap,
		declared: &'f PropMap,
		prefix: Option<&'f str>,
		unpack_dots: bool,
	) -> BoxFuture<'f, Result<Map<String, Value>>> {
		Box::pin(async move {
			let mut result = Map::new();
			let mut dotted = Vec::new();

			for (key, value) in map.iter() {
				let counterpart = declared.get_key(key);
				let key = key.to_string();
				let path = match prefix {
					Some(prefix) => format!("{prefix}.{key}"),
					None => key.clone(),
				};
				let value = self
					.materialize_value(value.clone(), &path, declared, counterpart)
					.await?;

				if unpack_dots && key.contains('.') {
					dotted.push((key, value));
				} else {
					result.insert(key, value);
				}
			}

			for (key, value) in dotted {
				set_json_path(&mut result, &key, value);
			}

			Ok(result)
		})
	}

	/// `siblings` is the declared map holding this prop and `declared` its
	/// declared value, used to hand transformers the unfiltered tree.
	fn materialize_value<'f>(
		&'f self,
		value: PropValue,
		path: &'f str,
		siblings: &'f PropMap,
		declared: Option<&'f PropValue>,
	) -> BoxFuture<'f, Result<Value>> {
		Box::pin(async move {
			let mut value = value;
			loop {
				value = match value {
					PropValue::Json(json) => return Ok(json),
					PropValue::Prop(prop) => (*prop).into_value(),
					PropValue::Callable(callable) => {
						callable.invoke(self.request).await.map_err(Error::Prop)?
					}
					PropValue::Transformer(transformer) => transformer.to_prop(&PropertyContext {
						key: path,
						props: siblings,
						request: self.request,
					}),
					PropValue::Provider(provider) => {
						PropValue::Map(self.expand_providers(provider.to_props(&self.render_context())))
					}
					PropValue::Paginated(paginated) if self.transform_pagination => {
						return Ok(PaginatorAdapter::new(&paginated, self.request).to_json());
					}
					PropValue::Paginated(paginated) => return Ok(serde_json::to_value(&paginated)?),
					PropValue::Response(response) => return Ok(response_body(&response)),
					PropValue::Map(map) => {
						let declared = match declared {
							Some(PropValue::Map(declared)) => declared,
							_ => &map,
						};
						let object = self.materialize_map(&map, declared, Some(path), false).await?;
						return Ok(Value::Object(object));
					}
					PropValue::List(items) => {
						let declared = match declared {
							Some(PropValue::List(declared)) if declared.len() == items.len() => {
								list_map(declared.iter().cloned())
							}
							_ => list_map(items.iter().cloned()),
						};
						let list = list_map(items);
						let object = self.materialize_map(&list, &declared, Some(path), false).await?;
						return Ok(Value::Array(object.into_iter().map(|(_, v)| v).collect()));
					}
				};
			}
		})
	}
}

fn list_map(items: impl IntoIterator<Item = PropValue>) -> PropMap {
	let mut list = PropMap::new();
	for item in items {
		list.push(item);
	}
	list
}

/// A nested response contributes its body: parsed JSON when possible,
/// otherwise the body as text.
fn response_body(response: &Response) -> Value {
	serde_json::from_slice(&response.body)
		.unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&response.body).into_owned()))
}
