//! Dot-path operations over prop trees.
//!
//! Paths such as `auth.user.name` address nested maps, JSON objects and
//! lists (numeric segments index into lists). Lookups never descend into
//! wrappers or callables: those are opaque until materialized.

use serde_json::Value;

use super::{PropKey, PropMap, PropValue};

#[derive(Clone, Copy)]
enum Node<'a> {
	Prop(&'a PropValue),
	Json(&'a Value),
}

fn key_for(map: &PropMap, segment: &str) -> PropKey {
	let name = PropKey::from(segment);
	if map.get_key(&name).is_some() {
		return name;
	}
	match segment.parse::<usize>() {
		Ok(index) if map.get_key(&PropKey::Index(index)).is_some() => PropKey::Index(index),
		_ => name,
	}
}

fn json_child<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
	match value {
		Value::Object(object) => object.get(segment),
		Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
		_ => None,
	}
}

fn child<'a>(node: Node<'a>, segment: &str) -> Option<Node<'a>> {
	match node {
		Node::Prop(PropValue::Map(map)) => map.get_key(&key_for(map, segment)).map(Node::Prop),
		Node::Prop(PropValue::List(items)) => segment
			.parse::<usize>()
			.ok()
			.and_then(|i| items.get(i))
			.map(Node::Prop),
		Node::Prop(PropValue::Json(value)) | Node::Json(value) => {
			json_child(value, segment).map(Node::Json)
		}
		Node::Prop(_) => None,
	}
}

/// Returns a copy of the value at `path`, or `None` if any segment is
/// missing. A key spelled exactly as `path` is preferred over walking its
/// segments.
///
/// # Examples
///
/// ```
/// use reinhardt_inertia::props::{PropMap, PropValue, get_path};
/// use serde_json::json;
///
/// let props = PropMap::new().with("auth", json!({"user": {"name": "Ada"}}));
///
/// let name = get_path(&props, "auth.user.name");
/// assert!(matches!(name, Some(PropValue::Json(v)) if v == json!("Ada")));
/// assert!(get_path(&props, "auth.team").is_none());
/// ```
pub fn get_path(map: &PropMap, path: &str) -> Option<PropValue> {
	if let Some(value) = map.get_key(&PropKey::from(path)) {
		return Some(value.clone());
	}

	let mut segments = path.split('.');
	let first = segments.next()?;
	let mut node = Node::Prop(map.get_key(&key_for(map, first))?);

	for segment in segments {
		node = child(node, segment)?;
	}

	Some(match node {
		Node::Prop(value) => value.clone(),
		Node::Json(value) => PropValue::Json(value.clone()),
	})
}

/// Stores `value` at `path`, creating intermediate maps as needed.
///
/// An intermediate JSON object is converted into a prop map so the new value
/// can sit beside its existing entries. Any other intermediate value is
/// replaced.
pub fn set_path(map: &mut PropMap, path: &str, value: PropValue) {
	let segments: Vec<&str> = path.split('.').collect();
	set_segments(map, &segments, value);
}

fn set_segments(map: &mut PropMap, segments: &[&str], value: PropValue) {
	match segments {
		[] => {}
		[last] => {
			let key = key_for(map, last);
			map.insert_key(key, value);
		}
		[first, rest @ ..] => {
			let key = key_for(map, first);
			match map.get_key_mut(&key) {
				Some(PropValue::Map(child)) => set_segments(child, rest, value),
				Some(slot) => {
					let mut child = match std::mem::replace(slot, PropValue::Json(Value::Null)) {
						PropValue::Json(Value::Object(object)) => PropMap::from(object),
						_ => PropMap::new(),
					};
					set_segments(&mut child, rest, value);
					*slot = PropValue::Map(child);
				}
				None => {
					let mut child = PropMap::new();
					set_segments(&mut child, rest, value);
					map.insert_key(key, PropValue::Map(child));
				}
			}
		}
	}
}

/// Removes the value at `path` and its subtree.
///
/// A key spelled exactly as `path` is removed first. Otherwise the segments
/// are walked through maps, JSON objects and lists; numeric segments remove
/// list items. Nothing happens when an intermediate segment is missing or
/// cannot hold children.
pub fn forget_path(map: &mut PropMap, path: &str) {
	if map.remove_key(&PropKey::from(path)).is_some() {
		return;
	}
	let segments: Vec<&str> = path.split('.').collect();
	forget_segments(map, &segments);
}

fn forget_segments(map: &mut PropMap, segments: &[&str]) {
	match segments {
		[] => {}
		[last] => {
			let key = key_for(map, last);
			map.remove_key(&key);
		}
		[first, rest @ ..] => {
			let key = key_for(map, first);
			if let Some(child) = map.get_key_mut(&key) {
				forget_prop(child, rest);
			}
		}
	}
}

fn forget_prop(value: &mut PropValue, segments: &[&str]) {
	match value {
		PropValue::Map(map) => forget_segments(map, segments),
		PropValue::Json(json) => forget_json(json, segments),
		PropValue::List(items) => {
			let Some((first, rest)) = segments.split_first() else {
				return;
			};
			let Some(index) = first.parse::<usize>().ok().filter(|index| *index < items.len()) else {
				return;
			};
			if rest.is_empty() {
				items.remove(index);
			} else if let Some(item) = items.get_mut(index) {
				forget_prop(item, rest);
			}
		}
		_ => {}
	}
}

fn forget_json(value: &mut Value, segments: &[&str]) {
	let Some((first, rest)) = segments.split_first() else {
		return;
	};
	match value {
		Value::Object(object) if rest.is_empty() => {
			object.shift_remove(*first);
		}
		Value::Object(object) => {
			if let Some(child) = object.get_mut(*first) {
				forget_json(child, rest);
			}
		}
		Value::Array(items) => {
			let Some(index) = first.parse::<usize>().ok().filter(|index| *index < items.len()) else {
				return;
			};
			if rest.is_empty() {
				items.remove(index);
			} else if let Some(item) = items.get_mut(index) {
				forget_json(item, rest);
			}
		}
		_ => {}
	}
}

/// Stores `value` at `path` inside a JSON object, replacing non-object
/// intermediates with empty objects.
///
/// # Examples
///
/// ```
/// use reinhardt_inertia::props::set_json_path;
/// use serde_json::{Map, Value, json};
///
/// let mut props = Map::new();
/// props.insert("auth".into(), json!({"user": {"name": "Ada"}}));
///
/// set_json_path(&mut props, "auth.user.can", json!({"edit": true}));
///
/// assert_eq!(Value::Object(props), json!({"auth": {"user": {"name": "Ada", "can": {"edit": true}}}}));
/// ```
pub fn set_json_path(object: &mut serde_json::Map<String, Value>, path: &str, value: Value) {
	match path.split_once('.') {
		None => {
			object.insert(path.to_string(), value);
		}
		Some((first, rest)) => {
			let slot = object
				.entry(first.to_string())
				.or_insert_with(|| Value::Object(serde_json::Map::new()));
			if !slot.is_object() {
				*slot = Value::Object(serde_json::Map::new());
			}
			if let Value::Object(child) = slot {
				set_json_path(child, rest, value);
			}
		}
	}
}
