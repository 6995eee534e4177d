use super::PropValue;

/// Group used by [`defer`] when none is given.
pub const DEFAULT_DEFER_GROUP: &str = "default";

/// How the client combines a prop with the value it already holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStrategy {
	pub enabled: bool,
	pub deep: bool,
	/// Key paths used to match items when merging lists of objects.
	pub match_on: Vec<String>,
}

impl MergeStrategy {
	fn shallow() -> Self {
		Self {
			enabled: true,
			..Self::default()
		}
	}
}

/// A prop value tagged with an inclusion policy.
#[derive(Debug, Clone)]
pub enum Prop {
	/// Sent on every visit, even when a partial reload did not ask for it.
	Always(PropValue),
	/// Sent only when a partial reload asks for it.
	Optional(PropValue),
	/// Left out of the first load and fetched afterwards, batched by group.
	Deferred {
		value: PropValue,
		group: String,
		merge: MergeStrategy,
	},
	/// Merged into the client's current value instead of replacing it.
	Merge { value: PropValue, merge: MergeStrategy },
}

impl Prop {
	/// Enables merging. Only deferred and merge props carry merge semantics;
	/// other variants are returned unchanged.
	pub fn merge(mut self) -> Self {
		if let Some(strategy) = self.strategy_mut() {
			strategy.enabled = true;
		}
		self
	}

	/// Enables deep merging, which implies merging.
	pub fn deep_merge(mut self) -> Self {
		if let Some(strategy) = self.strategy_mut() {
			strategy.enabled = true;
			strategy.deep = true;
		}
		self
	}

	/// Sets the key paths the client matches list items on.
	pub fn match_on<I, S>(mut self, paths: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		if let Some(strategy) = self.strategy_mut() {
			strategy.match_on = paths.into_iter().map(Into::into).collect();
		}
		self
	}

	fn strategy_mut(&mut self) -> Option<&mut MergeStrategy> {
		match self {
			Prop::Deferred { merge, .. } | Prop::Merge { merge, .. } => Some(merge),
			Prop::Always(_) | Prop::Optional(_) => None,
		}
	}

	/// The merge strategy, if merging is enabled.
	pub fn merge_strategy(&self) -> Option<&MergeStrategy> {
		match self {
			Prop::Deferred { merge, .. } | Prop::Merge { merge, .. } if merge.enabled => Some(merge),
			_ => None,
		}
	}

	pub fn deferred_group(&self) -> Option<&str> {
		match self {
			Prop::Deferred { group, .. } => Some(group),
			_ => None,
		}
	}

	pub fn is_always(&self) -> bool {
		matches!(self, Prop::Always(_))
	}

	/// Optional and deferred props are left out of full page loads.
	pub fn is_excluded_from_first_load(&self) -> bool {
		matches!(self, Prop::Optional(_) | Prop::Deferred { .. })
	}

	/// Unwraps the value. Callables inside are evaluated by the resolver.
	pub fn into_value(self) -> PropValue {
		match self {
			Prop::Always(value)
			| Prop::Optional(value)
			| Prop::Deferred { value, .. }
			| Prop::Merge { value, .. } => value,
		}
	}
}

/// Always included, even in partial reloads that did not request it.
pub fn always(value: impl Into<PropValue>) -> Prop {
	Prop::Always(value.into())
}

/// Included only when a partial reload requests it.
///
/// # Examples
///
/// ```
/// use reinhardt_inertia::props::{lazy, optional};
///
/// let prop = optional(lazy(|_| "expensive"));
/// assert!(prop.is_excluded_from_first_load());
/// ```
pub fn optional(value: impl Into<PropValue>) -> Prop {
	Prop::Optional(value.into())
}

/// Deferred into the `default` group.
pub fn defer(value: impl Into<PropValue>) -> Prop {
	defer_in(value, DEFAULT_DEFER_GROUP)
}

/// Deferred into `group`. Props sharing a group are fetched together.
pub fn defer_in(value: impl Into<PropValue>, group: impl Into<String>) -> Prop {
	Prop::Deferred {
		value: value.into(),
		group: group.into(),
		merge: MergeStrategy::default(),
	}
}

/// Shallow-merged into the client's current value.
pub fn merge(value: impl Into<PropValue>) -> Prop {
	Prop::Merge {
		value: value.into(),
		merge: MergeStrategy::shallow(),
	}
}

/// Deep-merged into the client's current value.
///
/// # Examples
///
/// ```
/// use reinhardt_inertia::props::deep_merge;
/// use serde_json::json;
///
/// let prop = deep_merge(json!({"items": []})).match_on(["items.id"]);
/// let strategy = prop.merge_strategy().unwrap();
/// assert!(strategy.deep);
/// assert_eq!(strategy.match_on, vec!["items.id"]);
/// ```
pub fn deep_merge(value: impl Into<PropValue>) -> Prop {
	merge(value).deep_merge()
}
