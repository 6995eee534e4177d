use reinhardt_inertia_http::Request;

use super::{PropMap, PropValue};

/// Context passed to [`ProvidesProps::to_props`].
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
	/// Component being rendered.
	pub component: &'a str,
	pub request: &'a Request,
}

/// Context passed to [`ProvidesProp::to_prop`].
#[derive(Debug, Clone, Copy)]
pub struct PropertyContext<'a> {
	/// Dot path of the value being transformed, e.g. `auth.user`.
	pub key: &'a str,
	/// The map containing the value, before materialization.
	pub props: &'a PropMap,
	pub request: &'a Request,
}

/// An object that contributes several named props at once.
///
/// # Examples
///
/// ```
/// use reinhardt_inertia::props::{PropMap, ProvidesProps, RenderContext};
/// use serde_json::json;
///
/// struct Navigation;
///
/// impl ProvidesProps for Navigation {
///     fn to_props(&self, ctx: &RenderContext<'_>) -> PropMap {
///         PropMap::new()
///             .with("menu", json!(["home", "users"]))
///             .with("active", ctx.component.to_string())
///     }
/// }
/// ```
pub trait ProvidesProps: Send + Sync {
	fn to_props(&self, ctx: &RenderContext<'_>) -> PropMap;
}

/// A value that converts itself depending on where it sits in the prop tree.
pub trait ProvidesProp: Send + Sync {
	fn to_prop(&self, ctx: &PropertyContext<'_>) -> PropValue;
}
