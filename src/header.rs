//! Inertia protocol header names.
//!
//! Header lookups through [`hyper::HeaderMap`] are case-insensitive, so
//! these are written in lowercase.

/// Marks a protocol-aware exchange. Responses echo `true`.
pub const INERTIA: &str = "x-inertia";

/// Asset version the client currently runs.
pub const VERSION: &str = "x-inertia-version";

/// URL the client must visit with a full page load.
pub const LOCATION: &str = "x-inertia-location";

/// Component a partial reload is scoped to.
pub const PARTIAL_COMPONENT: &str = "x-inertia-partial-component";

/// Comma-separated keys requested by a partial reload.
pub const PARTIAL_ONLY: &str = "x-inertia-partial-data";

/// Comma-separated keys excluded from a partial reload.
pub const PARTIAL_EXCEPT: &str = "x-inertia-partial-except";

/// Comma-separated keys the client replaces instead of merging.
pub const RESET: &str = "x-inertia-reset";

/// Namespace for validation errors.
pub const ERROR_BAG: &str = "x-inertia-error-bag";

/// Path prefix added by a reverse proxy.
pub const FORWARDED_PREFIX: &str = "x-forwarded-prefix";
