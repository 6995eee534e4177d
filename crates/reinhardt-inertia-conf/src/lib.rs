//! Configuration for the Reinhardt Inertia adapter.
//!
//! [`InertiaConfig`] groups the recognized options:
//!
//! - [`SsrConfig`]: server-side rendering gateway (`enabled`, `url`,
//!   `bundle`, `ensure_bundle_exists`, `timeout_secs`)
//! - [`PageConfig`]: page component existence checking
//! - [`HistoryConfig`]: default history encryption
//! - `transform_pagination`: convert paginated datasets into the
//!   `{data, links, meta}` shape
//!
//! Configuration can be built in code, loaded from a TOML or JSON file and
//! overridden from `INERTIA_*` environment variables.
//!
//! ```
//! use reinhardt_inertia_conf::InertiaConfig;
//!
//! let config = InertiaConfig::from_toml_str(r#"
//!     transform_pagination = false
//!
//!     [ssr]
//!     enabled = true
//!     url = "http://127.0.0.1:13714"
//! "#).unwrap();
//!
//! assert!(config.ssr.enabled);
//! assert!(!config.transform_pagination);
//! assert!(!config.history.encrypt);
//! ```

pub mod env;
pub mod error;
pub mod inertia;

pub use error::{ConfigError, Result};
pub use inertia::{HistoryConfig, InertiaConfig, PageConfig, SsrConfig};
