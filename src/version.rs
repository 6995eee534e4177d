//! Asset versions and stale-client detection.

use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Environment variable holding the asset base URL of a Vite build.
pub const ASSET_URL_ENV: &str = "VITE_ASSET_URL";

/// Manifest location probed by [`AssetVersion::detect`], relative to the
/// project root.
pub const DEFAULT_MANIFEST_PATH: &str = "public/build/manifest.json";

type VersionProducer = dyn Fn() -> String + Send + Sync;

/// Where the current asset version comes from.
///
/// # Examples
///
/// ```
/// use reinhardt_inertia::AssetVersion;
///
/// assert_eq!(AssetVersion::None.resolve(), "");
/// assert_eq!(AssetVersion::from("v2").resolve(), "v2");
/// assert_eq!(AssetVersion::from(42).resolve(), "42");
/// assert_eq!(AssetVersion::computed(|| "build-7".to_string()).resolve(), "build-7");
/// ```
#[derive(Clone, Default)]
pub enum AssetVersion {
	#[default]
	None,
	Fixed(String),
	Computed(Arc<VersionProducer>),
	/// Hash of an asset base URL.
	AssetUrl(String),
	/// Hash of a build manifest's contents, read on every resolution.
	Manifest(PathBuf),
}

impl AssetVersion {
	pub fn computed(producer: impl Fn() -> String + Send + Sync + 'static) -> Self {
		Self::Computed(Arc::new(producer))
	}

	/// The version string. An unreadable manifest resolves to the empty
	/// string, which never marks a client stale.
	pub fn resolve(&self) -> String {
		match self {
			AssetVersion::None => String::new(),
			AssetVersion::Fixed(version) => version.clone(),
			AssetVersion::Computed(producer) => producer(),
			AssetVersion::AssetUrl(url) => hash_bytes(url.as_bytes()),
			AssetVersion::Manifest(path) => match std::fs::read(path) {
				Ok(contents) => hash_bytes(&contents),
				Err(error) => {
					warn!(path = %path.display(), %error, "Failed to read asset manifest");
					String::new()
				}
			},
		}
	}

	/// Uses `VITE_ASSET_URL` when set, else `public/build/manifest.json`
	/// under `root` when it exists.
	pub fn detect(root: impl AsRef<Path>) -> Self {
		Self::detect_with(root, |key| std::env::var(key).ok())
	}

	/// [`AssetVersion::detect`] with a custom environment lookup.
	pub fn detect_with<F>(root: impl AsRef<Path>, lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(url) = lookup(ASSET_URL_ENV).filter(|url| !url.is_empty()) {
			return AssetVersion::AssetUrl(url);
		}

		let manifest = root.as_ref().join(DEFAULT_MANIFEST_PATH);
		if manifest.is_file() {
			return AssetVersion::Manifest(manifest);
		}

		AssetVersion::None
	}
}

impl fmt::Debug for AssetVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AssetVersion::None => f.write_str("None"),
			AssetVersion::Fixed(version) => f.debug_tuple("Fixed").field(version).finish(),
			AssetVersion::Computed(_) => f.write_str("Computed(..)"),
			AssetVersion::AssetUrl(url) => f.debug_tuple("AssetUrl").field(url).finish(),
			AssetVersion::Manifest(path) => f.debug_tuple("Manifest").field(path).finish(),
		}
	}
}

impl From<&str> for AssetVersion {
	fn from(version: &str) -> Self {
		AssetVersion::Fixed(version.to_string())
	}
}

impl From<String> for AssetVersion {
	fn from(version: String) -> Self {
		AssetVersion::Fixed(version)
	}
}

impl<T: Into<AssetVersion>> From<Option<T>> for AssetVersion {
	fn from(version: Option<T>) -> Self {
		version.map_or(AssetVersion::None, Into::into)
	}
}

macro_rules! numeric_version_from {
	($($ty:ty),* $(,)?) => {
		$(
			impl From<$ty> for AssetVersion {
				fn from(version: $ty) -> Self {
					AssetVersion::Fixed(version.to_string())
				}
			}
		)*
	};
}

numeric_version_from!(i32, i64, u32, u64, f64);

/// First 16 bytes of the SHA-256 digest, as lowercase hex.
pub fn hash_bytes(bytes: &[u8]) -> String {
	let digest = Sha256::digest(bytes);
	hex::encode(&digest[..16])
}

/// Whether a client running `client` must reload to pick up `current`.
///
/// A missing or empty client version never counts as stale.
///
/// # Examples
///
/// ```
/// use reinhardt_inertia::version::is_stale;
///
/// assert!(is_stale(Some("v1"), "v2"));
/// assert!(!is_stale(Some("v2"), "v2"));
/// assert!(!is_stale(Some(""), "v2"));
/// assert!(!is_stale(None, "v2"));
/// ```
pub fn is_stale(client: Option<&str>, current: &str) -> bool {
	client.is_some_and(|client| !client.is_empty() && client != current)
}
