use std::path::{Path, PathBuf};

/// Bundle locations probed after the configured one, relative to the
/// project root.
pub const DEFAULT_BUNDLE_PATHS: [&str; 2] = ["ssr/inertia.ssr.mjs", "ssr/inertia.ssr.js"];

/// Locates the SSR bundle on disk.
///
/// # Examples
///
/// ```
/// use reinhardt_inertia_ssr::BundleDetector;
///
/// let root = tempfile::tempdir().unwrap();
/// let detector = BundleDetector::new(root.path());
/// assert_eq!(detector.detect(), None);
///
/// std::fs::create_dir(root.path().join("ssr")).unwrap();
/// std::fs::write(root.path().join("ssr/inertia.ssr.js"), "").unwrap();
/// assert_eq!(detector.detect(), Some(root.path().join("ssr/inertia.ssr.js")));
/// ```
#[derive(Debug, Clone)]
pub struct BundleDetector {
	root: PathBuf,
	configured: Option<PathBuf>,
}

impl BundleDetector {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self {
			root: root.into(),
			configured: None,
		}
	}

	/// Probes `bundle` before the default locations. Relative paths are
	/// resolved against the root.
	pub fn with_bundle(mut self, bundle: Option<impl Into<PathBuf>>) -> Self {
		self.configured = bundle.map(Into::into);
		self
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Returns the first candidate that exists.
	pub fn detect(&self) -> Option<PathBuf> {
		self.configured
			.iter()
			.map(|path| self.root.join(path))
			.chain(DEFAULT_BUNDLE_PATHS.iter().map(|path| self.root.join(path)))
			.find(|path| path.is_file())
	}
}
