//! Page component existence checking.

use parking_lot::Mutex;
use reinhardt_inertia_conf::PageConfig;
use std::collections::HashMap;
use std::path::{MAIN_SEPARATOR, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

/// Looks up page component files under the configured paths.
///
/// Lookups are cached per component name, including misses, for the
/// lifetime of the finder.
///
/// # Examples
///
/// ```
/// use reinhardt_inertia::ComponentFinder;
/// use reinhardt_inertia_conf::PageConfig;
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::create_dir_all(dir.path().join("Users")).unwrap();
/// std::fs::write(dir.path().join("Users/Index.vue"), "").unwrap();
///
/// let finder = ComponentFinder::new(PageConfig::checked([dir.path()]));
///
/// assert!(finder.ensure_exists("Users/Index").is_ok());
/// assert!(finder.ensure_exists("Users/Missing").is_err());
/// ```
#[derive(Debug)]
pub struct ComponentFinder {
	config: PageConfig,
	cache: Mutex<HashMap<String, bool>>,
}

impl ComponentFinder {
	pub fn new(config: PageConfig) -> Self {
		Self {
			config,
			cache: Mutex::new(HashMap::new()),
		}
	}

	pub fn config(&self) -> &PageConfig {
		&self.config
	}

	/// First file matching `component`, trying every path with every
	/// extension. Not cached.
	pub fn find(&self, component: &str) -> Option<PathBuf> {
		let relative = component.replace('/', &MAIN_SEPARATOR.to_string());

		self.config.page_paths.iter().find_map(|base| {
			self.config.page_extensions.iter().find_map(|extension| {
				let extension = extension.trim_start_matches('.');
				let candidate = base.join(format!("{relative}.{extension}"));
				candidate.is_file().then_some(candidate)
			})
		})
	}

	/// Fails with [`Error::ComponentNotFound`] when no file matches.
	pub fn ensure_exists(&self, component: &str) -> Result<()> {
		let cached = self.cache.lock().get(component).copied();
		let exists = match cached {
			Some(exists) => exists,
			None => {
				let found = self.find(component);
				debug!(component, found = ?found, "Looked up Inertia page component");
				let exists = found.is_some();
				self.cache.lock().insert(component.to_string(), exists);
				exists
			}
		};

		if exists {
			Ok(())
		} else {
			Err(Error::ComponentNotFound {
				component: component.to_string(),
				searched_paths: self.config.page_paths.clone(),
			})
		}
	}

	/// Forgets every cached lookup.
	pub fn clear_cache(&self) {
		self.cache.lock().clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use tempfile::TempDir;

	#[fixture]
	fn pages() -> TempDir {
		let dir = TempDir::new().unwrap();
		std::fs::create_dir_all(dir.path().join("Users")).unwrap();
		std::fs::write(dir.path().join("Users/Index.tsx"), "export default {}").unwrap();
		std::fs::write(dir.path().join("Home.svelte"), "").unwrap();
		dir
	}

	#[rstest]
	#[case("Users/Index", true)]
	#[case("Home", true)]
	#[case("Users/Edit", false)]
	#[case("Index", false)]
	fn test_find(pages: TempDir, #[case] component: &str, #[case] found: bool) {
		let finder = ComponentFinder::new(PageConfig::checked([pages.path()]));

		assert_eq!(finder.find(component).is_some(), found);
	}

	#[rstest]
	fn test_extensions_accept_leading_dot(pages: TempDir) {
		let finder = ComponentFinder::new(PageConfig::checked([pages.path()]).with_extensions([".tsx"]));

		assert_eq!(finder.find("Users/Index"), Some(pages.path().join("Users").join("Index.tsx")));
		assert!(finder.find("Home").is_none());
	}

	#[rstest]
	fn test_later_paths_are_searched(pages: TempDir) {
		let empty = TempDir::new().unwrap();
		let finder = ComponentFinder::new(PageConfig::checked([empty.path(), pages.path()]));

		assert!(finder.ensure_exists("Home").is_ok());
	}

	#[rstest]
	fn test_missing_component_reports_searched_paths(pages: TempDir) {
		let finder = ComponentFinder::new(PageConfig::checked([pages.path()]));

		let error = finder.ensure_exists("Missing").unwrap_err();

		match error {
			Error::ComponentNotFound { component, searched_paths } => {
				assert_eq!(component, "Missing");
				assert_eq!(searched_paths, vec![pages.path().to_path_buf()]);
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[rstest]
	fn test_results_are_cached_until_cleared(pages: TempDir) {
		let finder = ComponentFinder::new(PageConfig::checked([pages.path()]));
		assert!(finder.ensure_exists("Late").is_err());

		std::fs::write(pages.path().join("Late.vue"), "").unwrap();
		assert!(finder.ensure_exists("Late").is_err());

		finder.clear_cache();
		assert!(finder.ensure_exists("Late").is_ok());

		std::fs::remove_file(pages.path().join("Late.vue")).unwrap();
		assert!(finder.ensure_exists("Late").is_ok());
	}
}
