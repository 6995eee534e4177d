//! Session-storage boundary.
//!
//! The Inertia layer only needs a handful of operations from a session
//! backend: read a value, write a value, forget a key and keep the current
//! flash data alive for one more request. [`MemorySession`] implements
//! them in memory for tests and single-process setups.

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Operations the Inertia layer performs against session storage.
pub trait Session: Send + Sync {
	/// Returns the value stored under `key`.
	fn get(&self, key: &str) -> Option<Value>;

	/// Stores `value` under `key`, replacing any previous value.
	fn put(&self, key: &str, value: Value);

	/// Removes `key`.
	fn forget(&self, key: &str);

	/// Stores `value` under `key` for the next request only.
	fn flash(&self, key: &str, value: Value);

	/// Keeps the current flash data for one more request.
	fn reflash(&self);
}

/// Cloneable, type-erased handle to a [`Session`], stored in request
/// extensions.
#[derive(Clone)]
pub struct SessionHandle(Arc<dyn Session>);

impl SessionHandle {
	pub fn new(session: Arc<dyn Session>) -> Self {
		Self(session)
	}
}

impl Deref for SessionHandle {
	type Target = dyn Session;

	fn deref(&self) -> &Self::Target {
		self.0.as_ref()
	}
}

impl fmt::Debug for SessionHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SessionHandle").finish_non_exhaustive()
	}
}

#[derive(Debug, Default)]
struct SessionData {
	values: IndexMap<String, Value>,
	// Keys flashed during the current request
	new_flash: HashSet<String>,
	// Keys flashed by the previous request, dropped by `age_flash_data`
	old_flash: HashSet<String>,
}

/// In-memory session storage.
///
/// # Examples
///
/// ```
/// use reinhardt_inertia_http::{MemorySession, Session};
/// use serde_json::json;
///
/// let session = MemorySession::new();
/// session.flash("status", json!("saved"));
/// session.age_flash_data();
/// assert_eq!(session.get("status"), Some(json!("saved")));
///
/// session.age_flash_data();
/// assert_eq!(session.get("status"), None);
/// ```
#[derive(Debug, Default)]
pub struct MemorySession {
	data: Mutex<SessionData>,
}

impl MemorySession {
	pub fn new() -> Self {
		Self::default()
	}

	/// Ends a request cycle: values flashed two cycles ago are removed and
	/// values flashed during this cycle become eligible for removal.
	pub fn age_flash_data(&self) {
		let mut data = self.data.lock();
		let expired: Vec<String> = data.old_flash.drain().collect();
		for key in expired {
			data.values.shift_remove(&key);
		}
		data.old_flash = std::mem::take(&mut data.new_flash);
	}

	/// Returns true if `key` is currently scheduled to survive the next
	/// [`MemorySession::age_flash_data`] call as flash data.
	pub fn is_flashed(&self, key: &str) -> bool {
		self.data.lock().new_flash.contains(key)
	}
}

impl Session for MemorySession {
	fn get(&self, key: &str) -> Option<Value> {
		self.data.lock().values.get(key).cloned()
	}

	fn put(&self, key: &str, value: Value) {
		let mut data = self.data.lock();
		data.values.insert(key.to_string(), value);
		data.old_flash.remove(key);
	}

	fn forget(&self, key: &str) {
		let mut data = self.data.lock();
		data.values.shift_remove(key);
		data.new_flash.remove(key);
		data.old_flash.remove(key);
	}

	fn flash(&self, key: &str, value: Value) {
		let mut data = self.data.lock();
		data.values.insert(key.to_string(), value);
		data.old_flash.remove(key);
		data.new_flash.insert(key.to_string());
	}

	fn reflash(&self) {
		let mut data = self.data.lock();
		let old: Vec<String> = data.old_flash.drain().collect();
		data.new_flash.extend(old);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_put_get_forget() {
		let session = MemorySession::new();
		assert_eq!(session.get("missing"), None);

		session.put("count", json!(1));
		assert_eq!(session.get("count"), Some(json!(1)));

		session.forget("count");
		assert_eq!(session.get("count"), None);
	}

	#[rstest]
	fn test_put_survives_aging() {
		let session = MemorySession::new();
		session.put("user", json!("ada"));

		session.age_flash_data();
		session.age_flash_data();

		assert_eq!(session.get("user"), Some(json!("ada")));
	}

	#[rstest]
	fn test_reflash_keeps_flash_for_another_request() {
		let session = MemorySession::new();
		session.flash("status", json!("saved"));
		session.age_flash_data();
		assert!(!session.is_flashed("status"));

		session.reflash();
		assert!(session.is_flashed("status"));

		session.age_flash_data();
		assert_eq!(session.get("status"), Some(json!("saved")));

		session.age_flash_data();
		assert_eq!(session.get("status"), None);
	}

	#[rstest]
	fn test_handle_derefs_to_session() {
		let handle = SessionHandle::new(Arc::new(MemorySession::new()));
		let cloned = handle.clone();

		handle.put("key", json!("value"));
		assert_eq!(cloned.get("key"), Some(json!("value")));
	}
}
