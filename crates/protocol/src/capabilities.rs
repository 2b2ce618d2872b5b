//! The capability payload sent when a session is created.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key-sorted map of capability names to JSON values.
///
/// Serializes as a plain JSON object. Keys are kept in sorted order so the
/// payload is deterministic across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities(Map<String, Value>);

impl Capabilities {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a capability, replacing any previous value for `key`.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
		self.0.insert(key.into(), value.into());
	}

	/// Inserts `value` only when it is `Some`.
	pub fn insert_opt<V: Into<Value>>(&mut self, key: &str, value: Option<V>) {
		if let Some(value) = value {
			self.insert(key, value);
		}
	}

	/// Inserts a string only when it is `Some` and non-empty.
	pub fn insert_non_empty(&mut self, key: &str, value: Option<&str>) {
		if let Some(value) = value.filter(|v| !v.is_empty()) {
			self.insert(key, value);
		}
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn into_value(self) -> Value {
		Value::Object(self.0)
	}
}

impl From<Map<String, Value>> for Capabilities {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}
