//! Command and response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::command_table::{CommandInfo, PathError};

const SESSION_ID: &str = "sessionId";

/// A named protocol command with its parameters.
///
/// Parameters double as path parameters: every `:name` placeholder of the
/// command's template is filled from the parameter of the same name, and
/// `:sessionId` falls back to [`session_id`](Self::session_id).
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
	pub name: String,
	pub session_id: Option<String>,
	pub parameters: Map<String, Value>,
}

impl Command {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			session_id: None,
			parameters: Map::new(),
		}
	}

	pub fn session(mut self, session_id: impl Into<String>) -> Self {
		self.session_id = Some(session_id.into());
		self
	}

	pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.parameters.insert(key.into(), value.into());
		self
	}

	pub fn is(&self, name: &str) -> bool {
		self.name == name
	}

	/// Resolves the request path and body for `info`.
	///
	/// The body holds the parameters not consumed by a path placeholder.
	pub fn to_request(&self, info: &CommandInfo) -> Result<(String, Map<String, Value>), PathError> {
		let mut params = self.parameters.clone();
		if let Some(session_id) = &self.session_id {
			params
				.entry(SESSION_ID)
				.or_insert_with(|| Value::String(session_id.clone()));
		}

		let path = info.resolve_path(&params)?;
		for placeholder in info.placeholders() {
			params.remove(placeholder);
		}
		Ok((path, params))
	}
}

/// JSON wire protocol response envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
	/// `0` on success, a JSON wire error code otherwise.
	#[serde(default)]
	pub status: i64,
	#[serde(default)]
	pub value: Value,
}

impl Response {
	pub fn is_success(&self) -> bool {
		self.status == 0
	}

	/// Error message carried in `value.message`, if any.
	pub fn error_message(&self) -> Option<&str> {
		self.value.get("message").and_then(Value::as_str)
	}
}
