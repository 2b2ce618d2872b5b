//! Shared session handle used by the driver and its elements.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;
use winium_protocol::{Command, Response};
use winium_runtime::{CommandExecutor, Error, Result};

/// Message used when a failed response carries no `value.message`.
const UNKNOWN_ERROR_MESSAGE: &str = "An unknown server-side error occurred";

/// A live session: its id and the executor that reaches the driver.
///
/// Cloned into every [`Element`](crate::Element); commands from all clones are
/// serialized through one executor.
#[derive(Clone)]
pub(crate) struct Session {
	inner: Arc<SessionInner>,
}

struct SessionInner {
	id: String,
	executor: Mutex<CommandExecutor>,
}

impl Session {
	pub(crate) fn new(id: String, executor: CommandExecutor) -> Self {
		Self {
			inner: Arc::new(SessionInner {
				id,
				executor: Mutex::new(executor),
			}),
		}
	}

	pub(crate) fn id(&self) -> &str {
		&self.inner.id
	}

	/// Sends `command` within this session and returns the response value.
	pub(crate) async fn send(&self, command: Command) -> Result<Value> {
		let command = command.session(self.inner.id.clone());
		debug!(target = "winium", session = %self.inner.id, command = %command.name, "sending command");
		let response = self.inner.executor.lock().await.execute(&command).await?;
		into_value(response)
	}

	/// Like [`send`](Self::send), deserializing the value into `T`.
	pub(crate) async fn send_as<T: DeserializeOwned>(&self, command: Command) -> Result<T> {
		let value = self.send(command).await?;
		Ok(serde_json::from_value(value)?)
	}

	/// Sends `command`, discarding the value.
	pub(crate) async fn send_no_result(&self, command: Command) -> Result<()> {
		self.send(command).await.map(|_| ())
	}
}

/// Unwraps a response, turning a non-zero status into [`Error::Remote`].
pub(crate) fn into_value(response: Response) -> Result<Value> {
	if response.is_success() {
		return Ok(response.value);
	}
	Err(Error::Remote {
		status: response.status,
		message: response.error_message().unwrap_or(UNKNOWN_ERROR_MESSAGE).to_string(),
	})
}
