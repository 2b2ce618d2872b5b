//! [`WiniumDriver`], the entry point for a Winium session.

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use serde_json::Value;
use tracing::{info, warn};
use url::Url;
use winium_protocol::{Capabilities, Command, DriverOptions, WiniumOptions, names};
use winium_runtime::{CommandExecutor, DriverService, Error, Result, ServiceHandle};

use crate::session::{Session, into_value};
use crate::{By, Element};

/// A session on a Winium driver.
///
/// The session is created when the driver is constructed. Commands are sent
/// one at a time; clones of the elements it returns share the same session.
///
/// # Example
///
/// ```ignore
/// use winium::{By, DesktopOptions, WiniumDriver};
///
/// let options = DesktopOptions::new().application_path("C:/Windows/System32/notepad.exe");
/// let driver = WiniumDriver::new(options).await?;
/// driver.find_element(By::class_name("Edit")).await?.send_keys("hello").await?;
/// driver.quit().await?;
/// ```
pub struct WiniumDriver {
	session: Session,
	capabilities: Capabilities,
}

impl std::fmt::Debug for WiniumDriver {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WiniumDriver")
			.field("session_id", &self.session.id())
			.field("capabilities", &self.capabilities)
			.finish()
	}
}

impl WiniumDriver {
	/// Launches the default driver service for the options' variant and
	/// creates a session on it.
	///
	/// # Errors
	///
	/// Returns a configuration error if the driver executable cannot be
	/// resolved, [`Error::StartupTimeout`] if the driver never becomes
	/// reachable, and [`Error::Remote`] if the driver rejects the session.
	pub async fn new(options: impl Into<DriverOptions>) -> Result<Self> {
		let options = options.into();
		let service = DriverService::for_variant(options.variant())?;
		Self::with_service(service, options).await
	}

	/// Like [`WiniumDriver::new`], with a per-command timeout in place of
	/// [`DEFAULT_COMMAND_TIMEOUT`](crate::DEFAULT_COMMAND_TIMEOUT).
	pub async fn new_with_timeout(options: impl Into<DriverOptions>, command_timeout: Duration) -> Result<Self> {
		let options = options.into();
		let service = DriverService::for_variant(options.variant())?;
		Self::with_service_and_timeout(service, options, command_timeout).await
	}

	/// Creates a session on a caller-configured service.
	pub async fn with_service(
		service: impl ServiceHandle + 'static,
		options: impl Into<DriverOptions>,
	) -> Result<Self> {
		let executor = CommandExecutor::with_service(Box::new(service))?;
		Self::with_executor(executor, options).await
	}

	pub async fn with_service_and_timeout(
		service: impl ServiceHandle + 'static,
		options: impl Into<DriverOptions>,
		command_timeout: Duration,
	) -> Result<Self> {
		let executor = CommandExecutor::with_service(Box::new(service))?.command_timeout(command_timeout)?;
		Self::with_executor(executor, options).await
	}

	/// Creates a session on an already-running server at `url`.
	pub async fn remote(url: Url, options: impl Into<DriverOptions>) -> Result<Self> {
		let executor = CommandExecutor::remote(url)?;
		Self::with_executor(executor, options).await
	}

	pub async fn remote_with_timeout(
		url: Url,
		options: impl Into<DriverOptions>,
		command_timeout: Duration,
	) -> Result<Self> {
		let executor = CommandExecutor::remote(url)?.command_timeout(command_timeout)?;
		Self::with_executor(executor, options).await
	}

	/// Creates a session through a fully configured executor.
	pub async fn with_executor(executor: CommandExecutor, options: impl Into<DriverOptions>) -> Result<Self> {
		Self::start_session(executor, options.into()).await
	}

	async fn start_session(mut executor: CommandExecutor, options: DriverOptions) -> Result<Self> {
		let desired = options.to_capabilities();
		let command = Command::new(names::NEW_SESSION).param("desiredCapabilities", desired.into_value());

		let response = match executor.execute(&command).await {
			Ok(response) => response,
			Err(e) => return Err(abandon(executor, e).await),
		};
		let session_id = response.session_id.clone();
		let value = match into_value(response) {
			Ok(value) => value,
			Err(e) => return Err(abandon(executor, e).await),
		};
		let Some(session_id) = session_id else {
			let e = Error::Protocol("new session response carried no sessionId".into());
			return Err(abandon(executor, e).await);
		};

		let capabilities = match value {
			Value::Object(map) => Capabilities::from(map),
			_ => Capabilities::new(),
		};
		info!(
			target = "winium",
			session = %session_id,
			variant = %options.variant(),
			url = %executor.url(),
			"session created"
		);

		Ok(Self {
			session: Session::new(session_id, executor),
			capabilities,
		})
	}

	pub(crate) fn session(&self) -> &Session {
		&self.session
	}

	pub fn session_id(&self) -> &str {
		self.session.id()
	}

	/// Capabilities reported by the driver when the session was created.
	pub fn capabilities(&self) -> &Capabilities {
		&self.capabilities
	}

	/// First element in the application matching `by`.
	pub async fn find_element(&self, by: By) -> Result<Element> {
		let mut command = Command::new(names::FIND_ELEMENT);
		command.parameters.extend(by.to_params());
		let value = self.session.send(command).await?;
		Element::from_value(&self.session, &value)
	}

	pub async fn find_elements(&self, by: By) -> Result<Vec<Element>> {
		let mut command = Command::new(names::FIND_ELEMENTS);
		command.parameters.extend(by.to_params());
		let value = self.session.send(command).await?;
		Element::from_values(&self.session, &value)
	}

	/// Types `text` into whichever element has focus.
	pub async fn send_keys(&self, text: &str) -> Result<()> {
		let command = Command::new(names::SEND_KEYS_TO_ACTIVE_ELEMENT)
			.param("value", Value::Array(vec![Value::from(text)]));
		self.session.send_no_result(command).await
	}

	/// Title of the current window.
	pub async fn title(&self) -> Result<String> {
		self.session.send_as(Command::new(names::GET_TITLE)).await
	}

	/// UI Automation tree of the current window as XML.
	pub async fn page_source(&self) -> Result<String> {
		self.session.send_as(Command::new(names::GET_PAGE_SOURCE)).await
	}

	/// Captures the screen and returns PNG bytes.
	pub async fn screenshot(&self) -> Result<Vec<u8>> {
		let encoded: String = self.session.send_as(Command::new(names::SCREENSHOT)).await?;
		base64::prelude::BASE64_STANDARD
			.decode(encoded.trim())
			.map_err(|e| Error::Protocol(format!("decode screenshot: {e}")))
	}

	/// Captures the screen, writes the PNG to `path`, and returns the bytes.
	pub async fn screenshot_to_file(&self, path: &Path) -> Result<Vec<u8>> {
		let bytes = self.screenshot().await?;
		tokio::fs::write(path, &bytes).await?;
		Ok(bytes)
	}

	pub async fn window_handle(&self) -> Result<String> {
		self.session.send_as(Command::new(names::GET_CURRENT_WINDOW_HANDLE)).await
	}

	pub async fn window_handles(&self) -> Result<Vec<String>> {
		self.session.send_as(Command::new(names::GET_WINDOW_HANDLES)).await
	}

	pub async fn switch_to_window(&self, handle: &str) -> Result<()> {
		let command = Command::new(names::SWITCH_TO_WINDOW).param("name", handle);
		self.session.send_no_result(command).await
	}

	/// Closes the current window. The session stays open.
	pub async fn close(&self) -> Result<()> {
		self.session.send_no_result(Command::new(names::CLOSE)).await
	}

	/// Sends any table command within this session and returns its value.
	///
	/// Path placeholders other than `:sessionId` are filled from `command`'s
	/// parameters.
	pub async fn execute(&self, command: Command) -> Result<Value> {
		self.session.send(command).await
	}

	/// Ends the session. A supervised driver service is stopped even if the
	/// driver rejects the request.
	pub async fn quit(self) -> Result<()> {
		let result = self.session.send_no_result(Command::new(names::QUIT)).await;
		info!(target = "winium", session = %self.session.id(), "session ended");
		result
	}
}

/// Stops the service of a session that never got established.
async fn abandon(mut executor: CommandExecutor, err: Error) -> Error {
	if let Err(stop_err) = executor.shutdown().await {
		warn!(target = "winium", error = %stop_err, "failed to stop driver service after session error");
	}
	err
}
