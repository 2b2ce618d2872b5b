//! Command dispatch over HTTP.
//!
//! [`CommandExecutor`] resolves a [`Command`] against the command table and
//! sends it to the driver. When bound to a supervised service it also owns the
//! service lifecycle around the session: `newSession` starts the service on
//! demand, and `quit` always stops it afterwards, whatever the outcome.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;
use winium_protocol::{Command, CommandInfo, CommandTable, HttpMethod, Response, names};

use crate::error::{Error, Result};
use crate::service::{ServiceHandle, endpoint};

/// JSON wire status for an error response that carries no status of its own.
const UNKNOWN_ERROR: i64 = 13;

/// Upper bound on one command round trip unless overridden.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

enum Binding {
	Service(Box<dyn ServiceHandle>),
	Remote(Url),
}

/// Sends commands to one driver server.
pub struct CommandExecutor {
	binding: Binding,
	table: Cow<'static, CommandTable>,
	http: reqwest::Client,
	command_timeout: Duration,
}

impl std::fmt::Debug for CommandExecutor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CommandExecutor")
			.field("url", &self.url().as_str())
			.field("managed", &self.is_managed())
			.field("command_timeout", &self.command_timeout)
			.finish()
	}
}

impl CommandExecutor {
	/// Executor that starts and stops `service` around the session.
	pub fn with_service(service: Box<dyn ServiceHandle>) -> Result<Self> {
		Self::bind(Binding::Service(service))
	}

	/// Executor for an already-running server it does not manage.
	pub fn remote(url: Url) -> Result<Self> {
		Self::bind(Binding::Remote(url))
	}

	fn bind(binding: Binding) -> Result<Self> {
		Ok(Self {
			binding,
			table: Cow::Borrowed(CommandTable::global()),
			http: http_client(DEFAULT_COMMAND_TIMEOUT)?,
			command_timeout: DEFAULT_COMMAND_TIMEOUT,
		})
	}

	/// Replaces the per-command timeout ([`DEFAULT_COMMAND_TIMEOUT`]).
	///
	/// A command that outlives it fails with a transport error for which
	/// [`Error::is_timeout`] is true.
	pub fn command_timeout(mut self, timeout: Duration) -> Result<Self> {
		self.http = http_client(timeout)?;
		self.command_timeout = timeout;
		Ok(self)
	}

	pub fn timeout(&self) -> Duration {
		self.command_timeout
	}

	/// Replaces the command table.
	pub fn with_table(mut self, table: CommandTable) -> Self {
		self.table = Cow::Owned(table);
		self
	}

	pub fn url(&self) -> &Url {
		match &self.binding {
			Binding::Service(service) => service.url(),
			Binding::Remote(url) => url,
		}
	}

	/// Whether a supervised service is bound.
	pub fn is_managed(&self) -> bool {
		matches!(self.binding, Binding::Service(_))
	}

	/// Executes `command` and returns the decoded response.
	///
	/// A connection refused while the bound service is not running is reported
	/// as [`Error::DriverDied`]. For `quit` the bound service is stopped after
	/// the request on every path; a failed stop is logged and does not replace
	/// the command result.
	pub async fn execute(&mut self, command: &Command) -> Result<Response> {
		if command.is(names::NEW_SESSION) {
			if let Binding::Service(service) = &mut self.binding {
				service.start().await?;
			}
		}

		let result = match self.dispatch(command).await {
			Ok(response) => Ok(response),
			Err(err) => Err(self.classify(err)),
		};

		if command.is(names::QUIT) {
			if let Binding::Service(service) = &mut self.binding {
				if let Err(e) = service.stop().await {
					warn!(target = "winium", error = %e, "failed to stop driver service after quit");
				}
			}
		}

		result
	}

	/// Stops the bound service, if any, without sending a command.
	///
	/// Used when a session cannot be established after the service started.
	pub async fn shutdown(&mut self) -> Result<()> {
		match &mut self.binding {
			Binding::Service(service) => service.stop().await,
			Binding::Remote(_) => Ok(()),
		}
	}

	async fn dispatch(&self, command: &Command) -> Result<Response> {
		let info = self
			.table
			.get(&command.name)
			.ok_or_else(|| Error::UnknownCommand(command.name.clone()))?;
		let (path, body) = command.to_request(info).map_err(|source| Error::MalformedCommand {
			command: command.name.clone(),
			source,
		})?;
		let url = endpoint(self.url(), &path)?;

		debug!(
			target = "winium",
			command = %command.name,
			method = %info.method,
			%url,
			"dispatching command"
		);

		let response = self.request(info, url, body).send().await?;
		let status = response.status();
		let text = response.text().await?;
		debug!(target = "winium", command = %command.name, status = status.as_u16(), "received response");

		decode(status, &text)
	}

	fn request(&self, info: &CommandInfo, url: Url, body: Map<String, Value>) -> reqwest::RequestBuilder {
		match info.method {
			HttpMethod::Get => self.http.get(url),
			HttpMethod::Post => self.http.post(url).json(&body),
			HttpMethod::Delete => self.http.delete(url),
		}
	}

	fn classify(&mut self, err: Error) -> Error {
		if !is_connection_refused(&err) {
			return err;
		}
		let running = match &mut self.binding {
			Binding::Service(service) => service.is_running(),
			Binding::Remote(_) => false,
		};
		if running {
			err
		} else {
			warn!(target = "winium", error = %err, "connection refused; driver server is not running");
			Error::DriverDied(Box::new(err))
		}
	}
}

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
	Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Decodes a driver reply into a [`Response`].
///
/// Error statuses with a JSON envelope body still decode; an envelope without
/// its own status gets the generic unknown-error code.
fn decode(status: reqwest::StatusCode, text: &str) -> Result<Response> {
	if text.trim().is_empty() {
		if status.is_success() {
			return Ok(Response::default());
		}
		return Err(Error::Http {
			status: status.as_u16(),
			body: String::new(),
		});
	}

	match serde_json::from_str::<Response>(text) {
		Ok(mut response) => {
			if !status.is_success() && response.status == 0 {
				response.status = UNKNOWN_ERROR;
			}
			Ok(response)
		}
		Err(_) if !status.is_success() => Err(Error::Http {
			status: status.as_u16(),
			body: text.to_string(),
		}),
		Err(e) => Err(Error::Json(e)),
	}
}

/// Whether the root cause of `err` is a refused TCP connection.
///
/// The deepest [`io::Error`] in the source chain decides by its kind. Only when
/// the chain has no `io::Error` at all is the innermost message checked for
/// "connection refused".
pub fn is_connection_refused(err: &(dyn StdError + 'static)) -> bool {
	let mut innermost = err;
	let mut deepest_io = None;
	let mut current = Some(err);
	while let Some(e) = current {
		if let Some(io_err) = e.downcast_ref::<io::Error>() {
			deepest_io = Some(io_err);
		}
		innermost = e;
		current = e.source();
	}

	match deepest_io {
		Some(io_err) => io_err.kind() == io::ErrorKind::ConnectionRefused,
		None => innermost.to_string().to_ascii_lowercase().contains("connection refused"),
	}
}

#[cfg(test)]
mod tests {
	use std::fmt;
	use std::sync::Arc;
	use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

	use async_trait::async_trait;
	use serde_json::json;

	use super::*;
	use crate::testing::StubDriver;

	#[derive(Clone, Default)]
	struct Counters {
		starts: Arc<AtomicUsize>,
		stops: Arc<AtomicUsize>,
		running: Arc<AtomicBool>,
	}

	struct FakeService {
		url: Url,
		counters: Counters,
		fail_stop: bool,
	}

	impl FakeService {
		fn boxed(url: Url, counters: &Counters) -> Box<dyn ServiceHandle> {
			Box::new(Self {
				url,
				counters: counters.clone(),
				fail_stop: false,
			})
		}
	}

	#[async_trait]
	impl ServiceHandle for FakeService {
		async fn start(&mut self) -> Result<()> {
			self.counters.starts.fetch_add(1, Ordering::SeqCst);
			self.counters.running.store(true, Ordering::SeqCst);
			Ok(())
		}

		async fn stop(&mut self) -> Result<()> {
			self.counters.stops.fetch_add(1, Ordering::SeqCst);
			self.counters.running.store(false, Ordering::SeqCst);
			if self.fail_stop {
				return Err(Error::LaunchFailed("stop failed".into()));
			}
			Ok(())
		}

		fn is_running(&mut self) -> bool {
			self.counters.running.load(Ordering::SeqCst)
		}

		fn url(&self) -> &Url {
			&self.url
		}
	}

	fn refused_url() -> Url {
		let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
		let port = listener.local_addr().unwrap().port();
		drop(listener);
		Url::parse(&format!("http://127.0.0.1:{port}")).unwrap()
	}

	fn new_session() -> Command {
		Command::new(names::NEW_SESSION).param("desiredCapabilities", json!({"app": "C:/app.exe"}))
	}

	#[tokio::test]
	async fn new_session_starts_service_first() {
		let stub = StubDriver::spawn().await;
		let counters = Counters::default();
		let mut executor = CommandExecutor::with_service(FakeService::boxed(stub.url(), &counters)).unwrap();

		let response = executor.execute(&new_session()).await.unwrap();
		assert_eq!(response.session_id.as_deref(), Some("stub-session"));
		assert_eq!(counters.starts.load(Ordering::SeqCst), 1);

		let requests = stub.commands();
		assert_eq!(requests.len(), 1);
		assert_eq!(requests[0].method, "POST");
		assert_eq!(requests[0].path, "/session");
		assert_eq!(requests[0].body, Some(json!({"desiredCapabilities": {"app": "C:/app.exe"}})));
	}

	#[tokio::test]
	async fn other_commands_do_not_start_service() {
		let stub = StubDriver::spawn().await;
		let counters = Counters::default();
		let mut executor = CommandExecutor::with_service(FakeService::boxed(stub.url(), &counters)).unwrap();

		executor
			.execute(&Command::new(names::GET_TITLE).session("s1"))
			.await
			.unwrap();
		assert_eq!(counters.starts.load(Ordering::SeqCst), 0);
		assert_eq!(stub.commands()[0].path, "/session/s1/title");
	}

	#[tokio::test]
	async fn quit_stops_service_once_on_success() {
		let stub = StubDriver::spawn().await;
		let counters = Counters::default();
		let mut executor = CommandExecutor::with_service(FakeService::boxed(stub.url(), &counters)).unwrap();

		executor.execute(&Command::new(names::QUIT).session("s1")).await.unwrap();
		assert_eq!(counters.stops.load(Ordering::SeqCst), 1);

		let requests = stub.commands();
		assert_eq!(requests[0].method, "DELETE");
		assert_eq!(requests[0].path, "/session/s1");
	}

	#[tokio::test]
	async fn quit_stops_service_once_on_failure() {
		let stub = StubDriver::spawn().await;
		stub.reply("DELETE", "/session/s1", 500, "internal failure");
		let counters = Counters::default();
		let mut executor = CommandExecutor::with_service(FakeService::boxed(stub.url(), &counters)).unwrap();

		let err = executor
			.execute(&Command::new(names::QUIT).session("s1"))
			.await
			.unwrap_err();
		assert!(matches!(err, Error::Http { status: 500, .. }), "{err:?}");
		assert_eq!(counters.stops.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn quit_stops_service_when_connection_refused() {
		let counters = Counters::default();
		let mut executor = CommandExecutor::with_service(FakeService::boxed(refused_url(), &counters)).unwrap();

		let err = executor
			.execute(&Command::new(names::QUIT).session("s1"))
			.await
			.unwrap_err();
		assert!(err.is_driver_died(), "{err:?}");
		assert_eq!(counters.stops.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn failed_stop_does_not_mask_quit_result() {
		let stub = StubDriver::spawn().await;
		let counters = Counters::default();
		let service = Box::new(FakeService {
			url: stub.url(),
			counters: counters.clone(),
			fail_stop: true,
		});
		let mut executor = CommandExecutor::with_service(service).unwrap();

		let response = executor.execute(&Command::new(names::QUIT).session("s1")).await.unwrap();
		assert!(response.is_success());
		assert_eq!(counters.stops.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn shutdown_stops_bound_service_only() {
		let counters = Counters::default();
		let mut executor = CommandExecutor::with_service(FakeService::boxed(refused_url(), &counters)).unwrap();
		executor.shutdown().await.unwrap();
		assert_eq!(counters.stops.load(Ordering::SeqCst), 1);

		let mut remote = CommandExecutor::remote(refused_url()).unwrap();
		remote.shutdown().await.unwrap();
	}

	#[tokio::test]
	async fn refused_while_not_running_is_driver_died() {
		let counters = Counters::default();
		let mut executor = CommandExecutor::with_service(FakeService::boxed(refused_url(), &counters)).unwrap();

		let err = executor
			.execute(&Command::new(names::GET_TITLE).session("s1"))
			.await
			.unwrap_err();
		assert!(err.is_driver_died(), "{err:?}");
		assert_eq!(err.to_string(), "The driver server has unexpectedly died!");

		let cause = err.source().unwrap();
		assert!(cause.to_string().starts_with("Transport error"), "{cause}");
		assert!(is_connection_refused(cause));
	}

	#[tokio::test]
	async fn refused_while_running_is_propagated_untouched() {
		let counters = Counters::default();
		counters.running.store(true, Ordering::SeqCst);
		let mut executor = CommandExecutor::with_service(FakeService::boxed(refused_url(), &counters)).unwrap();

		let err = executor
			.execute(&Command::new(names::GET_TITLE).session("s1"))
			.await
			.unwrap_err();
		assert!(matches!(err, Error::Transport(_)), "{err:?}");
	}

	#[tokio::test]
	async fn refused_on_remote_binding_is_driver_died() {
		let mut executor = CommandExecutor::remote(refused_url()).unwrap();
		let err = executor.execute(&new_session()).await.unwrap_err();
		assert!(err.is_driver_died(), "{err:?}");
	}

	#[tokio::test]
	async fn error_status_with_envelope_still_decodes() {
		let stub = StubDriver::spawn().await;
		stub.reply(
			"POST",
			"/session/s1/element",
			404,
			json!({"sessionId": "s1", "status": 7, "value": {"message": "no such element"}}).to_string(),
		);
		let mut executor = CommandExecutor::remote(stub.url()).unwrap();

		let response = executor
			.execute(
				&Command::new(names::FIND_ELEMENT)
					.session("s1")
					.param("using", "id")
					.param("value", "missing"),
			)
			.await
			.unwrap();
		assert_eq!(response.status, 7);
		assert_eq!(response.error_message(), Some("no such element"));
	}

	#[tokio::test]
	async fn hung_driver_fails_after_command_timeout() {
		let app = axum::Router::new().fallback(|| async {
			tokio::time::sleep(Duration::from_secs(30)).await;
			"{}"
		});
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let url = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
		let server = tokio::spawn(async move {
			axum::serve(listener, app).await.unwrap();
		});

		let mut executor = CommandExecutor::remote(url)
			.unwrap()
			.command_timeout(Duration::from_millis(200))
			.unwrap();
		assert_eq!(executor.timeout(), Duration::from_millis(200));

		let started = std::time::Instant::now();
		let err = executor
			.execute(&Command::new(names::GET_TITLE).session("s"))
			.await
			.unwrap_err();
		assert!(err.is_timeout(), "{err:?}");
		assert!(!err.is_driver_died());
		assert!(started.elapsed() < Duration::from_secs(5));
		server.abort();
	}

	#[test]
	fn default_command_timeout_applies() {
		let executor = CommandExecutor::remote(Url::parse("http://localhost:9999").unwrap()).unwrap();
		assert_eq!(executor.timeout(), DEFAULT_COMMAND_TIMEOUT);
	}

	#[tokio::test]
	async fn extension_command_resolves_all_placeholders() {
		let stub = StubDriver::spawn().await;
		let mut executor = CommandExecutor::remote(stub.url()).unwrap();

		executor
			.execute(
				&Command::new(names::FIND_DATA_GRID_CELL)
					.session("abc")
					.param("id", "42")
					.param("row", 2)
					.param("column", 3),
			)
			.await
			.unwrap();

		let requests = stub.commands();
		assert_eq!(requests[0].path, "/session/abc/element/42/datagrid/cell/2/3");
		assert_eq!(requests[0].body, Some(json!({})));
	}

	#[tokio::test]
	async fn menu_path_with_reserved_characters_reaches_driver_whole() {
		let stub = StubDriver::spawn().await;
		let mut executor = CommandExecutor::remote(stub.url()).unwrap();

		for path in ["Help$About?", "File$Recent#1"] {
			executor
				.execute(
					&Command::new(names::FIND_MENU_ITEM)
						.session("s")
						.param("id", "m")
						.param("path", path),
				)
				.await
				.unwrap();
		}

		let paths: Vec<String> = stub.commands().into_iter().map(|r| r.path).collect();
		assert_eq!(
			paths,
			vec![
				"/session/s/element/m/menu/item/Help$About%3F".to_string(),
				"/session/s/element/m/menu/item/File$Recent%231".to_string(),
			]
		);
	}

	#[tokio::test]
	async fn unknown_and_malformed_commands_fail_before_sending() {
		let stub = StubDriver::spawn().await;
		let mut executor = CommandExecutor::remote(stub.url()).unwrap();

		let err = executor.execute(&Command::new("frobnicate")).await.unwrap_err();
		assert!(matches!(err, Error::UnknownCommand(ref name) if name == "frobnicate"));

		let err = executor.execute(&Command::new(names::GET_TITLE)).await.unwrap_err();
		assert!(matches!(err, Error::MalformedCommand { .. }), "{err:?}");
		assert!(stub.commands().is_empty());
	}

	#[tokio::test]
	async fn custom_table_replaces_global() {
		let stub = StubDriver::spawn().await;
		let mut executor = CommandExecutor::remote(stub.url())
			.unwrap()
			.with_table(CommandTable::baseline());

		let err = executor
			.execute(&Command::new(names::EXPAND_COMBO_BOX).session("s").param("id", "e"))
			.await
			.unwrap_err();
		assert!(matches!(err, Error::UnknownCommand(_)));
	}

	#[derive(Debug)]
	struct Layer {
		message: &'static str,
		source: Option<Box<dyn StdError + 'static>>,
	}

	impl fmt::Display for Layer {
		fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
			f.write_str(self.message)
		}
	}

	impl StdError for Layer {
		fn source(&self) -> Option<&(dyn StdError + 'static)> {
			self.source.as_deref()
		}
	}

	#[test]
	fn classification_uses_innermost_cause() {
		let typed = Layer {
			message: "request failed",
			source: Some(Box::new(io::Error::new(io::ErrorKind::ConnectionRefused, "os error 111"))),
		};
		assert!(is_connection_refused(&typed));

		let reset = Layer {
			message: "request failed",
			source: Some(Box::new(io::Error::new(io::ErrorKind::ConnectionReset, "Connection refused"))),
		};
		assert!(!is_connection_refused(&reset));

		let untyped = Layer {
			message: "request failed",
			source: Some(Box::new(Layer {
				message: "connect: CONNECTION REFUSED by peer",
				source: None,
			})),
		};
		assert!(is_connection_refused(&untyped));

		let outer_only = Layer {
			message: "connection refused",
			source: Some(Box::new(Layer {
				message: "dns failure",
				source: None,
			})),
		};
		assert!(!is_connection_refused(&outer_only));
	}

	#[test]
	fn decode_handles_empty_and_non_json_bodies() {
		assert!(decode(reqwest::StatusCode::OK, "").unwrap().is_success());
		assert!(matches!(
			decode(reqwest::StatusCode::BAD_GATEWAY, "<html>"),
			Err(Error::Http { status: 502, .. })
		));
		assert!(matches!(decode(reqwest::StatusCode::OK, "not json"), Err(Error::Json(_))));

		let response = decode(
			reqwest::StatusCode::INTERNAL_SERVER_ERROR,
			r#"{"value": {"message": "boom"}}"#,
		)
		.unwrap();
		assert_eq!(response.status, UNKNOWN_ERROR);
	}
}
