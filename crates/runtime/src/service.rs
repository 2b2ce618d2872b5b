//! Driver service supervision
//!
//! Launches one native Winium driver process bound to one local port, waits
//! for its HTTP status endpoint to answer, and tears it down again.
//!
//! ```text
//! Stopped ──start()──▶ Starting ──status ok──▶ Running ──stop()──▶ Stopping ──▶ Stopped
//!                         │                       │
//!                         └─timeout / exit──▶ Stopped (spent)   └─process exited──▶ Stopped
//! ```
//!
//! A service whose start failed is spent: further `start()` calls fail and a
//! new service must be built. `stop()` is always safe and always ends in
//! [`ServiceState::Stopped`].

use std::collections::BTreeMap;
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;
use winium_protocol::DriverVariant;

use crate::error::{Error, Result};
use crate::locator::{ExecutableSpec, find_executable};
use crate::settings::Settings;

pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

/// Per-request timeout for status and shutdown probes.
const PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// Lifecycle state of a [`DriverService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
	Stopped,
	Starting,
	Running,
	Stopping,
}

/// The supervisor operations the command executor relies on.
#[async_trait]
pub trait ServiceHandle: Send + Sync {
	/// Starts the service; a no-op when it is already running.
	async fn start(&mut self) -> Result<()>;

	/// Stops the service; a no-op when it is already stopped.
	async fn stop(&mut self) -> Result<()>;

	/// Whether the service is running and its process is still alive.
	fn is_running(&mut self) -> bool;

	/// Base URL of the driver's HTTP endpoint.
	fn url(&self) -> &Url;
}

/// Everything needed to launch one driver process. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
	pub executable: PathBuf,
	pub port: u16,
	pub url: Url,
	pub args: Vec<String>,
	pub env: BTreeMap<String, String>,
}

/// Builder for [`DriverService`].
///
/// Flags left unset fall back to [`Settings`] (`webdriver.winium.*`).
#[derive(Debug, Clone)]
pub struct DriverServiceBuilder {
	executable: Option<PathBuf>,
	port: Option<u16>,
	verbose: Option<bool>,
	silent: Option<bool>,
	log_path: Option<PathBuf>,
	env: BTreeMap<String, String>,
	startup_timeout: Duration,
	poll_interval: Duration,
	shutdown_grace: Duration,
	settings: Option<Settings>,
}

impl Default for DriverServiceBuilder {
	fn default() -> Self {
		Self {
			executable: None,
			port: None,
			verbose: None,
			silent: None,
			log_path: None,
			env: BTreeMap::new(),
			startup_timeout: DEFAULT_STARTUP_TIMEOUT,
			poll_interval: DEFAULT_POLL_INTERVAL,
			shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
			settings: None,
		}
	}
}

impl DriverServiceBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Uses this executable instead of searching for one.
	pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
		self.executable = Some(path.into());
		self
	}

	/// Binds the driver to `port`; `0` probes for a free port.
	pub fn port(mut self, port: u16) -> Self {
		self.port = Some(port);
		self
	}

	pub fn verbose(mut self, verbose: bool) -> Self {
		self.verbose = Some(verbose);
		self
	}

	pub fn silent(mut self, silent: bool) -> Self {
		self.silent = Some(silent);
		self
	}

	pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.log_path = Some(path.into());
		self
	}

	/// Adds an environment variable for the driver process.
	pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.env.insert(key.into(), value.into());
		self
	}

	/// Upper bound on how long `start()` waits for the status endpoint.
	pub fn startup_timeout(mut self, timeout: Duration) -> Self {
		self.startup_timeout = timeout;
		self
	}

	/// Delay between status probes during startup.
	pub fn poll_interval(mut self, interval: Duration) -> Self {
		self.poll_interval = interval;
		self
	}

	/// How long `stop()` waits for a graceful exit before killing.
	pub fn shutdown_grace(mut self, grace: Duration) -> Self {
		self.shutdown_grace = grace;
		self
	}

	/// Settings used for unset flags and the executable override.
	pub fn settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	/// Resolves executable, port and arguments into a stopped service.
	///
	/// # Errors
	///
	/// Returns a configuration error if no usable executable resolves, and an
	/// I/O error if no free port could be probed.
	pub fn build(self, variant: DriverVariant) -> Result<DriverService> {
		let settings = self.settings.unwrap_or_else(Settings::from_env);

		let executable = find_executable(ExecutableSpec::from(variant), self.executable.as_deref(), &settings)?;

		let port = match self.port {
			Some(port) if port != 0 => port,
			_ => find_free_port()?,
		};
		let url = Url::parse(&format!("http://localhost:{port}"))?;

		let mut args = Vec::new();
		if self.silent.unwrap_or_else(|| settings.silent()) {
			args.push("--silent".to_string());
		}
		if self.verbose.unwrap_or_else(|| settings.verbose()) {
			args.push("--verbose".to_string());
		}
		if let Some(log_path) = self.log_path.or_else(|| settings.log_path()) {
			let log_path = std::path::absolute(&log_path)?;
			args.push(format!("--log-path={}", log_path.display()));
		}

		let descriptor = ServiceDescriptor {
			executable,
			port,
			url,
			args,
			env: self.env,
		};
		debug!(
			target = "winium",
			%variant,
			executable = %descriptor.executable.display(),
			port,
			args = ?descriptor.args,
			"built driver service"
		);

		DriverService::new(descriptor, self.startup_timeout, self.poll_interval, self.shutdown_grace)
	}
}

/// Supervises one native driver process.
#[derive(Debug)]
pub struct DriverService {
	descriptor: ServiceDescriptor,
	state: ServiceState,
	child: Option<Child>,
	spent: bool,
	http: reqwest::Client,
	startup_timeout: Duration,
	poll_interval: Duration,
	shutdown_grace: Duration,
}

impl DriverService {
	fn new(
		descriptor: ServiceDescriptor,
		startup_timeout: Duration,
		poll_interval: Duration,
		shutdown_grace: Duration,
	) -> Result<Self> {
		let http = reqwest::Client::builder().timeout(PROBE_TIMEOUT).build()?;
		Ok(Self {
			descriptor,
			state: ServiceState::Stopped,
			child: None,
			spent: false,
			http,
			startup_timeout,
			poll_interval,
			shutdown_grace,
		})
	}

	pub fn builder() -> DriverServiceBuilder {
		DriverServiceBuilder::new()
	}

	/// Default service for `variant` on a free port.
	pub fn for_variant(variant: DriverVariant) -> Result<Self> {
		DriverServiceBuilder::new().build(variant)
	}

	pub fn desktop() -> Result<Self> {
		Self::for_variant(DriverVariant::Desktop)
	}

	pub fn store_apps() -> Result<Self> {
		Self::for_variant(DriverVariant::StoreApps)
	}

	pub fn silverlight() -> Result<Self> {
		Self::for_variant(DriverVariant::Silverlight)
	}

	pub fn descriptor(&self) -> &ServiceDescriptor {
		&self.descriptor
	}

	pub fn state(&self) -> ServiceState {
		self.state
	}

	pub fn url(&self) -> &Url {
		&self.descriptor.url
	}

	/// OS process id while a process is attached.
	pub fn pid(&self) -> Option<u32> {
		self.child.as_ref().and_then(Child::id)
	}

	/// Spawns the driver and waits for its status endpoint.
	///
	/// # Errors
	///
	/// Returns [`Error::ServiceSpent`] if an earlier start failed,
	/// [`Error::LaunchFailed`] if the process cannot be spawned or exits while
	/// starting, and [`Error::StartupTimeout`] if the status endpoint never
	/// answers. On every error the spawned process has been killed.
	pub async fn start(&mut self) -> Result<()> {
		if self.is_running() {
			return Ok(());
		}
		if self.spent {
			return Err(Error::ServiceSpent);
		}

		self.state = ServiceState::Starting;
		let mut cmd = Command::new(&self.descriptor.executable);
		cmd.args(&self.descriptor.args)
			.envs(&self.descriptor.env)
			.stdin(Stdio::null())
			.stdout(Stdio::inherit())
			.stderr(Stdio::inherit())
			.kill_on_drop(true);

		let child = match cmd.spawn() {
			Ok(child) => child,
			Err(e) => {
				self.spent = true;
				self.state = ServiceState::Stopped;
				return Err(Error::LaunchFailed(format!(
					"Failed to spawn {}: {}",
					self.descriptor.executable.display(),
					e
				)));
			}
		};
		info!(
			target = "winium",
			pid = ?child.id(),
			url = %self.descriptor.url,
			"spawned driver server"
		);
		self.child = Some(child);

		match self.wait_until_available().await {
			Ok(()) => {
				self.state = ServiceState::Running;
				info!(target = "winium", url = %self.descriptor.url, "driver server is running");
				Ok(())
			}
			Err(e) => {
				warn!(target = "winium", error = %e, "driver server failed to start");
				self.spent = true;
				self.kill().await;
				self.state = ServiceState::Stopped;
				Err(e)
			}
		}
	}

	/// Polls `<url>/status` until it answers with a success status.
	async fn wait_until_available(&mut self) -> Result<()> {
		let status_url = endpoint(&self.descriptor.url, "/status")?;
		let deadline = Instant::now() + self.startup_timeout;

		loop {
			if let Some(child) = self.child.as_mut() {
				match child.try_wait() {
					Ok(Some(status)) => {
						return Err(Error::LaunchFailed(format!(
							"Driver server exited during startup with status: {}",
							status
						)));
					}
					Ok(None) => {}
					Err(e) => {
						return Err(Error::LaunchFailed(format!("Failed to check process status: {}", e)));
					}
				}
			}

			match self.http.get(status_url.clone()).send().await {
				Ok(response) if response.status().is_success() => return Ok(()),
				Ok(response) => {
					debug!(target = "winium", status = %response.status(), "status probe not ready");
				}
				Err(e) => debug!(target = "winium", error = %e, "status probe failed"),
			}

			let now = Instant::now();
			if now >= deadline {
				return Err(Error::StartupTimeout {
					url: self.descriptor.url.to_string(),
					timeout: self.startup_timeout,
				});
			}
			tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
		}
	}

	/// True only while Running with a live process.
	///
	/// An exit observed here moves the service to Stopped.
	pub fn is_running(&mut self) -> bool {
		if self.state != ServiceState::Running {
			return false;
		}
		let Some(child) = self.child.as_mut() else {
			self.state = ServiceState::Stopped;
			return false;
		};

		match child.try_wait() {
			Ok(None) => true,
			Ok(Some(status)) => {
				warn!(target = "winium", %status, "driver server exited unexpectedly");
				self.child = None;
				self.state = ServiceState::Stopped;
				false
			}
			Err(e) => {
				warn!(target = "winium", error = %e, "failed to check driver server status");
				false
			}
		}
	}

	/// Shuts the driver down, killing it if it outlives the grace period.
	///
	/// Safe to call repeatedly, before `start()`, or after a failed start.
	pub async fn stop(&mut self) -> Result<()> {
		if self.child.is_none() {
			self.state = ServiceState::Stopped;
			return Ok(());
		}

		self.state = ServiceState::Stopping;
		self.request_shutdown().await;
		let result = self.await_exit().await;
		self.child = None;
		self.state = ServiceState::Stopped;
		info!(target = "winium", url = %self.descriptor.url, "driver server stopped");
		result
	}

	/// Asks the driver to exit: `GET <url>/shutdown`, then SIGTERM on unix.
	async fn request_shutdown(&mut self) {
		if let Ok(shutdown_url) = endpoint(&self.descriptor.url, "/shutdown") {
			if let Err(e) = self.http.get(shutdown_url).send().await {
				debug!(target = "winium", error = %e, "shutdown request failed");
			}
		}

		#[cfg(unix)]
		if let Some(pid) = self.pid() {
			let kill_result = Command::new("kill")
				.args(["-TERM", &pid.to_string()])
				.stdout(Stdio::null())
				.stderr(Stdio::null())
				.status()
				.await;

			match kill_result {
				Ok(status) if status.success() => {}
				Ok(status) => debug!(target = "winium", pid, %status, "kill -TERM returned non-zero"),
				Err(e) => debug!(target = "winium", pid, error = %e, "failed to send SIGTERM"),
			}
		}
	}

	async fn await_exit(&mut self) -> Result<()> {
		let Some(child) = self.child.as_mut() else {
			return Ok(());
		};

		match tokio::time::timeout(self.shutdown_grace, child.wait()).await {
			Ok(Ok(status)) => {
				debug!(target = "winium", %status, "driver server exited");
				Ok(())
			}
			Ok(Err(e)) => {
				warn!(target = "winium", error = %e, "failed waiting for driver server; killing");
				child.kill().await.map_err(Error::from)
			}
			Err(_) => {
				warn!(
					target = "winium",
					grace_ms = self.shutdown_grace.as_millis() as u64,
					"driver server ignored shutdown; killing"
				);
				child.kill().await.map_err(Error::from)
			}
		}
	}

	/// Force kills and reaps the attached process, if any.
	async fn kill(&mut self) {
		if let Some(mut child) = self.child.take() {
			if let Err(e) = child.kill().await {
				warn!(target = "winium", error = %e, "failed to kill driver server");
			}
		}
	}
}

#[async_trait]
impl ServiceHandle for DriverService {
	async fn start(&mut self) -> Result<()> {
		DriverService::start(self).await
	}

	async fn stop(&mut self) -> Result<()> {
		DriverService::stop(self).await
	}

	fn is_running(&mut self) -> bool {
		DriverService::is_running(self)
	}

	fn url(&self) -> &Url {
		DriverService::url(self)
	}
}

/// Appends `path` to `base`, keeping any path prefix `base` already has.
pub fn endpoint(base: &Url, path: &str) -> Result<Url> {
	let joined = format!("{}{}", base.as_str().trim_end_matches('/'), path);
	Ok(Url::parse(&joined)?)
}

/// Asks the OS for an unused local TCP port.
pub fn find_free_port() -> Result<u16> {
	let listener = TcpListener::bind(("127.0.0.1", 0))?;
	Ok(listener.local_addr()?.port())
}
