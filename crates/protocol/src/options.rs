//! Per-variant option builders.
//!
//! Each builder holds optional fields and turns them into a [`Capabilities`]
//! map with a single deterministic [`to_capabilities`](WiniumOptions::to_capabilities).
//! Inclusion rules shared by all three builders:
//!
//! - `app` is always written, as `""` when unset, because a driver may attach
//!   to a running application instead when `debugConnectToRunningApp` is set.
//! - Optional strings are written only when set and non-empty.
//! - Booleans, integers, lists and maps are written whenever set, even when
//!   the value is `false`, `0` or an empty collection.
//!
//! Acceptability of the values is left to the remote driver.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::capabilities::Capabilities;
use crate::variant::DriverVariant;

pub const APP: &str = "app";
pub const ARGS: &str = "args";
pub const DEBUG_CONNECT_TO_RUNNING_APP: &str = "debugConnectToRunningApp";
pub const DEPENDENCIES: &str = "dependencies";
pub const DEVICE_NAME: &str = "deviceName";
pub const FILES: &str = "files";
pub const INNER_PORT: &str = "innerPort";
pub const KEYBOARD_SIMULATOR: &str = "keyboardSimulator";
pub const LAUNCH_DELAY: &str = "launchDelay";
pub const LAUNCH_TIMEOUT: &str = "launchTimeout";

/// Anything that can produce the capability payload for one session.
pub trait WiniumOptions {
	/// Backend the capabilities are meant for.
	fn variant(&self) -> DriverVariant;

	/// Builds the capability map. Pure; never fails.
	fn to_capabilities(&self) -> Capabilities;
}

/// Keyboard input strategy used by Winium.Desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyboardSimulator {
	/// Sends keys through `System.Windows.Forms.SendKeys`.
	BasedOnWindowsFormsSendKeysClass,
	/// Sends keys through the InputSimulator library.
	BasedOnInputSimulatorLib,
}

impl KeyboardSimulator {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::BasedOnWindowsFormsSendKeysClass => "BasedOnWindowsFormsSendKeysClass",
			Self::BasedOnInputSimulatorLib => "BasedOnInputSimulatorLib",
		}
	}
}

impl From<KeyboardSimulator> for Value {
	fn from(kind: KeyboardSimulator) -> Self {
		Value::String(kind.as_str().to_string())
	}
}

/// Options for Winium.Desktop sessions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesktopOptions {
	/// Absolute local path to the `.exe` to start.
	pub application_path: Option<String>,
	/// Command line of the application under test.
	pub arguments: Option<String>,
	/// Skip launching and attach to an already running application.
	pub debug_connect_to_running_app: Option<bool>,
	pub keyboard_simulator: Option<KeyboardSimulator>,
	/// Milliseconds to wait after launching the application.
	pub launch_delay: Option<u32>,
}

impl DesktopOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn application_path(mut self, path: impl Into<String>) -> Self {
		self.application_path = Some(path.into());
		self
	}

	pub fn arguments(mut self, arguments: impl Into<String>) -> Self {
		self.arguments = Some(arguments.into());
		self
	}

	pub fn debug_connect_to_running_app(mut self, attach: bool) -> Self {
		self.debug_connect_to_running_app = Some(attach);
		self
	}

	pub fn keyboard_simulator(mut self, kind: KeyboardSimulator) -> Self {
		self.keyboard_simulator = Some(kind);
		self
	}

	pub fn launch_delay(mut self, millis: u32) -> Self {
		self.launch_delay = Some(millis);
		self
	}
}

impl WiniumOptions for DesktopOptions {
	fn variant(&self) -> DriverVariant {
		DriverVariant::Desktop
	}

	fn to_capabilities(&self) -> Capabilities {
		let mut caps = Capabilities::new();
		caps.insert(APP, self.application_path.clone().unwrap_or_default());
		caps.insert_non_empty(ARGS, self.arguments.as_deref());
		caps.insert_opt(DEBUG_CONNECT_TO_RUNNING_APP, self.debug_connect_to_running_app);
		caps.insert_opt(KEYBOARD_SIMULATOR, self.keyboard_simulator);
		caps.insert_opt(LAUNCH_DELAY, self.launch_delay);
		caps
	}
}

/// Options for Winium.StoreApps sessions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreAppsOptions {
	/// Path to the `.appx` package to install and launch.
	pub application_path: Option<String>,
	pub debug_connect_to_running_app: Option<bool>,
	/// Dependency packages installed before the application.
	pub dependencies: Option<Vec<String>>,
	/// Emulator name, matched by prefix on the driver side.
	pub device_name: Option<String>,
	/// Local files to deploy, keyed by local path, valued by device path.
	pub files: Option<BTreeMap<String, String>>,
	pub launch_delay: Option<u32>,
	/// Milliseconds to wait for the application to start.
	pub launch_timeout: Option<u32>,
}

impl StoreAppsOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn application_path(mut self, path: impl Into<String>) -> Self {
		self.application_path = Some(path.into());
		self
	}

	pub fn debug_connect_to_running_app(mut self, attach: bool) -> Self {
		self.debug_connect_to_running_app = Some(attach);
		self
	}

	pub fn dependencies<I, S>(mut self, dependencies: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.dependencies = Some(dependencies.into_iter().map(Into::into).collect());
		self
	}

	pub fn device_name(mut self, name: impl Into<String>) -> Self {
		self.device_name = Some(name.into());
		self
	}

	pub fn files<I, K, V>(mut self, files: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.files = Some(files.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
		self
	}

	pub fn launch_delay(mut self, millis: u32) -> Self {
		self.launch_delay = Some(millis);
		self
	}

	pub fn launch_timeout(mut self, millis: u32) -> Self {
		self.launch_timeout = Some(millis);
		self
	}
}

impl WiniumOptions for StoreAppsOptions {
	fn variant(&self) -> DriverVariant {
		DriverVariant::StoreApps
	}

	fn to_capabilities(&self) -> Capabilities {
		let mut caps = Capabilities::new();
		caps.insert(APP, self.application_path.clone().unwrap_or_default());
		caps.insert_opt(FILES, self.files.as_ref().map(string_map));
		caps.insert_opt(DEBUG_CONNECT_TO_RUNNING_APP, self.debug_connect_to_running_app);
		caps.insert_non_empty(DEVICE_NAME, self.device_name.as_deref());
		caps.insert_opt(LAUNCH_TIMEOUT, self.launch_timeout);
		caps.insert_opt(LAUNCH_DELAY, self.launch_delay);
		caps.insert_opt(DEPENDENCIES, self.dependencies.clone());
		caps
	}
}

/// Options for Windows Phone Silverlight sessions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SilverlightOptions {
	/// Path to the `.xap` package to install and launch.
	pub application_path: Option<String>,
	pub debug_connect_to_running_app: Option<bool>,
	pub device_name: Option<String>,
	/// Port the inner driver embedded in the application listens on.
	pub inner_port: Option<u16>,
	pub launch_delay: Option<u32>,
	pub launch_timeout: Option<u32>,
}

impl SilverlightOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn application_path(mut self, path: impl Into<String>) -> Self {
		self.application_path = Some(path.into());
		self
	}

	pub fn debug_connect_to_running_app(mut self, attach: bool) -> Self {
		self.debug_connect_to_running_app = Some(attach);
		self
	}

	pub fn device_name(mut self, name: impl Into<String>) -> Self {
		self.device_name = Some(name.into());
		self
	}

	pub fn inner_port(mut self, port: u16) -> Self {
		self.inner_port = Some(port);
		self
	}

	pub fn launch_delay(mut self, millis: u32) -> Self {
		self.launch_delay = Some(millis);
		self
	}

	pub fn launch_timeout(mut self, millis: u32) -> Self {
		self.launch_timeout = Some(millis);
		self
	}
}

impl WiniumOptions for SilverlightOptions {
	fn variant(&self) -> DriverVariant {
		DriverVariant::Silverlight
	}

	fn to_capabilities(&self) -> Capabilities {
		let mut caps = Capabilities::new();
		caps.insert(APP, self.application_path.clone().unwrap_or_default());
		caps.insert_opt(DEBUG_CONNECT_TO_RUNNING_APP, self.debug_connect_to_running_app);
		caps.insert_non_empty(DEVICE_NAME, self.device_name.as_deref());
		caps.insert_opt(LAUNCH_TIMEOUT, self.launch_timeout);
		caps.insert_opt(LAUNCH_DELAY, self.launch_delay);
		caps.insert_opt(INNER_PORT, self.inner_port);
		caps
	}
}

/// Options for any supported backend, tagged by variant.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverOptions {
	Desktop(DesktopOptions),
	StoreApps(StoreAppsOptions),
	Silverlight(SilverlightOptions),
}

impl WiniumOptions for DriverOptions {
	fn variant(&self) -> DriverVariant {
		match self {
			Self::Desktop(_) => DriverVariant::Desktop,
			Self::StoreApps(_) => DriverVariant::StoreApps,
			Self::Silverlight(_) => DriverVariant::Silverlight,
		}
	}

	fn to_capabilities(&self) -> Capabilities {
		match self {
			Self::Desktop(opts) => opts.to_capabilities(),
			Self::StoreApps(opts) => opts.to_capabilities(),
			Self::Silverlight(opts) => opts.to_capabilities(),
		}
	}
}

impl From<DesktopOptions> for DriverOptions {
	fn from(opts: DesktopOptions) -> Self {
		Self::Desktop(opts)
	}
}

impl From<StoreAppsOptions> for DriverOptions {
	fn from(opts: StoreAppsOptions) -> Self {
		Self::StoreApps(opts)
	}
}

impl From<SilverlightOptions> for DriverOptions {
	fn from(opts: SilverlightOptions) -> Self {
		Self::Silverlight(opts)
	}
}

fn string_map(files: &BTreeMap<String, String>) -> Value {
	let map: Map<String, Value> = files
		.iter()
		.map(|(k, v)| (k.clone(), Value::String(v.clone())))
		.collect();
	Value::Object(map)
}
