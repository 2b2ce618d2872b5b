//! Environment-provided defaults.
//!
//! Setting names match the system properties understood by the other Winium
//! clients, so existing CI configuration keeps working:
//!
//! - `webdriver.winium.verbose` - pass `--verbose` to the driver
//! - `webdriver.winium.silent` - pass `--silent` to the driver
//! - `webdriver.winium.logpath` - pass `--log-path=<value>` to the driver
//! - `webdriver.winium.driver.<variant>` - driver executable override

use std::collections::HashMap;
use std::path::PathBuf;

use winium_protocol::DriverVariant;

pub const VERBOSE_LOG: &str = "webdriver.winium.verbose";
pub const SILENT: &str = "webdriver.winium.silent";
pub const LOG_PATH: &str = "webdriver.winium.logpath";

/// Snapshot of the Winium settings visible to this process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
	values: HashMap<String, String>,
}

impl Settings {
	/// Reads settings from the process environment.
	pub fn from_env() -> Self {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Reads settings through `lookup`, which maps a setting name to its value.
	pub fn from_lookup<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		let keys = [VERBOSE_LOG, SILENT, LOG_PATH]
			.into_iter()
			.chain(DriverVariant::ALL.into_iter().map(DriverVariant::override_setting));

		let values = keys
			.filter_map(|key| lookup(key).map(|value| (key.to_string(), value)))
			.collect();
		Self { values }
	}

	/// Builds settings from explicit pairs.
	pub fn from_pairs<I, K, V>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			values: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
		}
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.values.get(key).map(String::as_str)
	}

	pub fn verbose(&self) -> bool {
		self.flag(VERBOSE_LOG)
	}

	pub fn silent(&self) -> bool {
		self.flag(SILENT)
	}

	pub fn log_path(&self) -> Option<PathBuf> {
		self.get(LOG_PATH).filter(|v| !v.is_empty()).map(PathBuf::from)
	}

	/// Executable override stored under `setting`, if set and non-empty.
	pub fn executable_override(&self, setting: &str) -> Option<PathBuf> {
		self.get(setting).filter(|v| !v.is_empty()).map(PathBuf::from)
	}

	/// Only a case-insensitive `true` enables a flag.
	fn flag(&self, key: &str) -> bool {
		self.get(key).is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
	}
}
