//! Driver variants and the per-variant constants used to locate them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which native Winium backend a session targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverVariant {
	/// Classic Windows desktop applications (Winium.Desktop).
	Desktop,
	/// Windows Store apps (Winium.StoreApps).
	StoreApps,
	/// Windows Phone Silverlight apps (winphonedriver).
	Silverlight,
}

/// Returned when a variant name is not one of the supported backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown driver variant '{0}': option type must be one of desktop, storeapps or silverlight")]
pub struct ParseVariantError(pub String);

impl DriverVariant {
	/// All variants, in declaration order.
	pub const ALL: [DriverVariant; 3] = [Self::Desktop, Self::StoreApps, Self::Silverlight];

	/// File name of the native driver executable.
	pub fn executable_name(self) -> &'static str {
		match self {
			Self::Desktop => "Winium.Desktop.Driver.exe",
			Self::StoreApps => "Winium.StoreApps.Driver.exe",
			Self::Silverlight => "WindowsPhoneDriver.OuterDriver.exe",
		}
	}

	/// Setting that overrides the executable path for this variant.
	///
	/// The StoreApps spelling (`storeaps`) is kept for compatibility with
	/// existing configurations.
	pub fn override_setting(self) -> &'static str {
		match self {
			Self::Desktop => "webdriver.winium.driver.desktop",
			Self::StoreApps => "webdriver.winium.driver.storeaps",
			Self::Silverlight => "webdriver.winium.driver.silverlight",
		}
	}

	pub fn docs_url(self) -> &'static str {
		match self {
			Self::Desktop => "https://github.com/2gis/Winium.Desktop",
			Self::StoreApps => "https://github.com/2gis/Winium.StoreApps",
			Self::Silverlight => "https://github.com/2gis/winphonedriver",
		}
	}

	pub fn download_url(self) -> &'static str {
		match self {
			Self::Desktop => "https://github.com/2gis/Winium.Desktop/releases",
			Self::StoreApps => "https://github.com/2gis/Winium.StoreApps/releases",
			Self::Silverlight => "https://github.com/2gis/winphonedriver/releases",
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Desktop => "desktop",
			Self::StoreApps => "storeapps",
			Self::Silverlight => "silverlight",
		}
	}
}

impl fmt::Display for DriverVariant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for DriverVariant {
	type Err = ParseVariantError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"desktop" => Ok(Self::Desktop),
			"storeapps" | "store-apps" | "store_apps" => Ok(Self::StoreApps),
			"silverlight" => Ok(Self::Silverlight),
			_ => Err(ParseVariantError(s.to_string())),
		}
	}
}
