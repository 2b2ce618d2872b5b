
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use url::Url;
use winium::{DriverVariant, KeyboardSimulator};

use crate::styles::cli_styles;

/// Root CLI for winium.
#[derive(Parser, Debug)]
#[command(name = "winium")]
#[command(about = "Winium client - launch Windows automation drivers and run sessions")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Print the command table (name, HTTP method, path template).
	Commands(CommandsArgs),
	/// Start a session, print its id and capabilities as JSON, then quit.
	Session(SessionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CommandsArgs {
	/// Only list the Winium extension commands.
	#[arg(long)]
	pub extensions: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
	/// Driver variant to target.
	#[arg(long, value_enum, default_value = "desktop")]
	pub variant: VariantArg,

	/// Application to launch (`.exe` for desktop, `.appx` or `.xap` otherwise).
	#[arg(long, value_name = "PATH")]
	pub app: Option<String>,

	/// Command line for the application (desktop only).
	#[arg(long, value_name = "ARGS", allow_hyphen_values = true)]
	pub args: Option<String>,

	/// Attach to an already running application instead of launching it.
	#[arg(long)]
	pub attach: bool,

	/// Keyboard input strategy (desktop only).
	#[arg(long, value_enum, value_name = "KIND")]
	pub keyboard_simulator: Option<KeyboardArg>,

	/// Emulator or device name (store apps and silverlight).
	#[arg(long, value_name = "NAME")]
	pub device_name: Option<String>,

	/// Milliseconds to wait after launching the application.
	#[arg(long, value_name = "MS")]
	pub launch_delay: Option<u32>,

	/// Milliseconds to wait for the application to launch (store apps and silverlight).
	#[arg(long, value_name = "MS")]
	pub launch_timeout: Option<u32>,

	/// Dependency package to install first (store apps only, repeatable).
	#[arg(long = "dependency", value_name = "PATH")]
	pub dependencies: Vec<String>,

	/// File to deploy as LOCAL=REMOTE (store apps only, repeatable).
	#[arg(long = "file", value_name = "LOCAL=REMOTE", value_parser = parse_file_mapping)]
	pub files: Vec<(String, String)>,

	/// Port of the inner driver on the device (silverlight only).
	#[arg(long, value_name = "PORT")]
	pub inner_port: Option<u16>,

	/// Driver executable; defaults to the setting, PATH, then the working directory.
	#[arg(long, value_name = "PATH", conflicts_with = "remote")]
	pub driver: Option<PathBuf>,

	/// Port for the launched driver; a free port when omitted.
	#[arg(long, conflicts_with = "remote")]
	pub port: Option<u16>,

	/// Use an already running driver at URL instead of launching one.
	#[arg(long, value_name = "URL")]
	pub remote: Option<Url>,

	/// Pass --verbose to the launched driver.
	#[arg(long, conflicts_with = "remote")]
	pub verbose_driver: bool,

	/// Pass --silent to the launched driver.
	#[arg(long, conflicts_with = "remote")]
	pub silent: bool,

	/// Driver log file, passed as --log-path.
	#[arg(long, value_name = "PATH", conflicts_with = "remote")]
	pub log_path: Option<PathBuf>,

	/// Seconds to wait for the launched driver to answer.
	#[arg(long, value_name = "SECS", default_value_t = 20)]
	pub startup_timeout: u64,

	/// Seconds to wait for each command to be answered.
	#[arg(long, value_name = "SECS", default_value_t = 60)]
	pub command_timeout: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum VariantArg {
	Desktop,
	#[value(name = "storeapps", alias = "store-apps")]
	StoreApps,
	Silverlight,
}

impl From<VariantArg> for DriverVariant {
	fn from(arg: VariantArg) -> Self {
		match arg {
			VariantArg::Desktop => DriverVariant::Desktop,
			VariantArg::StoreApps => DriverVariant::StoreApps,
			VariantArg::Silverlight => DriverVariant::Silverlight,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KeyboardArg {
	/// System.Windows.Forms.SendKeys
	Forms,
	/// InputSimulator library
	Input,
}

impl From<KeyboardArg> for KeyboardSimulator {
	fn from(arg: KeyboardArg) -> Self {
		match arg {
			KeyboardArg::Forms => KeyboardSimulator::BasedOnWindowsFormsSendKeysClass,
			KeyboardArg::Input => KeyboardSimulator::BasedOnInputSimulatorLib,
		}
	}
}

fn parse_file_mapping(raw: &str) -> Result<(String, String), String> {
	match raw.split_once('=') {
		Some((local, remote)) if !local.is_empty() && !remote.is_empty() => {
			Ok((local.to_string(), remote.to_string()))
		}
		_ => Err(format!("expected LOCAL=REMOTE, got '{raw}'")),
	}
}
