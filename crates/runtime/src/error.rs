//! Error types for the Winium runtime.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use winium_protocol::{ParseVariantError, PathError};

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while supervising the driver or dispatching commands.
#[derive(Debug, Error)]
pub enum Error {
	/// No driver executable could be resolved for a variant.
	#[error(
		"The path to the driver executable must be set by the {setting} setting; for more information, see {docs_url}. The latest version can be downloaded from {download_url}"
	)]
	DriverNotFound {
		/// Expected executable file name.
		executable: &'static str,
		/// Setting that overrides the executable location.
		setting: &'static str,
		docs_url: &'static str,
		download_url: &'static str,
	},

	/// A configured executable path is unusable.
	#[error("The driver executable {reason}: {}", path.display())]
	InvalidExecutable { path: PathBuf, reason: &'static str },

	/// Invalid argument provided by the caller.
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	/// Failed to spawn the driver process, or it exited during startup.
	#[error("Failed to launch driver server: {0}")]
	LaunchFailed(String),

	/// The driver never answered its status endpoint before the deadline.
	#[error("Timed out after {}ms waiting for driver server to start at {url}", timeout.as_millis())]
	StartupTimeout { url: String, timeout: Duration },

	/// `start()` was called again on a service whose earlier start failed.
	#[error("Driver service already failed to start; build a new service to retry")]
	ServiceSpent,

	/// Command name missing from the command table.
	#[error("Unknown command: {0}")]
	UnknownCommand(String),

	/// Command parameters do not satisfy the path template.
	#[error("Malformed command '{command}': {source}")]
	MalformedCommand {
		command: String,
		#[source]
		source: PathError,
	},

	/// Connection refused while the supervised driver is not running.
	#[error("The driver server has unexpectedly died!")]
	DriverDied(#[source] Box<Error>),

	/// HTTP transport error.
	#[error("Transport error: {0}")]
	Transport(#[from] reqwest::Error),

	/// Non-success HTTP status with a body that is not a protocol response.
	#[error("HTTP {status} from driver server: {body}")]
	Http { status: u16, body: String },

	/// The driver answered with a protocol-level failure.
	#[error("Remote error (status {status}): {message}")]
	Remote { status: i64, message: String },

	/// The driver answered with a well-formed but unexpected payload.
	#[error("Protocol error: {0}")]
	Protocol(String),

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// Invalid driver URL.
	#[error("Invalid URL: {0}")]
	Url(#[from] url::ParseError),
}

impl Error {
	/// Returns true for local configuration problems (never retried).
	pub fn is_configuration(&self) -> bool {
		matches!(
			self,
			Error::DriverNotFound { .. } | Error::InvalidExecutable { .. } | Error::InvalidArgument(_)
		)
	}

	/// Returns true if the supervised driver process died mid-session.
	pub fn is_driver_died(&self) -> bool {
		matches!(self, Error::DriverDied(_))
	}

	pub fn is_startup_timeout(&self) -> bool {
		matches!(self, Error::StartupTimeout { .. })
	}

	/// Returns true if a command outlived the executor's command timeout.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::Transport(e) if e.is_timeout())
	}

	/// Returns the JSON wire status if this is a Remote error.
	pub fn remote_status(&self) -> Option<i64> {
		match self {
			Error::Remote { status, .. } => Some(*status),
			_ => None,
		}
	}
}

impl From<ParseVariantError> for Error {
	fn from(err: ParseVariantError) -> Self {
		Error::InvalidArgument(err.to_string())
	}
}
