//! Wire types for the Winium driver protocol.
//!
//! This crate contains the serde-serializable types exchanged with a Winium
//! driver (Winium.Desktop, Winium.StoreApps or the Windows Phone Silverlight
//! driver) over the JSON wire protocol:
//!
//! - [`Capabilities`] and the per-variant option builders that produce them
//! - [`DriverVariant`], the tag selecting which native driver a session targets
//! - [`CommandTable`], the merged baseline + vendor-extension command table
//! - [`Command`] and [`Response`], the request/response envelopes
//!
//! Types here carry no I/O. Process supervision and HTTP dispatch live in
//! `winium-runtime`.

pub mod capabilities;
pub mod command;
pub mod command_table;
pub mod options;
pub mod variant;

pub use capabilities::Capabilities;
pub use command::{Command, Response};
pub use command_table::{CommandInfo, CommandTable, HttpMethod, PathError, names};
pub use options::{
	DesktopOptions, DriverOptions, KeyboardSimulator, SilverlightOptions, StoreAppsOptions,
	WiniumOptions,
};
pub use variant::{DriverVariant, ParseVariantError};
