//! Winium Runtime - driver service supervision and command execution
//!
//! This crate provides the process and transport layer between the
//! `winium` facade and a native Winium driver:
//!
//! - **Settings**: `webdriver.winium.*` defaults read from the environment
//! - **Locator**: Resolving the driver executable for a variant
//! - **Service**: Spawning the driver, probing `/status`, shutting it down
//! - **Executor**: Dispatching JSON wire commands and classifying failures
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │      winium      │  WiniumDriver / Element facade
//! └────────┬─────────┘
//!          │ Command / Response
//! ┌────────▼─────────┐
//! │  winium-runtime  │  This crate
//! │  ┌────────────┐  │
//! │  │  Executor  │  │  HTTP dispatch, connection-refused classification
//! │  └─────┬──────┘  │
//! │  ┌─────▼──────┐  │
//! │  │  Service   │  │  Process lifecycle (ServiceHandle)
//! │  └────────────┘  │
//! └──────────────────┘
//! ```
//!
//! The executor only sees the [`ServiceHandle`] trait, so it can be bound to a
//! [`DriverService`], to a test double, or to no service at all for a remote
//! server.

pub mod error;
pub mod executor;
pub mod locator;
pub mod service;
pub mod settings;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use executor::{CommandExecutor, DEFAULT_COMMAND_TIMEOUT, is_connection_refused};
pub use locator::{ExecutableSpec, check_executable, find_executable};
pub use service::{
	DriverService, DriverServiceBuilder, ServiceDescriptor, ServiceHandle, ServiceState,
	find_free_port,
};
pub use settings::Settings;
