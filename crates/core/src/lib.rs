//! winium: Rust client for the Winium Windows automation drivers
//!
//! Drives Winium.Desktop, Winium.StoreApps and the Windows Phone Silverlight
//! driver over the JSON wire protocol. The driver executable is located,
//! launched on a free port and shut down again when the session ends.
//!
//! # Examples
//!
//! ## Desktop application
//!
//! ```ignore
//! use winium::{By, DesktopOptions, WiniumDriver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = DesktopOptions::new()
//!         .application_path("C:/Windows/System32/notepad.exe")
//!         .launch_delay(500);
//!     let driver = WiniumDriver::new(options).await?;
//!
//!     let editor = driver.find_element(By::class_name("Edit")).await?;
//!     editor.send_keys("Hello from Rust").await?;
//!     assert_eq!(editor.text().await?, "Hello from Rust");
//!
//!     driver.quit().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Data grid and menus
//!
//! ```ignore
//! use winium::{By, WiniumDriver};
//!
//! # async fn demo(driver: &WiniumDriver) -> winium::Result<()> {
//! let grid = driver.find_element(By::id("OrdersGrid")).await?;
//! let rows = grid.data_grid_row_count().await?;
//! let cell = grid.find_data_grid_cell(0, 2).await?;
//! println!("{} rows, first total: {}", rows, cell.text().await?);
//!
//! let menu = driver.find_element(By::id("MainMenu")).await?;
//! menu.select_menu_item("File$Save As").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom service or remote server
//!
//! ```ignore
//! use std::time::Duration;
//! use winium::{DesktopOptions, DriverService, DriverVariant, StoreAppsOptions, WiniumDriver};
//!
//! let service = DriverService::builder()
//!     .executable("C:/tools/Winium.StoreApps.Driver.exe")
//!     .verbose(true)
//!     .startup_timeout(Duration::from_secs(60))
//!     .build(DriverVariant::StoreApps)?;
//! let options = StoreAppsOptions::new().application_path("C:/apps/App.appx");
//! let driver = WiniumDriver::with_service(service, options).await?;
//!
//! let url = "http://192.168.1.20:9999".parse()?;
//! let remote = WiniumDriver::remote(url, DesktopOptions::new().application_path("C:/app.exe")).await?;
//! ```

mod by;
mod driver;
mod element;
mod session;

#[cfg(test)]
mod testing;

pub use by::By;
pub use driver::WiniumDriver;
pub use element::{Element, Point, Size};
pub use winium_protocol::{
	Capabilities, Command, CommandTable, DesktopOptions, DriverOptions, DriverVariant,
	KeyboardSimulator, Response, SilverlightOptions, StoreAppsOptions, WiniumOptions, names,
};
pub use winium_runtime::{
	CommandExecutor, DEFAULT_COMMAND_TIMEOUT, DriverService, DriverServiceBuilder, Error, Result,
	ServiceHandle, ServiceState, Settings,
};
