//! `winium session`

use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use winium::{
	Capabilities, DesktopOptions, DriverOptions, DriverService, DriverVariant, SilverlightOptions,
	StoreAppsOptions, WiniumDriver,
};

use crate::cli::SessionArgs;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionReport<'a> {
	session_id: &'a str,
	variant: &'static str,
	capabilities: &'a Capabilities,
}

pub async fn run(args: SessionArgs) -> Result<()> {
	let variant = DriverVariant::from(args.variant);
	let options = build_options(&args)?;

	let command_timeout = Duration::from_secs(args.command_timeout);

	let driver = match &args.remote {
		Some(url) => WiniumDriver::remote_with_timeout(url.clone(), options, command_timeout)
			.await
			.with_context(|| format!("failed to create session on {url}"))?,
		None => {
			let service = build_service(&args)?;
			WiniumDriver::with_service_and_timeout(service, options, command_timeout)
				.await
				.context("failed to create session")?
		}
	};

	let report = SessionReport {
		session_id: driver.session_id(),
		variant: variant.as_str(),
		capabilities: driver.capabilities(),
	};
	println!("{}", serde_json::to_string_pretty(&report)?);

	driver.quit().await.context("failed to quit session")
}

fn build_service(args: &SessionArgs) -> Result<DriverService> {
	let mut builder = DriverService::builder().startup_timeout(Duration::from_secs(args.startup_timeout));
	if let Some(driver) = &args.driver {
		builder = builder.executable(driver);
	}
	if let Some(port) = args.port {
		builder = builder.port(port);
	}
	if args.verbose_driver {
		builder = builder.verbose(true);
	}
	if args.silent {
		builder = builder.silent(true);
	}
	if let Some(log_path) = &args.log_path {
		builder = builder.log_path(log_path);
	}
	Ok(builder.build(args.variant.into())?)
}

/// Maps the flags onto the options type of the selected variant.
fn build_options(args: &SessionArgs) -> Result<DriverOptions> {
	use DriverVariant::{Desktop, Silverlight, StoreApps};

	let variant = DriverVariant::from(args.variant);
	let scoped: [(bool, &str, &[DriverVariant]); 7] = [
		(args.args.is_some(), "args", &[Desktop]),
		(args.keyboard_simulator.is_some(), "keyboard-simulator", &[Desktop]),
		(args.device_name.is_some(), "device-name", &[StoreApps, Silverlight]),
		(args.launch_timeout.is_some(), "launch-timeout", &[StoreApps, Silverlight]),
		(!args.dependencies.is_empty(), "dependency", &[StoreApps]),
		(!args.files.is_empty(), "file", &[StoreApps]),
		(args.inner_port.is_some(), "inner-port", &[Silverlight]),
	];
	for (present, flag, allowed) in scoped {
		if present && !allowed.contains(&variant) {
			let allowed: Vec<&str> = allowed.iter().map(|v| v.as_str()).collect();
			bail!("--{flag} is only valid for {}", allowed.join(" and "));
		}
	}

	let app = args.app.clone().unwrap_or_default();
	let options = match variant {
		Desktop => {
			let mut opts = DesktopOptions::new().application_path(app);
			opts.arguments = args.args.clone();
			opts.keyboard_simulator = args.keyboard_simulator.map(Into::into);
			opts.launch_delay = args.launch_delay;
			opts.debug_connect_to_running_app = args.attach.then_some(true);
			DriverOptions::from(opts)
		}
		StoreApps => {
			let mut opts = StoreAppsOptions::new().application_path(app);
			if !args.dependencies.is_empty() {
				opts = opts.dependencies(args.dependencies.iter().cloned());
			}
			if !args.files.is_empty() {
				opts = opts.files(args.files.iter().cloned());
			}
			opts.device_name = args.device_name.clone();
			opts.launch_delay = args.launch_delay;
			opts.launch_timeout = args.launch_timeout;
			opts.debug_connect_to_running_app = args.attach.then_some(true);
			DriverOptions::from(opts)
		}
		Silverlight => {
			let mut opts = SilverlightOptions::new().application_path(app);
			opts.device_name = args.device_name.clone();
			opts.inner_port = args.inner_port;
			opts.launch_delay = args.launch_delay;
			opts.launch_timeout = args.launch_timeout;
			opts.debug_connect_to_running_app = args.attach.then_some(true);
			DriverOptions::from(opts)
		}
	};
	Ok(options)
}
