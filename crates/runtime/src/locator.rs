//! Driver executable lookup.
//!
//! Resolution order:
//! 1. Path supplied explicitly by the caller
//! 2. The variant's override setting (e.g. `webdriver.winium.driver.desktop`)
//! 3. `PATH` search for the expected file name
//! 4. The current working directory
//!
//! An explicit or configured path that is unusable is an error rather than a
//! reason to keep searching.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use winium_protocol::DriverVariant;

use crate::error::{Error, Result};
use crate::settings::Settings;

/// What to look for and where to point the user when it is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutableSpec {
	pub file_name: &'static str,
	pub setting: &'static str,
	pub docs_url: &'static str,
	pub download_url: &'static str,
}

impl From<DriverVariant> for ExecutableSpec {
	fn from(variant: DriverVariant) -> Self {
		Self {
			file_name: variant.executable_name(),
			setting: variant.override_setting(),
			docs_url: variant.docs_url(),
			download_url: variant.download_url(),
		}
	}
}

/// Resolves the driver executable for `spec`.
///
/// # Errors
///
/// Returns [`Error::InvalidExecutable`] if an explicit or configured path is
/// missing, a directory, or not executable, and [`Error::DriverNotFound`]
/// (carrying the docs and download URLs) if no candidate resolves.
pub fn find_executable(spec: ExecutableSpec, explicit: Option<&Path>, settings: &Settings) -> Result<PathBuf> {
	if let Some(path) = explicit {
		debug!(target = "winium", path = %path.display(), "using explicit driver executable");
		return check_executable(path);
	}

	if let Some(configured) = settings.executable_override(spec.setting) {
		debug!(
			target = "winium",
			setting = spec.setting,
			path = %configured.display(),
			"using configured driver executable"
		);
		return check_executable(&configured);
	}

	if let Ok(found) = which::which(spec.file_name) {
		debug!(target = "winium", path = %found.display(), "found driver executable on PATH");
		return check_executable(&found);
	}

	if let Ok(cwd) = std::env::current_dir() {
		let candidate = cwd.join(spec.file_name);
		if check_executable(&candidate).is_ok() {
			debug!(target = "winium", path = %candidate.display(), "found driver executable in working directory");
			return Ok(candidate);
		}
	}

	Err(Error::DriverNotFound {
		executable: spec.file_name,
		setting: spec.setting,
		docs_url: spec.docs_url,
		download_url: spec.download_url,
	})
}

/// Validates that `path` is an existing, executable regular file and returns
/// it in absolute form.
pub fn check_executable(path: &Path) -> Result<PathBuf> {
	let invalid = |reason| Error::InvalidExecutable {
		path: path.to_path_buf(),
		reason,
	};

	let metadata = fs::metadata(path).map_err(|_| invalid("does not exist"))?;
	if metadata.is_dir() {
		return Err(invalid("is a directory"));
	}

	#[cfg(unix)]
	{
		use std::os::unix::fs::PermissionsExt;
		if metadata.permissions().mode() & 0o111 == 0 {
			return Err(invalid("must be executable"));
		}
	}

	Ok(std::path::absolute(path)?)
}

#[cfg(test)]
mod tests {
	#[cfg(unix)]
	use std::os::unix::fs::PermissionsExt;

	use tempfile::TempDir;

	use super::*;

	const SPEC: ExecutableSpec = ExecutableSpec {
		file_name: "Winium.Test.Driver.does-not-exist.exe",
		setting: "webdriver.winium.driver.desktop",
		docs_url: "https://github.com/2gis/Winium.Desktop",
		download_url: "https://github.com/2gis/Winium.Desktop/releases",
	};

	fn write_executable(path: &Path) {
		fs::write(path, "#!/bin/sh\nexit 0\n").unwrap();
		#[cfg(unix)]
		{
			let mut perms = fs::metadata(path).unwrap().permissions();
			perms.set_mode(0o755);
			fs::set_permissions(path, perms).unwrap();
		}
	}

	#[test]
	fn explicit_path_wins() {
		let temp = TempDir::new().unwrap();
		let exe = temp.path().join("driver.exe");
		write_executable(&exe);
		let settings = Settings::from_pairs([(SPEC.setting, "/nonexistent/other.exe")]);

		let found = find_executable(SPEC, Some(&exe), &settings).unwrap();
		assert_eq!(found, exe);
	}

	#[test]
	fn configured_setting_is_used_before_search() {
		let temp = TempDir::new().unwrap();
		let exe = temp.path().join("configured.exe");
		write_executable(&exe);
		let settings = Settings::from_pairs([(SPEC.setting, exe.to_string_lossy().to_string())]);

		assert_eq!(find_executable(SPEC, None, &settings).unwrap(), exe);
	}

	#[test]
	fn invalid_configured_path_is_an_error() {
		let settings = Settings::from_pairs([(SPEC.setting, "/nonexistent/driver.exe")]);
		match find_executable(SPEC, None, &settings) {
			Err(Error::InvalidExecutable { reason, .. }) => assert_eq!(reason, "does not exist"),
			other => panic!("expected InvalidExecutable, got {other:?}"),
		}
	}

	#[test]
	fn directory_is_rejected() {
		let temp = TempDir::new().unwrap();
		match check_executable(temp.path()) {
			Err(Error::InvalidExecutable { reason, .. }) => assert_eq!(reason, "is a directory"),
			other => panic!("expected InvalidExecutable, got {other:?}"),
		}
	}

	#[cfg(unix)]
	#[test]
	fn non_executable_file_is_rejected() {
		let temp = TempDir::new().unwrap();
		let file = temp.path().join("plain.exe");
		fs::write(&file, "not a program").unwrap();
		let mut perms = fs::metadata(&file).unwrap().permissions();
		perms.set_mode(0o644);
		fs::set_permissions(&file, perms).unwrap();

		match check_executable(&file) {
			Err(Error::InvalidExecutable { reason, .. }) => assert_eq!(reason, "must be executable"),
			other => panic!("expected InvalidExecutable, got {other:?}"),
		}
	}

	#[test]
	fn missing_driver_points_to_docs_and_downloads() {
		let err = find_executable(SPEC, None, &Settings::default()).unwrap_err();
		assert!(err.is_configuration());
		let msg = err.to_string();
		assert!(msg.contains("webdriver.winium.driver.desktop"), "{msg}");
		assert!(msg.contains("see https://github.com/2gis/Winium.Desktop."), "{msg}");
		assert!(msg.contains("https://github.com/2gis/Winium.Desktop/releases"), "{msg}");
	}

	#[test]
	fn spec_from_variant() {
		let spec = ExecutableSpec::from(DriverVariant::Silverlight);
		assert_eq!(spec.file_name, "WindowsPhoneDriver.OuterDriver.exe");
		assert_eq!(spec.setting, "webdriver.winium.driver.silverlight");
	}
}
