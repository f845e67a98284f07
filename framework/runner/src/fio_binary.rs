use std::env;
use std::path::{Path, PathBuf};

use anyhow::bail;
use anyhow::Context;

use crate::types::FioControlResult;

/// Environment variable to override the path to the fio binary.
pub const FIO_PATH_ENV: &str = "FIO_CONTROL_FIO_PATH";

/// Get the path to the fio binary.
///
/// An explicit path wins, then the [`FIO_PATH_ENV`] environment variable. If neither is given, fio
/// is looked up in the user's `PATH`.
pub fn fio_path(explicit: Option<&Path>) -> FioControlResult<PathBuf> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("fio binary '{}' doesn't exist", path.display());
        }
        return Ok(path.to_path_buf());
    }

    match env::var(FIO_PATH_ENV).ok().as_deref() {
        Some("") => {
            bail!("'{FIO_PATH_ENV}' set to empty string");
        }
        Some("fio") | None => {
            log::debug!("'{FIO_PATH_ENV}' is not a path so looking in user's 'PATH'");
            which::which("fio").with_context(|| {
                format!(
                    "fio binary not found in PATH. Please install fio or set '{FIO_PATH_ENV}' to the correct path."
                )
            })
        }
        Some(path) => {
            let fio_path = PathBuf::from(path);
            if !fio_path.exists() {
                bail!(
                    "Path to fio binary overwritten with '{FIO_PATH_ENV}={path}' but that path doesn't exist",
                    path = fio_path.display()
                );
            }
            Ok(fio_path)
        }
    }
}

/// Get the version of the fio binary by running `fio --version`, for example `fio-3.36`.
pub fn fio_version(fio_path: &Path) -> FioControlResult<String> {
    let output = std::process::Command::new(fio_path)
        .arg("--version")
        .output()
        .context("Failed to execute 'fio --version' command")?;
    if !output.status.success() {
        bail!(
            "'fio --version' command failed with exit code: {status}",
            status = output.status
        );
    }

    Ok(String::from_utf8(output.stdout)
        .context("Failed to parse output of 'fio --version' command as UTF-8")?
        .trim()
        .to_string())
}
