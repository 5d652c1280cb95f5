//! Storage-unit utilities.
//!
//! Both repositories persist whole units: the catalog as one file, each note log as one file.
//! These helpers read and write such units as single blobs.

use crate::{ClinicError, ClinicResult};
use std::{fs, io::ErrorKind, path::Path};

/// Reads a storage unit, returning `None` when it does not exist.
///
/// # Errors
///
/// Returns [`ClinicError::FileRead`] for any I/O failure other than a missing file.
pub(crate) fn read_unit(path: &Path) -> ClinicResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => {
            tracing::debug!("read storage unit {}", path.display());
            Ok(Some(text))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ClinicError::FileRead(e)),
    }
}

/// Replaces a storage unit with `contents` in one step.
///
/// The text is written to a sibling `.tmp` file first and then renamed over the target, so a
/// reader never observes a half-written unit. Parent directories are created as needed.
///
/// # Errors
///
/// Returns:
/// - [`ClinicError::StorageDirCreation`] if the parent directory cannot be created,
/// - [`ClinicError::FileWrite`] if writing or renaming fails.
pub(crate) fn write_unit(path: &Path, contents: &str) -> ClinicResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(ClinicError::StorageDirCreation)?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, contents).map_err(ClinicError::FileWrite)?;
    fs::rename(&temp_path, path).map_err(ClinicError::FileWrite)?;

    tracing::debug!("wrote storage unit {}", path.display());
    Ok(())
}

/// Moves a storage unit to `to`, creating the destination directory if needed.
///
/// Returns `false` when there is nothing at `from`. An existing unit at `to` is never replaced.
///
/// # Errors
///
/// Returns [`ClinicError::IllegalOperation`] if `to` already exists, or
/// [`ClinicError::StorageDirCreation`] / [`ClinicError::FileWrite`] on I/O failure.
pub(crate) fn move_unit(from: &Path, to: &Path) -> ClinicResult<bool> {
    if !from.exists() {
        return Ok(false);
    }
    if to.exists() {
        return Err(ClinicError::illegal(format!(
            "refusing to replace existing storage unit {}",
            to.display()
        )));
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(ClinicError::StorageDirCreation)?;
    }
    fs::rename(from, to).map_err(ClinicError::FileWrite)?;

    tracing::debug!("moved storage unit {} -> {}", from.display(), to.display());
    Ok(true)
}
