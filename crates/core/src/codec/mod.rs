//! Wire formats for the two storage units.
//!
//! Each codec is a pair of pure functions, `render` and `parse`, that translate between
//! domain values and the exact on-disk text. They never touch the filesystem, and the two
//! codecs are independent of each other because they target separate storage units.

pub mod notes;
pub mod patients;

use crate::ClinicError;

/// Build a [`ClinicError::SchemaMismatch`] from a `serde_path_to_error` path.
pub(crate) fn schema_mismatch(path: String, message: impl std::fmt::Display) -> ClinicError {
    let path = if path.is_empty() {
        "<root>".to_string()
    } else {
        path
    };
    ClinicError::SchemaMismatch {
        path,
        message: message.to_string(),
    }
}
