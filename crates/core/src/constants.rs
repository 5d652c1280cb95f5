//! Constants used throughout the clinic core crate.
//!
//! Path and filename constants live here so storage layout stays consistent across the
//! catalog and note repositories.

/// Default directory for clinic data when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "clinic_data";

/// Filename of the patient catalog storage unit.
pub const PATIENTS_FILENAME: &str = "patients.json";

/// Directory name holding one note storage unit per patient.
pub const RECORDS_DIR_NAME: &str = "records";

/// Extension of a per-patient note storage unit.
pub const NOTE_FILE_EXTENSION: &str = "yaml";

/// Persisted timestamp format for notes.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Identities available before any credentials file is merged, as `(username, password)`.
pub const DEFAULT_USERS: &[(&str, &str)] = &[("user", "123456"), ("ali", "@G00dPassw0rd")];

/// Directory under the records directory holding note units of deleted patients.
pub const ARCHIVE_DIR_NAME: &str = "archive";
