//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the gateway. The
//! library never reads environment variables itself.

use crate::constants::{NOTE_FILE_EXTENSION, PATIENTS_FILENAME, RECORDS_DIR_NAME};
use crate::patient::Phn;
use crate::{ClinicError, ClinicResult};
use std::path::{Path, PathBuf};

/// Whether mutations are written through to storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Everything lives in memory for the lifetime of the process.
    #[default]
    InMemory,
    /// Each store is loaded on construction and saved after every mutation.
    Persistent,
}

impl StorageMode {
    pub fn is_persistent(self) -> bool {
        matches!(self, StorageMode::Persistent)
    }
}

impl std::str::FromStr for StorageMode {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StorageMode::InMemory),
            "persistent" | "disk" => Ok(StorageMode::Persistent),
            other => Err(ClinicError::InvalidConfig(format!(
                "unknown storage mode '{other}'"
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    storage_mode: StorageMode,
    users_file: Option<PathBuf>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::InvalidConfig`] if `data_dir` is empty.
    pub fn new(
        data_dir: PathBuf,
        storage_mode: StorageMode,
        users_file: Option<PathBuf>,
    ) -> ClinicResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(ClinicError::InvalidConfig("data_dir cannot be empty".into()));
        }

        Ok(Self {
            data_dir,
            storage_mode,
            users_file,
        })
    }

    /// Configuration for a purely in-memory clinic. Nothing is ever written.
    pub fn in_memory() -> Self {
        Self {
            data_dir: PathBuf::from(crate::constants::DEFAULT_DATA_DIR),
            storage_mode: StorageMode::InMemory,
            users_file: None,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn storage_mode(&self) -> StorageMode {
        self.storage_mode
    }

    pub fn users_file(&self) -> Option<&Path> {
        self.users_file.as_deref()
    }

    pub fn patients_file(&self) -> PathBuf {
        self.data_dir.join(PATIENTS_FILENAME)
    }

    pub fn records_dir(&self) -> PathBuf {
        self.data_dir.join(RECORDS_DIR_NAME)
    }

    /// Location of the note storage unit for `phn`.
    pub fn note_file(&self, phn: Phn) -> PathBuf {
        self.records_dir()
            .join(format!("{phn}.{NOTE_FILE_EXTENSION}"))
    }
}
