//! # Clinic Core
//!
//! Core business logic for a small clinic's patient catalog and per-patient note logs.
//!
//! This crate contains pure data operations and file management:
//! - Operator login/logout and current-patient selection ([`session`])
//! - Patient catalog keyed by PHN, persisted as one JSON unit ([`repositories::catalog`])
//! - Per-patient note logs with monotonic codes, persisted as YAML units ([`repositories::notes`])
//! - The operation surface consumed by front ends ([`gateway`])
//!
//! **No presentation concerns**: argument parsing, terminal output and logging setup belong in
//! the `clinic` binary.

pub mod codec;
pub mod config;
pub mod constants;
pub mod credentials;
mod error;
pub mod gateway;
pub mod note;
pub mod patient;
pub mod record;
pub mod repositories;
pub mod session;

pub use config::{CoreConfig, StorageMode};
pub use constants::DEFAULT_DATA_DIR;
pub use credentials::{CredentialStore, CredentialVerifier, PlainTextVerifier, Sha256Verifier};
pub use error::{ClinicError, ClinicResult, ErrorKind};
pub use gateway::Gateway;
pub use note::{Note, NoteCode};
pub use patient::{Patient, PatientDetails, Phn};
