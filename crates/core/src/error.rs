//! Error types for the clinic core.
//!
//! Every operation in this crate returns [`ClinicResult`]. Callers that only care about the
//! broad category of a failure should match on [`ClinicError::kind`] rather than on the
//! individual variants.

/// Broad category of a [`ClinicError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Login attempted while already logged in.
    DuplicateLogin,
    /// Unknown identity or credential mismatch.
    InvalidLogin,
    /// Logout attempted while not logged in.
    InvalidLogout,
    /// Gated operation attempted while logged out.
    IllegalAccess,
    /// Note operation attempted with no current patient selected.
    NoCurrentPatient,
    /// Business-rule violation.
    IllegalOperation,
    /// Storage read/write failure. In-memory and on-disk state may have diverged.
    PersistenceFailure,
}

#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error("user is already logged in")]
    DuplicateLogin,
    #[error("invalid username or password")]
    InvalidLogin,
    #[error("user is not currently logged in")]
    InvalidLogout,
    #[error("user must be logged in to perform this action")]
    IllegalAccess,
    #[error("no current patient set")]
    NoCurrentPatient,
    #[error("illegal operation: {0}")]
    IllegalOperation(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read storage unit: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write storage unit: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize patients: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize patients: {0}")]
    Deserialization(serde_json::Error),
    #[error("failed to serialize notes: {0}")]
    NoteSerialization(serde_yaml::Error),
    #[error("failed to deserialize notes: {0}")]
    NoteDeserialization(serde_yaml::Error),
    #[error("schema mismatch at {path}: {message}")]
    SchemaMismatch { path: String, message: String },
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("failed to read credentials file: {0}")]
    CredentialsRead(std::io::Error),
    #[error("malformed credentials entry on line {line}")]
    MalformedCredentials { line: usize },
}

impl ClinicError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClinicError::DuplicateLogin => ErrorKind::DuplicateLogin,
            ClinicError::InvalidLogin => ErrorKind::InvalidLogin,
            ClinicError::InvalidLogout => ErrorKind::InvalidLogout,
            ClinicError::IllegalAccess => ErrorKind::IllegalAccess,
            ClinicError::NoCurrentPatient => ErrorKind::NoCurrentPatient,
            ClinicError::IllegalOperation(_) | ClinicError::InvalidConfig(_) => {
                ErrorKind::IllegalOperation
            }
            ClinicError::StorageDirCreation(_)
            | ClinicError::FileRead(_)
            | ClinicError::FileWrite(_)
            | ClinicError::Serialization(_)
            | ClinicError::Deserialization(_)
            | ClinicError::NoteSerialization(_)
            | ClinicError::NoteDeserialization(_)
            | ClinicError::SchemaMismatch { .. }
            | ClinicError::InvalidTimestamp(_)
            | ClinicError::CredentialsRead(_)
            | ClinicError::MalformedCredentials { .. } => ErrorKind::PersistenceFailure,
        }
    }

    pub(crate) fn illegal(message: impl Into<String>) -> Self {
        ClinicError::IllegalOperation(message.into())
    }
}

pub type ClinicResult<T> = std::result::Result<T, ClinicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_are_persistence_failures() {
        let err = ClinicError::FileRead(std::io::Error::other("disk gone"));
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);

        let err = ClinicError::MalformedCredentials { line: 3 };
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert_eq!(err.to_string(), "malformed credentials entry on line 3");
    }

    #[test]
    fn config_errors_are_illegal_operations() {
        let err = ClinicError::InvalidConfig("data_dir cannot be empty".into());
        assert_eq!(err.kind(), ErrorKind::IllegalOperation);
    }
}
