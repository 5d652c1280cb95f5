//! Operator credentials.
//!
//! Verification is a pluggable capability behind [`CredentialVerifier`]. The session only
//! ever asks whether a password matches a stored secret; it does not know whether that secret
//! is plain text or a digest.
//!
//! ## Credentials file
//!
//! One `username,secret` pair per line, where `secret` is already in the active scheme (a
//! lowercase hex SHA-256 digest for [`Sha256Verifier`]). Blank lines and lines starting with
//! `#` are ignored. Entries override the built-in identities of the same name.

use crate::constants::DEFAULT_USERS;
use crate::{ClinicError, ClinicResult};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;

/// Turns passwords into stored secrets and checks passwords against them.
pub trait CredentialVerifier: std::fmt::Debug + Send + Sync {
    /// Secret to store for `password`.
    fn hash(&self, password: &str) -> String;

    /// Whether `password` matches the stored `secret`.
    fn verify(&self, password: &str, secret: &str) -> bool {
        self.hash(password) == secret
    }
}

/// Stores passwords as given and compares them for equality.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainTextVerifier;

impl CredentialVerifier for PlainTextVerifier {
    fn hash(&self, password: &str) -> String {
        password.to_string()
    }
}

/// Stores lowercase hex SHA-256 digests.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Verifier;

impl CredentialVerifier for Sha256Verifier {
    fn hash(&self, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn verify(&self, password: &str, secret: &str) -> bool {
        self.hash(password).eq_ignore_ascii_case(secret.trim())
    }
}

/// Known operator identities and their stored secrets.
#[derive(Debug)]
pub struct CredentialStore {
    verifier: Box<dyn CredentialVerifier>,
    users: HashMap<String, String>,
}

impl CredentialStore {
    /// Creates a store holding only the built-in identities, hashed with `verifier`.
    pub fn with_defaults(verifier: Box<dyn CredentialVerifier>) -> Self {
        let users = DEFAULT_USERS
            .iter()
            .map(|(name, password)| (name.to_string(), verifier.hash(password)))
            .collect();
        Self { verifier, users }
    }

    /// Creates a store with no identities at all.
    pub fn empty(verifier: Box<dyn CredentialVerifier>) -> Self {
        Self {
            verifier,
            users: HashMap::new(),
        }
    }

    /// Adds or replaces an identity, hashing `password` with the active verifier.
    pub fn insert(&mut self, username: impl Into<String>, password: &str) {
        let secret = self.verifier.hash(password);
        self.users.insert(username.into(), secret);
    }

    /// Merges a credentials file into the store. Returns the number of entries read.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`ClinicError::CredentialsRead`] if the file cannot be read,
    /// - [`ClinicError::MalformedCredentials`] for a line without a `,` or with an empty field.
    pub fn load_file(&mut self, path: &Path) -> ClinicResult<usize> {
        let text = std::fs::read_to_string(path).map_err(ClinicError::CredentialsRead)?;
        let entries = parse_credentials(&text)?;
        let count = entries.len();
        self.users.extend(entries);

        tracing::info!("loaded {count} operator credentials from {}", path.display());
        Ok(count)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// Whether `username` is known and `password` matches its stored secret.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|secret| self.verifier.verify(password, secret))
    }
}

fn parse_credentials(text: &str) -> ClinicResult<Vec<(String, String)>> {
    let mut entries = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (username, secret) = line
            .split_once(',')
            .map(|(u, s)| (u.trim(), s.trim()))
            .filter(|(u, s)| !u.is_empty() && !s.is_empty())
            .ok_or(ClinicError::MalformedCredentials { line: index + 1 })?;
        entries.push((username.to_string(), secret.to_string()));
    }
    Ok(entries)
}
