//! Operator session and current-patient selection.
//!
//! A [`Session`] has two independent axes:
//!
//! - **login**: `LoggedOut -> LoggedIn` via [`Session::login`], back via [`Session::logout`].
//!   At most one operator is logged in at a time.
//! - **current patient**: an optional PHN selected while logged in. Logging out clears it.
//!
//! The session does not own patients. It stores the selected PHN and the gateway resolves it
//! against the catalog.

use crate::credentials::CredentialStore;
use crate::patient::Phn;
use crate::{ClinicError, ClinicResult};

#[derive(Clone, Debug, Default)]
pub struct Session {
    operator: Option<String>,
    current_patient: Option<Phn>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_logged_in(&self) -> bool {
        self.operator.is_some()
    }

    /// Username of the logged-in operator.
    pub fn operator(&self) -> Option<&str> {
        self.operator.as_deref()
    }

    /// Logs an operator in.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::DuplicateLogin`] if someone is already logged in, or
    /// [`ClinicError::InvalidLogin`] if the username is unknown or the password does not match.
    pub fn login(
        &mut self,
        credentials: &CredentialStore,
        username: &str,
        password: &str,
    ) -> ClinicResult<()> {
        if self.operator.is_some() {
            return Err(ClinicError::DuplicateLogin);
        }
        if !credentials.verify(username, password) {
            tracing::warn!("rejected login for '{username}'");
            return Err(ClinicError::InvalidLogin);
        }

        self.operator = Some(username.to_string());
        tracing::info!("operator '{username}' logged in");
        Ok(())
    }

    /// Logs the operator out and clears the current patient.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::InvalidLogout`] if nobody is logged in.
    pub fn logout(&mut self) -> ClinicResult<()> {
        let Some(operator) = self.operator.take() else {
            return Err(ClinicError::InvalidLogout);
        };
        self.current_patient = None;
        tracing::info!("operator '{operator}' logged out");
        Ok(())
    }

    /// Fails with [`ClinicError::IllegalAccess`] unless logged in.
    pub fn check_access(&self) -> ClinicResult<()> {
        if self.operator.is_none() {
            return Err(ClinicError::IllegalAccess);
        }
        Ok(())
    }

    /// Returns the current patient, requiring a login first.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::IllegalAccess`] when logged out, then
    /// [`ClinicError::NoCurrentPatient`] when no patient is selected.
    pub fn require_current_patient(&self) -> ClinicResult<Phn> {
        self.check_access()?;
        self.current_patient.ok_or(ClinicError::NoCurrentPatient)
    }

    pub fn current_patient(&self) -> Option<Phn> {
        self.current_patient
    }

    /// Selects `phn`. The caller has already checked that the patient exists.
    pub fn set_current_patient(&mut self, phn: Phn) {
        self.current_patient = Some(phn);
    }

    pub fn unset_current_patient(&mut self) {
        self.current_patient = None;
    }

    /// Whether `phn` is the currently selected patient.
    pub fn is_current(&self, phn: Phn) -> bool {
        self.current_patient == Some(phn)
    }
}
