//! Patient entity and the value bundle used to create or update one.

use crate::config::CoreConfig;
use crate::record::PatientRecord;
use std::sync::Arc;

/// Personal health number. Unique across the catalog.
pub type Phn = u64;

/// Demographic fields of a patient, without the record.
///
/// Apart from `phn`, every field is opaque text at this layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientDetails {
    pub phn: Phn,
    pub name: String,
    pub birth_date: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

impl PatientDetails {
    pub fn new(
        phn: Phn,
        name: impl Into<String>,
        birth_date: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            phn,
            name: name.into(),
            birth_date: birth_date.into(),
            phone: phone.into(),
            email: email.into(),
            address: address.into(),
        }
    }
}

/// A patient in the catalog, owning its [`PatientRecord`].
///
/// The identifier is read-only here: changing it goes through
/// [`PatientCatalog::update`](crate::repositories::catalog::PatientCatalog::update), which
/// re-keys the catalog entry and the record together.
#[derive(Debug)]
pub struct Patient {
    details: PatientDetails,
    record: PatientRecord,
}

impl Patient {
    /// Creates a patient whose record inherits the storage mode in `cfg`.
    pub fn new(details: PatientDetails, cfg: Arc<CoreConfig>) -> Self {
        let record = PatientRecord::new(details.phn, cfg);
        Self { details, record }
    }

    pub fn phn(&self) -> Phn {
        self.details.phn
    }

    pub fn name(&self) -> &str {
        &self.details.name
    }

    pub fn birth_date(&self) -> &str {
        &self.details.birth_date
    }

    pub fn phone(&self) -> &str {
        &self.details.phone
    }

    pub fn email(&self) -> &str {
        &self.details.email
    }

    pub fn address(&self) -> &str {
        &self.details.address
    }

    pub fn details(&self) -> &PatientDetails {
        &self.details
    }

    pub fn record(&self) -> &PatientRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut PatientRecord {
        &mut self.record
    }

    /// Replaces the demographic fields, keeping the record.
    pub(crate) fn replace_details(&mut self, details: PatientDetails) {
        self.details = details;
    }

    pub(crate) fn into_record(self) -> PatientRecord {
        self.record
    }
}

impl PartialEq for Patient {
    fn eq(&self, other: &Self) -> bool {
        self.details == other.details
    }
}

impl Eq for Patient {}

impl std::fmt::Display for Patient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let d = &self.details;
        write!(
            f,
            "{}; {}; {}; {}; {}; {}",
            d.phn, d.name, d.birth_date, d.phone, d.email, d.address
        )
    }
}
