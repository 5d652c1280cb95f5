//! Patient catalog.
//!
//! The catalog owns every [`Patient`] keyed by PHN. In persistent mode it is loaded once, in
//! full, when opened and the whole catalog is written back as one unit after every
//! successful `create`, `update` or `delete`. There are no partial writes.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//!   patients.json        # catalog unit (see crate::codec::patients)
//!   records/
//!     <phn>.yaml         # one note unit per patient (see crate::codec::notes)
//! ```
//!
//! ## Failure model
//!
//! A save failure is reported to the caller after the in-memory map has already changed.
//! Memory and disk may then disagree; nothing is rolled back automatically.

use super::helpers::{read_unit, write_unit};
use crate::codec::patients;
use crate::config::CoreConfig;
use crate::patient::{Patient, PatientDetails, Phn};
use crate::{ClinicError, ClinicResult};
use std::collections::HashMap;
use std::sync::Arc;

/// All patients of the clinic, keyed by PHN.
#[derive(Debug)]
pub struct PatientCatalog {
    cfg: Arc<CoreConfig>,
    patients: HashMap<Phn, Patient>,
}

impl PatientCatalog {
    /// Opens the catalog using the storage mode in `cfg`.
    ///
    /// In persistent mode the catalog unit is read once. If it does not exist yet, an empty
    /// catalog is written immediately so the unit is established.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the unit cannot be read, parsed or established.
    pub fn open(cfg: Arc<CoreConfig>) -> ClinicResult<Self> {
        let mut catalog = Self {
            cfg,
            patients: HashMap::new(),
        };

        if !catalog.cfg.storage_mode().is_persistent() {
            return Ok(catalog);
        }

        let unit = catalog.cfg.patients_file();
        match read_unit(&unit)? {
            Some(text) => {
                for details in patients::parse(&text)? {
                    let patient = Patient::new(details, catalog.cfg.clone());
                    catalog.patients.insert(patient.phn(), patient);
                }
                tracing::info!(
                    "loaded {} patients from {}",
                    catalog.patients.len(),
                    unit.display()
                );
            }
            None => {
                tracing::info!("no catalog at {}, creating an empty one", unit.display());
                catalog.persist()?;
            }
        }

        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn contains(&self, phn: Phn) -> bool {
        self.patients.contains_key(&phn)
    }

    /// Looks a patient up by PHN.
    pub fn search(&self, phn: Phn) -> Option<&Patient> {
        self.patients.get(&phn)
    }

    pub fn search_mut(&mut self, phn: Phn) -> Option<&mut Patient> {
        self.patients.get_mut(&phn)
    }

    /// Adds a new patient.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::IllegalOperation`] if the PHN is already registered, or a
    /// persistence error if the catalog cannot be saved.
    pub fn create(&mut self, details: PatientDetails) -> ClinicResult<&Patient> {
        let phn = details.phn;
        if self.patients.contains_key(&phn) {
            return Err(ClinicError::illegal(format!(
                "patient with PHN {phn} already exists"
            )));
        }

        self.patients
            .insert(phn, Patient::new(details, self.cfg.clone()));
        self.persist()?;

        tracing::info!("created patient {phn}");
        self.search(phn)
            .ok_or_else(|| ClinicError::illegal(format!("patient {phn} vanished after insert")))
    }

    /// Replaces the patient stored under `original_phn`.
    ///
    /// When `details.phn` differs from `original_phn` the entry is re-keyed, and the existing
    /// record moves with it so the patient keeps its notes.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::IllegalOperation`] if `original_phn` is not registered or if the
    /// new PHN already belongs to another patient. Neither entry is touched in those cases.
    /// Returns a persistence error if the note unit cannot be moved or the catalog cannot be
    /// saved.
    pub fn update(&mut self, original_phn: Phn, details: PatientDetails) -> ClinicResult<&Patient> {
        let new_phn = details.phn;
        if !self.patients.contains_key(&original_phn) {
            return Err(ClinicError::illegal(format!(
                "patient with PHN {original_phn} not found"
            )));
        }
        if new_phn != original_phn && self.patients.contains_key(&new_phn) {
            return Err(ClinicError::illegal(format!(
                "PHN {new_phn} is already registered to another patient"
            )));
        }

        if new_phn != original_phn {
            if let Some(patient) = self.patients.get_mut(&original_phn) {
                patient.record_mut().rekey(new_phn)?;
            }
        }

        let mut patient = self.patients.remove(&original_phn).ok_or_else(|| {
            ClinicError::illegal(format!("patient with PHN {original_phn} not found"))
        })?;
        patient.replace_details(details);
        self.patients.insert(new_phn, patient);
        self.persist()?;

        if new_phn == original_phn {
            tracing::info!("updated patient {new_phn}");
        } else {
            tracing::info!("updated patient {original_phn}, now registered as {new_phn}");
        }
        self.search(new_phn)
            .ok_or_else(|| ClinicError::illegal(format!("patient {new_phn} vanished after update")))
    }

    /// Removes a patient and returns it.
    ///
    /// The patient's note unit is left untouched; see
    /// [`Gateway::delete_patient`](crate::gateway::Gateway::delete_patient) for what happens to
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::IllegalOperation`] if the PHN is not registered, or a persistence
    /// error if the catalog cannot be saved.
    pub fn delete(&mut self, phn: Phn) -> ClinicResult<Patient> {
        let patient = self
            .patients
            .remove(&phn)
            .ok_or_else(|| ClinicError::illegal(format!("patient with PHN {phn} not found")))?;
        self.persist()?;

        tracing::info!("deleted patient {phn}");
        Ok(patient)
    }

    /// Patients whose name contains `query`, ignoring case. Order is unspecified.
    pub fn retrieve(&self, query: &str) -> Vec<&Patient> {
        let query = query.to_lowercase();
        self.patients
            .values()
            .filter(|p| p.name().to_lowercase().contains(&query))
            .collect()
    }

    /// Every patient, in unspecified order.
    pub fn list(&self) -> Vec<&Patient> {
        self.patients.values().collect()
    }

    /// Writes the whole catalog unit. No-op in memory-only mode.
    fn persist(&self) -> ClinicResult<()> {
        if !self.cfg.storage_mode().is_persistent() {
            return Ok(());
        }

        let text = patients::render(self.patients.values().map(Patient::details))?;
        write_unit(&self.cfg.patients_file(), &text).inspect_err(|e| {
            tracing::warn!("failed to save patient catalog: {e}");
        })
    }
}
