//! The clinic's operation surface.
//!
//! [`Gateway`] is the single entry point consumed by front ends. Every call first goes through
//! the [`Session`] access checks and then delegates to the [`PatientCatalog`] or to the
//! current patient's [`PatientRecord`]:
//!
//! ```text
//! Gateway -> Session (access) -> PatientCatalog / PatientRecord -> NoteLog -> storage unit
//! ```
//!
//! Validation failures have no side effects. A persistence failure during a mutating call is
//! reported after the in-memory change has been applied; see the catalog and note log docs.

use crate::config::{CoreConfig, StorageMode};
use crate::credentials::{CredentialStore, PlainTextVerifier, Sha256Verifier};
use crate::note::{Note, NoteCode};
use crate::patient::{Patient, PatientDetails, Phn};
use crate::record::PatientRecord;
use crate::repositories::catalog::PatientCatalog;
use crate::session::Session;
use crate::{ClinicError, ClinicResult};
use std::sync::Arc;

#[derive(Debug)]
pub struct Gateway {
    session: Session,
    catalog: PatientCatalog,
    credentials: CredentialStore,
}

impl Gateway {
    /// Builds a gateway from startup configuration.
    ///
    /// In-memory mode compares plain-text passwords against the built-in identities.
    /// Persistent mode stores SHA-256 digests, merges the configured credentials file if
    /// any, and loads the patient catalog.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the credentials file or the catalog cannot be loaded.
    pub fn new(cfg: Arc<CoreConfig>) -> ClinicResult<Self> {
        let credentials = match cfg.storage_mode() {
            StorageMode::InMemory => CredentialStore::with_defaults(Box::new(PlainTextVerifier)),
            StorageMode::Persistent => {
                let mut store = CredentialStore::with_defaults(Box::new(Sha256Verifier));
                if let Some(path) = cfg.users_file() {
                    store.load_file(path)?;
                }
                store
            }
        };
        Self::with_credentials(cfg, credentials)
    }

    /// Builds a gateway with an explicit credential store.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the catalog cannot be loaded.
    pub fn with_credentials(
        cfg: Arc<CoreConfig>,
        credentials: CredentialStore,
    ) -> ClinicResult<Self> {
        Ok(Self {
            session: Session::new(),
            catalog: PatientCatalog::open(cfg)?,
            credentials,
        })
    }

    pub fn login(&mut self, username: &str, password: &str) -> ClinicResult<()> {
        self.session.login(&self.credentials, username, password)
    }

    pub fn logout(&mut self) -> ClinicResult<()> {
        self.session.logout()
    }

    /// Username of the logged-in operator, if any.
    pub fn username(&self) -> Option<&str> {
        self.session.operator()
    }

    pub fn search_patient(&self, phn: Phn) -> ClinicResult<Option<&Patient>> {
        self.session.check_access()?;
        Ok(self.catalog.search(phn))
    }

    pub fn create_patient(&mut self, details: PatientDetails) -> ClinicResult<&Patient> {
        self.session.check_access()?;
        self.catalog.create(details)
    }

    /// Patients whose name contains `name`, ignoring case.
    pub fn retrieve_patients(&self, name: &str) -> ClinicResult<Vec<&Patient>> {
        self.session.check_access()?;
        Ok(self.catalog.retrieve(name))
    }

    /// Replaces the patient registered under `original_phn`, possibly under a new PHN.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::IllegalOperation`] if `original_phn` is not registered, if it is
    /// the current patient, or if the new PHN belongs to another patient.
    pub fn update_patient(
        &mut self,
        original_phn: Phn,
        details: PatientDetails,
    ) -> ClinicResult<()> {
        self.session.check_access()?;
        if !self.catalog.contains(original_phn) {
            return Err(ClinicError::illegal(format!(
                "patient with PHN {original_phn} not found"
            )));
        }
        if self.session.is_current(original_phn) {
            return Err(ClinicError::illegal("cannot update the current patient"));
        }
        self.catalog.update(original_phn, details)?;
        Ok(())
    }

    /// Removes a patient from the catalog and archives its notes.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::IllegalOperation`] if the patient is the current patient or is
    /// not registered.
    pub fn delete_patient(&mut self, phn: Phn) -> ClinicResult<()> {
        self.session.check_access()?;
        if self.session.is_current(phn) {
            return Err(ClinicError::illegal("cannot delete the current patient"));
        }
        let patient = self.catalog.delete(phn)?;
        patient.into_record().archive()
    }

    pub fn list_patients(&self) -> ClinicResult<Vec<&Patient>> {
        self.session.check_access()?;
        Ok(self.catalog.list())
    }

    /// Selects the patient whose notes subsequent note operations act on.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::IllegalOperation`] if the patient is not registered.
    pub fn set_current_patient(&mut self, phn: Phn) -> ClinicResult<()> {
        self.session.check_access()?;
        if !self.catalog.contains(phn) {
            return Err(ClinicError::illegal(format!(
                "patient with PHN {phn} does not exist"
            )));
        }
        self.session.set_current_patient(phn);
        Ok(())
    }

    pub fn get_current_patient(&self) -> ClinicResult<Option<&Patient>> {
        self.session.check_access()?;
        Ok(self
            .session
            .current_patient()
            .and_then(|phn| self.catalog.search(phn)))
    }

    pub fn unset_current_patient(&mut self) -> ClinicResult<()> {
        self.session.check_access()?;
        self.session.unset_current_patient();
        Ok(())
    }

    pub fn search_note(&mut self, code: NoteCode) -> ClinicResult<Option<&Note>> {
        self.current_record()?.search_note(code)
    }

    pub fn create_note(&mut self, text: &str) -> ClinicResult<Note> {
        self.current_record()?.create_note(text)
    }

    /// Current patient's notes containing `query`, ignoring case, in creation order.
    pub fn retrieve_notes(&mut self, query: &str) -> ClinicResult<Vec<&Note>> {
        self.current_record()?.retrieve_notes(query)
    }

    pub fn update_note(&mut self, code: NoteCode, text: &str) -> ClinicResult<bool> {
        self.current_record()?.update_note(code, text)
    }

    pub fn delete_note(&mut self, code: NoteCode) -> ClinicResult<bool> {
        self.current_record()?.delete_note(code)
    }

    /// Current patient's notes, most recently created first.
    pub fn list_notes(&mut self) -> ClinicResult<Vec<&Note>> {
        self.current_record()?.list_notes()
    }

    fn current_record(&mut self) -> ClinicResult<&mut PatientRecord> {
        let phn = self.session.require_current_patient()?;
        self.catalog
            .search_mut(phn)
            .map(Patient::record_mut)
            .ok_or_else(|| {
                ClinicError::illegal(format!("current patient {phn} is no longer registered"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::credentials::CredentialVerifier;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn jane() -> PatientDetails {
        PatientDetails::new(
            123,
            "Jane Doe",
            "1985-07-21",
            "250 555 0123",
            "jane.doe@example.com",
            "12 Cook St, Victoria",
        )
    }

    fn john() -> PatientDetails {
        PatientDetails::new(
            456,
            "John Roe",
            "1979-11-02",
            "250 555 0456",
            "john.roe@example.com",
            "34 Fort St, Victoria",
        )
    }

    fn logged_in() -> Gateway {
        let mut gateway = Gateway::new(Arc::new(CoreConfig::in_memory())).unwrap();
        gateway.login("user", "123456").unwrap();
        gateway
    }

    fn persistent_cfg(dir: &Path, users_file: Option<PathBuf>) -> Arc<CoreConfig> {
        let cfg = CoreConfig::new(dir.to_path_buf(), StorageMode::Persistent, users_file);
        Arc::new(cfg.unwrap())
    }

    #[test]
    fn note_codes_and_ordering_scenario() {
        let mut gateway = logged_in();
        gateway.create_patient(jane()).unwrap();
        gateway.set_current_patient(123).unwrap();

        let first = gateway.create_note("initial visit").unwrap();
        assert_eq!(first.code, 1);
        let second = gateway.create_note("follow-up").unwrap();
        assert_eq!(second.code, 2);

        let listed: Vec<NoteCode> = gateway.list_notes().unwrap().iter().map(|n| n.code).collect();
        assert_eq!(listed, vec![2, 1]);

        assert!(gateway.delete_note(1).unwrap());
        assert_eq!(gateway.create_note("x").unwrap().code, 3);
    }

    #[test]
    fn list_notes_returns_most_recent_first() {
        let mut gateway = logged_in();
        gateway.create_patient(jane()).unwrap();
        gateway.set_current_patient(123).unwrap();

        let a = gateway.create_note("A").unwrap();
        let b = gateway.create_note("B").unwrap();
        let c = gateway.create_note("C").unwrap();

        assert_eq!(gateway.list_notes().unwrap(), vec![&c, &b, &a]);
    }

    #[test]
    fn note_operations_act_on_current_patient_only() {
        let mut gateway = logged_in();
        gateway.create_patient(jane()).unwrap();
        gateway.create_patient(john()).unwrap();

        gateway.set_current_patient(123).unwrap();
        gateway.create_note("Jane: chest pain").unwrap();
        gateway.set_current_patient(456).unwrap();
        gateway.create_note("John: routine check").unwrap();

        assert!(gateway.retrieve_notes("chest").unwrap().is_empty());
        assert_eq!(gateway.search_note(1).unwrap().unwrap().text, "John: routine check");
        assert!(gateway.update_note(1, "John: routine check, all clear").unwrap());
        assert!(!gateway.update_note(2, "missing").unwrap());

        gateway.set_current_patient(123).unwrap();
        assert_eq!(gateway.retrieve_notes("CHEST").unwrap().len(), 1);
        assert!(!gateway.delete_note(7).unwrap());
    }

    #[test]
    fn operations_while_logged_out_are_illegal_access() {
        let mut gateway = Gateway::new(Arc::new(CoreConfig::in_memory())).unwrap();

        assert_eq!(gateway.search_patient(123).unwrap_err().kind(), ErrorKind::IllegalAccess);
        assert_eq!(gateway.create_patient(jane()).unwrap_err().kind(), ErrorKind::IllegalAccess);
        assert_eq!(gateway.retrieve_patients("Jane").unwrap_err().kind(), ErrorKind::IllegalAccess);
        assert_eq!(gateway.update_patient(123, jane()).unwrap_err().kind(), ErrorKind::IllegalAccess);
        assert_eq!(gateway.delete_patient(123).unwrap_err().kind(), ErrorKind::IllegalAccess);
        assert_eq!(gateway.list_patients().unwrap_err().kind(), ErrorKind::IllegalAccess);
        assert_eq!(gateway.set_current_patient(123).unwrap_err().kind(), ErrorKind::IllegalAccess);
        assert_eq!(gateway.get_current_patient().unwrap_err().kind(), ErrorKind::IllegalAccess);
        assert_eq!(gateway.unset_current_patient().unwrap_err().kind(), ErrorKind::IllegalAccess);
        assert_eq!(gateway.search_note(1).unwrap_err().kind(), ErrorKind::IllegalAccess);
        assert_eq!(gateway.create_note("x").unwrap_err().kind(), ErrorKind::IllegalAccess);
        assert_eq!(gateway.retrieve_notes("x").unwrap_err().kind(), ErrorKind::IllegalAccess);
        assert_eq!(gateway.update_note(1, "x").unwrap_err().kind(), ErrorKind::IllegalAccess);
        assert_eq!(gateway.delete_note(1).unwrap_err().kind(), ErrorKind::IllegalAccess);
        assert_eq!(gateway.list_notes().unwrap_err().kind(), ErrorKind::IllegalAccess);
    }

    #[test]
    fn note_operations_without_current_patient_fail() {
        let mut gateway = logged_in();
        gateway.create_patient(jane()).unwrap();

        assert_eq!(gateway.create_note("x").unwrap_err().kind(), ErrorKind::NoCurrentPatient);
        assert_eq!(gateway.list_notes().unwrap_err().kind(), ErrorKind::NoCurrentPatient);
        assert_eq!(gateway.search_note(1).unwrap_err().kind(), ErrorKind::NoCurrentPatient);

        gateway.set_current_patient(123).unwrap();
        gateway.unset_current_patient().unwrap();
        assert!(gateway.get_current_patient().unwrap().is_none());
        assert_eq!(gateway.delete_note(1).unwrap_err().kind(), ErrorKind::NoCurrentPatient);
    }

    #[test]
    fn login_and_logout_state_machine() {
        let mut gateway = Gateway::new(Arc::new(CoreConfig::in_memory())).unwrap();

        assert_eq!(gateway.logout().unwrap_err().kind(), ErrorKind::InvalidLogout);
        assert_eq!(gateway.login("user", "nope").unwrap_err().kind(), ErrorKind::InvalidLogin);

        gateway.login("user", "123456").unwrap();
        assert_eq!(gateway.username(), Some("user"));
        assert_eq!(gateway.login("user", "123456").unwrap_err().kind(), ErrorKind::DuplicateLogin);
        assert_eq!(
            gateway.login("ali", "@G00dPassw0rd").unwrap_err().kind(),
            ErrorKind::DuplicateLogin
        );

        gateway.logout().unwrap();
        assert_eq!(gateway.username(), None);
        gateway.login("ali", "@G00dPassw0rd").unwrap();
    }

    #[test]
    fn logout_clears_current_patient() {
        let mut gateway = logged_in();
        gateway.create_patient(jane()).unwrap();
        gateway.set_current_patient(123).unwrap();

        gateway.logout().unwrap();
        gateway.login("user", "123456").unwrap();
        assert!(gateway.get_current_patient().unwrap().is_none());
    }

    #[test]
    fn set_current_patient_requires_existing_patient() {
        let mut gateway = logged_in();
        assert_eq!(
            gateway.set_current_patient(999).unwrap_err().kind(),
            ErrorKind::IllegalOperation
        );

        gateway.create_patient(jane()).unwrap();
        gateway.set_current_patient(123).unwrap();
        assert_eq!(gateway.get_current_patient().unwrap().unwrap().name(), "Jane Doe");
    }

    #[test]
    fn create_duplicate_patient_fails() {
        let mut gateway = logged_in();
        gateway.create_patient(jane()).unwrap();

        let mut impostor = john();
        impostor.phn = 123;
        assert_eq!(
            gateway.create_patient(impostor).unwrap_err().kind(),
            ErrorKind::IllegalOperation
        );
        assert_eq!(gateway.search_patient(123).unwrap().unwrap().name(), "Jane Doe");
        assert_eq!(gateway.list_patients().unwrap().len(), 1);
    }

    #[test]
    fn current_patient_cannot_be_deleted_or_updated() {
        let mut gateway = logged_in();
        gateway.create_patient(jane()).unwrap();
        gateway.set_current_patient(123).unwrap();

        assert_eq!(gateway.delete_patient(123).unwrap_err().kind(), ErrorKind::IllegalOperation);
        let mut renamed = jane();
        renamed.name = "Jane Smith".into();
        assert_eq!(
            gateway.update_patient(123, renamed.clone()).unwrap_err().kind(),
            ErrorKind::IllegalOperation
        );

        assert_eq!(gateway.search_patient(123).unwrap().unwrap().name(), "Jane Doe");
        assert_eq!(gateway.get_current_patient().unwrap().unwrap().phn(), 123);

        gateway.unset_current_patient().unwrap();
        gateway.update_patient(123, renamed).unwrap();
        assert_eq!(gateway.search_patient(123).unwrap().unwrap().name(), "Jane Smith");
        gateway.delete_patient(123).unwrap();
        assert!(gateway.search_patient(123).unwrap().is_none());
    }

    #[test]
    fn update_to_taken_phn_fails_without_mutation() {
        let mut gateway = logged_in();
        gateway.create_patient(jane()).unwrap();
        gateway.create_patient(john()).unwrap();

        let mut moved = jane();
        moved.phn = 456;
        assert_eq!(
            gateway.update_patient(123, moved).unwrap_err().kind(),
            ErrorKind::IllegalOperation
        );
        let unchanged = Patient::new(jane(), Arc::new(CoreConfig::in_memory()));
        assert_eq!(gateway.search_patient(123).unwrap().unwrap(), &unchanged);
        assert_eq!(gateway.search_patient(456).unwrap().unwrap().name(), "John Roe");
    }

    #[test]
    fn update_and_delete_unknown_patient_fail() {
        let mut gateway = logged_in();
        assert_eq!(
            gateway.update_patient(123, jane()).unwrap_err().kind(),
            ErrorKind::IllegalOperation
        );
        assert_eq!(gateway.delete_patient(123).unwrap_err().kind(), ErrorKind::IllegalOperation);
    }

    #[test]
    fn retrieve_patients_by_name_substring() {
        let mut gateway = logged_in();
        gateway.create_patient(jane()).unwrap();
        gateway.create_patient(john()).unwrap();

        assert_eq!(gateway.retrieve_patients("jane").unwrap().len(), 1);
        assert_eq!(gateway.retrieve_patients("o").unwrap().len(), 2);
        assert!(gateway.retrieve_patients("Zed").unwrap().is_empty());
    }

    #[test]
    fn persistent_gateway_survives_restart() {
        let temp = TempDir::new().unwrap();
        let cfg = persistent_cfg(temp.path(), None);

        let (first, second) = {
            let mut gateway = Gateway::new(cfg.clone()).unwrap();
            gateway.login("user", "123456").unwrap();
            gateway.create_patient(jane()).unwrap();
            gateway.create_patient(john()).unwrap();
            gateway.set_current_patient(123).unwrap();
            let first = gateway.create_note("initial visit").unwrap();
            let second = gateway.create_note("follow-up").unwrap();
            gateway.logout().unwrap();
            (first, second)
        };

        let mut gateway = Gateway::new(cfg).unwrap();
        gateway.login("user", "123456").unwrap();
        assert_eq!(gateway.list_patients().unwrap().len(), 2);
        assert_eq!(gateway.search_patient(456).unwrap().unwrap().details(), &john());

        gateway.set_current_patient(123).unwrap();
        let notes: Vec<Note> = gateway.list_notes().unwrap().into_iter().cloned().collect();
        assert_eq!(notes, vec![second.clone(), first.clone()]);
        assert_eq!(notes[0].timestamp, second.timestamp);
        assert_eq!(notes[1].timestamp, first.timestamp);
        assert_eq!(gateway.create_note("third").unwrap().code, 3);
    }

    #[test]
    fn renamed_patient_keeps_notes_across_restart() {
        let temp = TempDir::new().unwrap();
        let cfg = persistent_cfg(temp.path(), None);

        {
            let mut gateway = Gateway::new(cfg.clone()).unwrap();
            gateway.login("user", "123456").unwrap();
            gateway.create_patient(jane()).unwrap();
            gateway.set_current_patient(123).unwrap();
            gateway.create_note("initial visit").unwrap();
            gateway.unset_current_patient().unwrap();

            let mut moved = jane();
            moved.phn = 789;
            gateway.update_patient(123, moved).unwrap();
        }

        let mut gateway = Gateway::new(cfg).unwrap();
        gateway.login("user", "123456").unwrap();
        assert!(gateway.search_patient(123).unwrap().is_none());
        gateway.set_current_patient(789).unwrap();
        assert_eq!(gateway.list_notes().unwrap()[0].text, "initial visit");
    }

    #[test]
    fn deleted_patient_notes_are_archived() {
        let temp = TempDir::new().unwrap();
        let cfg = persistent_cfg(temp.path(), None);

        let mut gateway = Gateway::new(cfg.clone()).unwrap();
        gateway.login("user", "123456").unwrap();
        gateway.create_patient(jane()).unwrap();
        gateway.set_current_patient(123).unwrap();
        gateway.create_note("initial visit").unwrap();
        gateway.unset_current_patient().unwrap();

        gateway.delete_patient(123).unwrap();
        assert!(!cfg.note_file(123).exists());

        gateway.create_patient(jane()).unwrap();
        gateway.set_current_patient(123).unwrap();
        assert!(gateway.list_notes().unwrap().is_empty());
        assert_eq!(gateway.create_note("fresh start").unwrap().code, 1);
    }

    #[test]
    fn persistent_mode_uses_digests_and_credentials_file() {
        let temp = TempDir::new().unwrap();
        let users = temp.path().join("users.txt");
        fs::write(&users, format!("nurse,{}\n", Sha256Verifier.hash("s3cret"))).unwrap();
        let cfg = persistent_cfg(&temp.path().join("data"), Some(users));

        let mut gateway = Gateway::new(cfg).unwrap();
        gateway.login("nurse", "s3cret").unwrap();
        gateway.logout().unwrap();
        gateway.login("user", "123456").unwrap();
    }

    #[test]
    fn missing_credentials_file_fails_startup() {
        let temp = TempDir::new().unwrap();
        let cfg = persistent_cfg(temp.path(), Some(temp.path().join("absent.txt")));

        let err = Gateway::new(cfg).expect_err("missing credentials file should fail");
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
    }

    #[test]
    fn deleting_a_reused_phn_keeps_every_archived_log() {
        let temp = TempDir::new().unwrap();
        let cfg = persistent_cfg(temp.path(), None);

        let mut gateway = Gateway::new(cfg.clone()).unwrap();
        gateway.login("user", "123456").unwrap();
        for text in ["first registration", "second registration"] {
            gateway.create_patient(jane()).unwrap();
            gateway.set_current_patient(123).unwrap();
            gateway.create_note(text).unwrap();
            gateway.unset_current_patient().unwrap();
            gateway.delete_patient(123).unwrap();
        }

        let archived: Vec<String> = fs::read_dir(cfg.records_dir().join("archive"))
            .unwrap()
            .flatten()
            .map(|entry| fs::read_to_string(entry.path()).unwrap())
            .collect();
        assert_eq!(archived.len(), 2);
        assert!(archived.iter().any(|unit| unit.contains("first registration")));
        assert!(archived.iter().any(|unit| unit.contains("second registration")));
    }
}
