//! Patient record: the owner of one patient's note log.

use crate::config::CoreConfig;
use crate::constants::{ARCHIVE_DIR_NAME, NOTE_FILE_EXTENSION};
use crate::note::{Note, NoteCode};
use crate::patient::Phn;
use crate::repositories::helpers::move_unit;
use crate::repositories::notes::NoteLog;
use crate::{ClinicError, ClinicResult};
use chrono::Local;
use std::sync::Arc;

/// Owns the [`NoteLog`] of one patient and forwards note operations to it.
///
/// The log is opened on first use with the storage mode of the owning catalog. Only the
/// identifier is ever serialised alongside the patient; notes are rehydrated from the
/// patient's own note unit.
#[derive(Clone, Debug)]
pub struct PatientRecord {
    phn: Phn,
    cfg: Arc<CoreConfig>,
    notes: Option<NoteLog>,
}

impl PatientRecord {
    pub fn new(phn: Phn, cfg: Arc<CoreConfig>) -> Self {
        Self {
            phn,
            cfg,
            notes: None,
        }
    }

    pub fn phn(&self) -> Phn {
        self.phn
    }

    /// Whether the note log has been opened yet.
    pub fn is_loaded(&self) -> bool {
        self.notes.is_some()
    }

    fn log(&mut self) -> ClinicResult<&mut NoteLog> {
        let log = match self.notes.take() {
            Some(log) => log,
            None => NoteLog::open(self.phn, &self.cfg)?,
        };
        Ok(self.notes.insert(log))
    }

    pub fn search_note(&mut self, code: NoteCode) -> ClinicResult<Option<&Note>> {
        Ok(self.log()?.search(code))
    }

    pub fn create_note(&mut self, text: impl Into<String>) -> ClinicResult<Note> {
        self.log()?.create(text)
    }

    pub fn retrieve_notes(&mut self, query: &str) -> ClinicResult<Vec<&Note>> {
        Ok(self.log()?.retrieve(query))
    }

    pub fn update_note(&mut self, code: NoteCode, text: impl Into<String>) -> ClinicResult<bool> {
        self.log()?.update(code, text)
    }

    pub fn delete_note(&mut self, code: NoteCode) -> ClinicResult<bool> {
        self.log()?.delete(code)
    }

    /// All notes, most recently created first.
    pub fn list_notes(&mut self) -> ClinicResult<Vec<&Note>> {
        Ok(self.log()?.list())
    }

    /// Moves this record, and its note unit if one exists, to a new identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::IllegalOperation`] if a note unit already exists for `new_phn`,
    /// or a persistence error if the unit cannot be moved. The record is unchanged on error.
    pub(crate) fn rekey(&mut self, new_phn: Phn) -> ClinicResult<()> {
        if new_phn == self.phn {
            return Ok(());
        }

        if self.cfg.storage_mode().is_persistent() {
            let from = self.cfg.note_file(self.phn);
            let to = self.cfg.note_file(new_phn);
            if to.exists() {
                return Err(ClinicError::illegal(format!(
                    "note storage for PHN {new_phn} already exists"
                )));
            }
            move_unit(&from, &to)?;
        }

        let unit = self.cfg.note_file(new_phn);
        if let Some(log) = self.notes.as_mut() {
            log.rebind(new_phn, Some(unit));
        }
        self.phn = new_phn;
        Ok(())
    }

    /// Moves the note unit out of the live records directory after the patient is deleted.
    ///
    /// Notes are kept under `records/archive/<phn>-<YYYYmmddHHMMSS>.yaml` so that a patient
    /// later created with the same identifier starts with an empty log. If that name is taken,
    /// a `-<n>` suffix is appended; an archived unit is never replaced.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the unit cannot be moved.
    pub(crate) fn archive(self) -> ClinicResult<()> {
        if !self.cfg.storage_mode().is_persistent() {
            return Ok(());
        }

        let unit = self.cfg.note_file(self.phn);
        if !unit.exists() {
            return Ok(());
        }

        let dir = self.cfg.records_dir().join(ARCHIVE_DIR_NAME);
        let stem = format!("{}-{}", self.phn, Local::now().format("%Y%m%d%H%M%S"));
        let mut target = dir.join(format!("{stem}.{NOTE_FILE_EXTENSION}"));
        let mut suffix = 1u32;
        while target.exists() {
            target = dir.join(format!("{stem}-{suffix}.{NOTE_FILE_EXTENSION}"));
            suffix += 1;
        }

        if move_unit(&unit, &target)? {
            tracing::info!("archived notes for patient {} to {}", self.phn, target.display());
        }
        Ok(())
    }
}
