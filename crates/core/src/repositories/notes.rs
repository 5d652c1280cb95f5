//! Per-patient note log.
//!
//! A [`NoteLog`] owns the ordered notes of exactly one patient and allocates their codes.
//! In persistent mode it is backed by one note unit, `records/<phn>.yaml`, which is
//! rewritten in full after every successful mutation.
//!
//! ## Code allocation
//!
//! Codes start at 1 and increase by one for every created note. Deleting a note never frees
//! its code for the lifetime of the log. When a log is loaded, the counter is recomputed as
//! `max(loaded codes) + 1` (or 1 for an empty log); it is never read back from storage.

use super::helpers::{read_unit, write_unit};
use crate::codec::notes;
use crate::config::CoreConfig;
use crate::note::{now_timestamp, Note, NoteCode};
use crate::patient::Phn;
use crate::codec::schema_mismatch;
use crate::{ClinicError, ClinicResult};
use chrono::NaiveDateTime;
use std::path::PathBuf;

/// Ordered notes of one patient, oldest first, plus the next-code counter.
#[derive(Clone, Debug)]
pub struct NoteLog {
    phn: Phn,
    notes: Vec<Note>,
    next_code: NoteCode,
    /// Backing note unit. `None` in memory-only mode.
    unit: Option<PathBuf>,
}

impl NoteLog {
    /// Creates an empty log that is never written anywhere.
    pub fn in_memory(phn: Phn) -> Self {
        Self {
            phn,
            notes: Vec::new(),
            next_code: 1,
            unit: None,
        }
    }

    /// Opens the log for `phn` using the storage mode in `cfg`.
    ///
    /// In persistent mode the patient's note unit is loaded if it exists; a missing unit is an
    /// empty log and is only created on the first mutation.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the unit exists but cannot be read or parsed, or if its
    /// highest code leaves no room for another note.
    pub fn open(phn: Phn, cfg: &CoreConfig) -> ClinicResult<Self> {
        if !cfg.storage_mode().is_persistent() {
            return Ok(Self::in_memory(phn));
        }

        let unit = cfg.note_file(phn);
        let notes = match read_unit(&unit)? {
            Some(text) => notes::parse(&text)?,
            None => Vec::new(),
        };
        let next_code = next_code_after(&notes)?;

        tracing::debug!(
            "loaded {} notes for patient {phn}, next code {next_code}",
            notes.len()
        );

        Ok(Self {
            phn,
            notes,
            next_code,
            unit: Some(unit),
        })
    }

    pub fn phn(&self) -> Phn {
        self.phn
    }

    /// Code the next created note will receive.
    pub fn next_code(&self) -> NoteCode {
        self.next_code
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Looks a note up by code.
    pub fn search(&self, code: NoteCode) -> Option<&Note> {
        self.notes.iter().find(|n| n.code == code)
    }

    /// Appends a new note stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the note unit cannot be written. The note has already
    /// been appended in memory in that case.
    pub fn create(&mut self, text: impl Into<String>) -> ClinicResult<Note> {
        self.create_at(text, now_timestamp())
    }

    /// Appends a new note with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::IllegalOperation`] if the code space is exhausted. Otherwise
    /// see [`NoteLog::create`].
    pub fn create_at(
        &mut self,
        text: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> ClinicResult<Note> {
        let code = self.next_code;
        self.next_code = code.checked_add(1).ok_or_else(|| {
            ClinicError::illegal(format!("note codes exhausted for patient {}", self.phn))
        })?;

        let note = Note::new(code, text, timestamp);
        self.notes.push(note.clone());
        self.persist()?;
        Ok(note)
    }

    /// Notes whose text contains `query`, ignoring case, in creation order.
    pub fn retrieve(&self, query: &str) -> Vec<&Note> {
        let query = query.to_lowercase();
        self.notes
            .iter()
            .filter(|n| n.text.to_lowercase().contains(&query))
            .collect()
    }

    /// Replaces the text of the note with `code`. Returns whether the note was found.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the note unit cannot be written.
    pub fn update(&mut self, code: NoteCode, text: impl Into<String>) -> ClinicResult<bool> {
        let Some(note) = self.notes.iter_mut().find(|n| n.code == code) else {
            return Ok(false);
        };
        note.text = text.into();
        self.persist()?;
        Ok(true)
    }

    /// Removes the note with `code`. Returns whether the note was found.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the note unit cannot be written.
    pub fn delete(&mut self, code: NoteCode) -> ClinicResult<bool> {
        let Some(index) = self.notes.iter().position(|n| n.code == code) else {
            return Ok(false);
        };
        self.notes.remove(index);
        self.persist()?;
        Ok(true)
    }

    /// All notes, most recently created first.
    pub fn list(&self) -> Vec<&Note> {
        self.notes.iter().rev().collect()
    }

    /// Points the log at a new patient identifier and note unit.
    pub(crate) fn rebind(&mut self, phn: Phn, unit: Option<PathBuf>) {
        self.phn = phn;
        if self.unit.is_some() {
            self.unit = unit;
        }
    }

    /// Rewrites the whole note unit. No-op in memory-only mode.
    fn persist(&self) -> ClinicResult<()> {
        let Some(unit) = &self.unit else {
            return Ok(());
        };
        let text = notes::render(&self.notes)?;
        write_unit(unit, &text).inspect_err(|e| {
            tracing::warn!("failed to save notes for patient {}: {e}", self.phn);
        })
    }
}

fn next_code_after(notes: &[Note]) -> ClinicResult<NoteCode> {
    let Some((index, max)) = notes
        .iter()
        .map(|n| n.code)
        .enumerate()
        .max_by_key(|(_, code)| *code)
    else {
        return Ok(1);
    };
    max.checked_add(1)
        .ok_or_else(|| schema_mismatch(format!("[{index}].code"), "no code left after this one"))
}
