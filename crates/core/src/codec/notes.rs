//! Note log wire model.
//!
//! Each patient's notes are stored as one YAML sequence, oldest first:
//!
//! ```text
//! - code: 1
//!   text: initial visit
//!   timestamp: 2024-03-14 09:00:00
//! - code: 3
//!   text: follow-up
//!   timestamp: 2024-03-21 10:15:00
//! ```
//!
//! The next note code is not stored. It is always derived from the loaded codes.

use super::schema_mismatch;
use crate::constants::TIMESTAMP_FORMAT;
use crate::note::{Note, NoteCode};
use crate::{ClinicError, ClinicResult};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct NoteWire {
    code: NoteCode,
    text: String,
    timestamp: String,
}

/// Render notes, in the given order, as the YAML text of a note unit.
///
/// # Errors
///
/// Returns [`ClinicError::NoteSerialization`] if YAML serialisation fails.
pub fn render<'a>(notes: impl IntoIterator<Item = &'a Note>) -> ClinicResult<String> {
    let wire: Vec<NoteWire> = notes
        .into_iter()
        .map(|n| NoteWire {
            code: n.code,
            text: n.text.clone(),
            timestamp: n.formatted_timestamp(),
        })
        .collect();

    serde_yaml::to_string(&wire).map_err(ClinicError::NoteSerialization)
}

/// Parse the YAML text of a note unit, preserving stored order.
///
/// Blank text is an empty log.
///
/// # Errors
///
/// Returns:
/// - [`ClinicError::SchemaMismatch`] if the YAML does not match the note schema or a code
///   appears twice,
/// - [`ClinicError::InvalidTimestamp`] if a timestamp is not `YYYY-MM-DD HH:MM:SS`.
pub fn parse(yaml_text: &str) -> ClinicResult<Vec<Note>> {
    if yaml_text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
    let wire: Vec<NoteWire> = match serde_path_to_error::deserialize(deserializer) {
        Ok(parsed) => parsed,
        Err(err) => {
            let path = err.path().to_string();
            return Err(schema_mismatch(path, err.into_inner()));
        }
    };

    let mut seen = HashSet::with_capacity(wire.len());
    let mut notes = Vec::with_capacity(wire.len());
    for (index, entry) in wire.into_iter().enumerate() {
        if !seen.insert(entry.code) {
            return Err(schema_mismatch(
                format!("[{index}].code"),
                format!("duplicate note code {}", entry.code),
            ));
        }
        let timestamp = NaiveDateTime::parse_from_str(&entry.timestamp, TIMESTAMP_FORMAT)
            .map_err(|_| ClinicError::InvalidTimestamp(entry.timestamp.clone()))?;
        notes.push(Note::new(entry.code, entry.text, timestamp));
    }

    Ok(notes)
}
