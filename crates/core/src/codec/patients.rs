//! Patient catalog wire model.
//!
//! The catalog is stored as one pretty-printed JSON array:
//!
//! ```text
//! [
//!   {
//!     "phn": 9790012000,
//!     "name": "John Doe",
//!     "birth_date": "2002-02-28",
//!     "phone": "250 203 1010",
//!     "email": "john.doe@gmail.com",
//!     "address": "300 Moss St, Victoria",
//!     "record": { "phn": 9790012000 }
//!   }
//! ]
//! ```
//!
//! The nested `record` object only carries the patient identifier. Notes are never embedded
//! here; they live in the patient's own note unit.

use super::schema_mismatch;
use crate::patient::{PatientDetails, Phn};
use crate::{ClinicError, ClinicResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Wire representation of one catalog entry.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct PatientWire {
    phn: Phn,
    name: String,
    birth_date: String,
    phone: String,
    email: String,
    address: String,
    record: RecordWire,
}

/// Reduced serialisable form of a patient record.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct RecordWire {
    phn: Phn,
}

/// Render catalog entries as the JSON text of the catalog unit.
///
/// # Errors
///
/// Returns [`ClinicError::Serialization`] if JSON serialisation fails.
pub fn render<'a>(patients: impl IntoIterator<Item = &'a PatientDetails>) -> ClinicResult<String> {
    let wire: Vec<PatientWire> = patients
        .into_iter()
        .map(|p| PatientWire {
            phn: p.phn,
            name: p.name.clone(),
            birth_date: p.birth_date.clone(),
            phone: p.phone.clone(),
            email: p.email.clone(),
            address: p.address.clone(),
            record: RecordWire { phn: p.phn },
        })
        .collect();

    serde_json::to_string_pretty(&wire).map_err(ClinicError::Serialization)
}

/// Parse the JSON text of the catalog unit.
///
/// # Errors
///
/// Returns:
/// - [`ClinicError::Deserialization`] if the text is not valid JSON,
/// - [`ClinicError::SchemaMismatch`] if an entry has missing, unknown or mistyped fields, if
///   an entry's `record.phn` differs from its `phn`, or if a `phn` appears twice.
pub fn parse(json_text: &str) -> ClinicResult<Vec<PatientDetails>> {
    let mut deserializer = serde_json::Deserializer::from_str(json_text);

    let wire: Vec<PatientWire> = match serde_path_to_error::deserialize(&mut deserializer) {
        Ok(parsed) => parsed,
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            return Err(match source.classify() {
                serde_json::error::Category::Data => schema_mismatch(path, source),
                _ => ClinicError::Deserialization(source),
            });
        }
    };
    deserializer.end().map_err(ClinicError::Deserialization)?;

    let mut seen = HashSet::with_capacity(wire.len());
    let mut patients = Vec::with_capacity(wire.len());
    for (index, entry) in wire.into_iter().enumerate() {
        if entry.record.phn != entry.phn {
            return Err(schema_mismatch(
                format!("[{index}].record.phn"),
                format!(
                    "record belongs to {} but entry is {}",
                    entry.record.phn, entry.phn
                ),
            ));
        }
        if !seen.insert(entry.phn) {
            return Err(schema_mismatch(
                format!("[{index}].phn"),
                format!("duplicate phn {}", entry.phn),
            ));
        }
        patients.push(PatientDetails {
            phn: entry.phn,
            name: entry.name,
            birth_date: entry.birth_date,
            phone: entry.phone,
            email: entry.email,
            address: entry.address,
        });
    }

    Ok(patients)
}
