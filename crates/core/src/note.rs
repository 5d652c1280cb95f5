//! Clinical note entity.

use crate::constants::TIMESTAMP_FORMAT;
use chrono::{Local, NaiveDateTime, Timelike};

/// Code of a note, unique within one patient's log.
pub type NoteCode = u64;

/// A single clinical note in a patient's log.
///
/// Two notes are equal when they share a code and text; the timestamp is not compared.
#[derive(Clone, Debug)]
pub struct Note {
    pub code: NoteCode,
    pub text: String,
    pub timestamp: NaiveDateTime,
}

impl Note {
    /// Creates a note. The timestamp is always supplied by the caller.
    pub fn new(code: NoteCode, text: impl Into<String>, timestamp: NaiveDateTime) -> Self {
        Self {
            code,
            text: text.into(),
            timestamp,
        }
    }

    /// Timestamp rendered in the persisted `YYYY-MM-DD HH:MM:SS` form.
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.text == other.text
    }
}

impl Eq for Note {}

impl std::fmt::Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}; {}; {}", self.code, self.formatted_timestamp(), self.text)
    }
}

/// Current local time truncated to whole seconds, matching the persisted precision.
pub fn now_timestamp() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}
