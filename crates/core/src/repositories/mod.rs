//! Repository management modules.
//!
//! This module contains the two independent stores of the clinic: the patient catalog and
//! the per-patient note logs. Each persists to its own storage units.

pub mod catalog;
pub(crate) mod helpers;
pub mod notes;
