//! Lossy text transforms applied to legacy values.
//!
//! Neither is a general-purpose parser; both exist only to carry legacy
//! detail into the normalized model once.

use fleetbook_core::legacy::{LegacyJobForm, LegacyVehicleForm};

/// Split a full name on its first whitespace into `(first, last)`.
///
/// The remainder is kept verbatim and is empty for a single-token name.
pub fn split_name(raw: &str) -> (String, String) {
  match raw.split_once(char::is_whitespace) {
    Some((first, rest)) => (first.to_owned(), rest.to_owned()),
    None => (raw.to_owned(), String::new()),
  }
}

/// Flatten the non-key columns of a vehicle formulary row.
pub fn vehicle_form_annotation(row: &LegacyVehicleForm) -> String {
  format!(
    "Condition: {}, Cleanliness: {}, Comments: {}",
    row.vehicle_condition, row.vehicle_clean, row.comments
  )
}

/// Flatten the non-key columns of a job formulary row.
pub fn job_form_annotation(row: &LegacyJobForm) -> String {
  format!(
    "Commute time: {}, Work time: {}, Nails used: {}",
    row.time_to_commute, row.time_of_work, row.nails_used
  )
}
