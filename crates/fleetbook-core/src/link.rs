//! Link records: one vehicle, one worker and one job, plus form details.

use serde::{Deserialize, Serialize};

use crate::key::{Dni, JobId, Plate};

/// The composite key shared by both link kinds.
///
/// At most one link of each kind exists per key.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct LinkKey {
  pub plate:  Plate,
  pub dni:    Dni,
  pub job_id: JobId,
}

impl LinkKey {
  pub fn new(plate: Plate, dni: Dni, job_id: JobId) -> Self {
    Self { plate, dni, job_id }
  }
}

/// A vehicle form: the state of a vehicle when it left for a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleFormLink {
  pub key:            LinkKey,
  /// Free-text annotation. Migrated rows carry their flattened legacy columns
  /// here.
  pub notes:          Option<String>,
  pub form_date:      Option<String>,
  pub departure_time: Option<String>,
  pub vehicle_state:  Option<String>,
}

impl VehicleFormLink {
  /// A link carrying only an annotation.
  pub fn annotated(key: LinkKey, notes: String) -> Self {
    Self {
      key,
      notes: Some(notes),
      form_date: None,
      departure_time: None,
      vehicle_state: None,
    }
  }
}

/// A job form: how a job went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFormLink {
  pub key:             LinkKey,
  pub notes:           Option<String>,
  pub form_date:       Option<String>,
  pub finish_time:     Option<String>,
  pub hours_worked:    Option<f64>,
  pub work_place:      Option<String>,
  pub arrival_minutes: Option<i64>,
}

impl JobFormLink {
  /// A link carrying only an annotation.
  pub fn annotated(key: LinkKey, notes: String) -> Self {
    Self {
      key,
      notes: Some(notes),
      form_date: None,
      finish_time: None,
      hours_worked: None,
      work_place: None,
      arrival_minutes: None,
    }
  }
}
