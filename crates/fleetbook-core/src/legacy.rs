//! Rows of the two denormalized "formulary" tables being retired.
//!
//! Every legacy row mixes vehicle, worker and job attributes. Non-key columns
//! are kept as the text they render to; they only ever end up flattened into
//! a link annotation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  key::{Dni, JobId, Plate},
  link::LinkKey,
};

/// The fixed set of legacy tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyTable {
  VehicleFormularies,
  JobFormularies,
}

impl LegacyTable {
  pub const ALL: [LegacyTable; 2] =
    [LegacyTable::VehicleFormularies, LegacyTable::JobFormularies];

  pub fn table_name(self) -> &'static str {
    match self {
      LegacyTable::VehicleFormularies => "vehicle_formularies",
      LegacyTable::JobFormularies => "job_formularies",
    }
  }
}

impl fmt::Display for LegacyTable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.table_name())
  }
}

/// One row of `vehicle_formularies`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyVehicleForm {
  pub vehicle_id:        Plate,
  pub employee_id:       Dni,
  pub employee_name:     String,
  pub job_id:            JobId,
  pub job_place:         String,
  pub vehicle_condition: String,
  pub vehicle_clean:     String,
  pub comments:          String,
}

impl LegacyVehicleForm {
  pub fn link_key(&self) -> LinkKey {
    LinkKey::new(self.vehicle_id, self.employee_id, self.job_id)
  }
}

/// One row of `job_formularies`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyJobForm {
  pub vehicle_id:      Plate,
  pub employee_id:     Dni,
  pub employee_name:   String,
  pub job_id:          JobId,
  pub job_place:       String,
  pub time_to_commute: String,
  pub time_of_work:    String,
  pub nails_used:      String,
}

impl LegacyJobForm {
  pub fn link_key(&self) -> LinkKey {
    LinkKey::new(self.vehicle_id, self.employee_id, self.job_id)
  }
}
