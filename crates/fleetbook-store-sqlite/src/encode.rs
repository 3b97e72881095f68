//! Row mapping between SQLite rows and `fleetbook-core` types.
//!
//! Keys are stored as INTEGER, dates and annotations as TEXT. Legacy names
//! and job places must be TEXT since they become entity attributes; a NULL
//! there fails the whole read. The remaining legacy columns may hold any
//! storage class and are rendered to text.

use fleetbook_core::{
  entity::{Job, Vehicle, Worker},
  key::{Dni, JobId, Plate},
  legacy::{LegacyJobForm, LegacyVehicleForm},
  link::{JobFormLink, LinkKey, VehicleFormLink},
};
use rusqlite::{Row, types::ValueRef};

// ─── Column lists ─────────────────────────────────────────────────────────────

pub const VEHICLE_COLUMNS: &str =
  "plate, brand, model, manufacture_date, purchase_date";
pub const WORKER_COLUMNS: &str =
  "dni, first_name, last_name, birth_date, employment_date";
pub const JOB_COLUMNS: &str = "id, client, date";
pub const VEHICLE_FORM_COLUMNS: &str =
  "plate, dni, job_id, notes, form_date, departure_time, vehicle_state";
pub const JOB_FORM_COLUMNS: &str = "plate, dni, job_id, notes, form_date, \
                                    finish_time, hours_worked, work_place, \
                                    arrival_minutes";
pub const LEGACY_VEHICLE_FORM_COLUMNS: &str = "vehicle_id, employee_id, \
                                               employee_name, job_id, job_place, \
                                               vehicle_condition, vehicle_clean, \
                                               comments";
pub const LEGACY_JOB_FORM_COLUMNS: &str = "vehicle_id, employee_id, \
                                           employee_name, job_id, job_place, \
                                           time_to_commute, time_of_work, \
                                           nails_used";

// ─── Legacy values ────────────────────────────────────────────────────────────

/// Render any SQLite value as display text. NULL renders as "".
pub fn render_value(value: ValueRef<'_>) -> String {
  match value {
    ValueRef::Null => String::new(),
    ValueRef::Integer(i) => i.to_string(),
    ValueRef::Real(f) => f.to_string(),
    ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
  }
}

fn rendered(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
  Ok(render_value(row.get_ref(idx)?))
}

// ─── Entities ─────────────────────────────────────────────────────────────────

pub fn vehicle_from_row(row: &Row<'_>) -> rusqlite::Result<Vehicle> {
  Ok(Vehicle {
    plate:            Plate(row.get(0)?),
    brand:            row.get(1)?,
    model:            row.get(2)?,
    manufacture_date: row.get(3)?,
    purchase_date:    row.get(4)?,
  })
}

pub fn worker_from_row(row: &Row<'_>) -> rusqlite::Result<Worker> {
  Ok(Worker {
    dni:             Dni(row.get(0)?),
    first_name:      row.get(1)?,
    last_name:       row.get(2)?,
    birth_date:      row.get(3)?,
    employment_date: row.get(4)?,
  })
}

pub fn job_from_row(row: &Row<'_>) -> rusqlite::Result<Job> {
  Ok(Job {
    id:     JobId(row.get(0)?),
    client: row.get(1)?,
    date:   row.get(2)?,
  })
}

// ─── Links ────────────────────────────────────────────────────────────────────

fn link_key_from_row(row: &Row<'_>) -> rusqlite::Result<LinkKey> {
  Ok(LinkKey {
    plate:  Plate(row.get(0)?),
    dni:    Dni(row.get(1)?),
    job_id: JobId(row.get(2)?),
  })
}

pub fn vehicle_form_from_row(row: &Row<'_>) -> rusqlite::Result<VehicleFormLink> {
  Ok(VehicleFormLink {
    key:            link_key_from_row(row)?,
    notes:          row.get(3)?,
    form_date:      row.get(4)?,
    departure_time: row.get(5)?,
    vehicle_state:  row.get(6)?,
  })
}

pub fn job_form_from_row(row: &Row<'_>) -> rusqlite::Result<JobFormLink> {
  Ok(JobFormLink {
    key:             link_key_from_row(row)?,
    notes:           row.get(3)?,
    form_date:       row.get(4)?,
    finish_time:     row.get(5)?,
    hours_worked:    row.get(6)?,
    work_place:      row.get(7)?,
    arrival_minutes: row.get(8)?,
  })
}

// ─── Legacy rows ──────────────────────────────────────────────────────────────

pub fn legacy_vehicle_form_from_row(
  row: &Row<'_>,
) -> rusqlite::Result<LegacyVehicleForm> {
  Ok(LegacyVehicleForm {
    vehicle_id:        Plate(row.get(0)?),
    employee_id:       Dni(row.get(1)?),
    employee_name:     row.get(2)?,
    job_id:            JobId(row.get(3)?),
    job_place:         row.get(4)?,
    vehicle_condition: rendered(row, 5)?,
    vehicle_clean:     rendered(row, 6)?,
    comments:          rendered(row, 7)?,
  })
}

pub fn legacy_job_form_from_row(row: &Row<'_>) -> rusqlite::Result<LegacyJobForm> {
  Ok(LegacyJobForm {
    vehicle_id:      Plate(row.get(0)?),
    employee_id:     Dni(row.get(1)?),
    employee_name:   row.get(2)?,
    job_id:          JobId(row.get(3)?),
    job_place:       row.get(4)?,
    time_to_commute: rendered(row, 5)?,
    time_of_work:    rendered(row, 6)?,
    nails_used:      rendered(row, 7)?,
  })
}
