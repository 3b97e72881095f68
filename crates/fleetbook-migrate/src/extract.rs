//! Discovering the normalized entities referenced by legacy rows.
//!
//! Keys are de-duplicated by exact equality on the whole tuple, in the order
//! they are first encountered: every vehicle formulary row, then every job
//! formulary row. The same worker id paired with two different names yields
//! two tuples; the upserter materializes whichever comes first.

use std::{collections::HashSet, hash::Hash};

use fleetbook_core::{
  key::{Dni, JobId, Plate},
  legacy::{LegacyJobForm, LegacyVehicleForm},
};

/// The unique entity keys found across both legacy tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityKeys {
  pub vehicles: Vec<Plate>,
  /// `(employee id, employee name)`; the name is needed to build a worker.
  pub workers:  Vec<(Dni, String)>,
  /// `(job id, job place)`; the place becomes the job's client.
  pub jobs:     Vec<(JobId, String)>,
}

/// An insertion-ordered set.
struct Unique<T> {
  seen:  HashSet<T>,
  items: Vec<T>,
}

impl<T: Clone + Eq + Hash> Unique<T> {
  fn new() -> Self { Self { seen: HashSet::new(), items: Vec::new() } }

  fn insert(&mut self, item: T) {
    if self.seen.insert(item.clone()) {
      self.items.push(item);
    }
  }
}

pub fn extract_keys(
  vehicle_forms: &[LegacyVehicleForm],
  job_forms: &[LegacyJobForm],
) -> EntityKeys {
  let mut vehicles = Unique::new();
  let mut workers = Unique::new();
  let mut jobs = Unique::new();

  let referenced = vehicle_forms
    .iter()
    .map(|r| (r.vehicle_id, r.employee_id, &r.employee_name, r.job_id, &r.job_place))
    .chain(
      job_forms
        .iter()
        .map(|r| (r.vehicle_id, r.employee_id, &r.employee_name, r.job_id, &r.job_place)),
    );

  for (plate, dni, name, job_id, place) in referenced {
    vehicles.insert(plate);
    workers.insert((dni, name.clone()));
    jobs.insert((job_id, place.clone()));
  }

  EntityKeys {
    vehicles: vehicles.items,
    workers:  workers.items,
    jobs:     jobs.items,
  }
}
