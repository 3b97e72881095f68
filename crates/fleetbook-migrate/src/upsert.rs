//! Creating entities that legacy rows reference but the store lacks.
//!
//! An existing entity is never touched: migration is purely additive. New
//! entities get placeholder attributes and a freshly generated credential.

use fleetbook_core::{
  entity::{Job, NewJob, NewVehicle, NewWorker, Vehicle, Worker},
  key::{Dni, JobId, Plate},
  store::FleetStore,
};

use crate::{
  Error, Result, credential::generate_credential, extract::EntityKeys,
  report::Tally, text::split_name,
};

pub const MIGRATED_BRAND: &str = "Migrated";
pub const MIGRATED_MODEL: &str = "Migrated";
pub const PLACEHOLDER_MANUFACTURE_DATE: &str = "01/01/2000";
pub const PLACEHOLDER_PURCHASE_DATE: &str = "01/01/2000";
pub const PLACEHOLDER_BIRTH_DATE: &str = "01/01/1980";
pub const PLACEHOLDER_EMPLOYMENT_DATE: &str = "01/01/2020";
pub const PLACEHOLDER_JOB_DATE: &str = "01/01/2023";

/// Whether an upsert wrote a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
  Created,
  AlreadyPresent,
}

impl Tally {
  pub(crate) fn record(&mut self, upsert: Upsert) {
    match upsert {
      Upsert::Created => self.created += 1,
      Upsert::AlreadyPresent => self.skipped += 1,
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityTallies {
  pub vehicles: Tally,
  pub workers:  Tally,
  pub jobs:     Tally,
}

pub async fn upsert_vehicle<S: FleetStore>(store: &S, plate: Plate) -> Result<Upsert> {
  if store.get_vehicle(plate).await.map_err(Error::store)?.is_some() {
    tracing::trace!(%plate, "vehicle already present");
    return Ok(Upsert::AlreadyPresent);
  }

  let new = NewVehicle {
    vehicle:    Vehicle {
      plate,
      brand:            MIGRATED_BRAND.to_owned(),
      model:            MIGRATED_MODEL.to_owned(),
      manufacture_date: PLACEHOLDER_MANUFACTURE_DATE.to_owned(),
      purchase_date:    PLACEHOLDER_PURCHASE_DATE.to_owned(),
    },
    credential: generate_credential()?,
  };
  store.insert_vehicle(new).await.map_err(Error::store)?;
  tracing::debug!(%plate, "created vehicle");
  Ok(Upsert::Created)
}

/// A second, differently named tuple for an existing `dni` is dropped here.
pub async fn upsert_worker<S: FleetStore>(
  store: &S,
  dni: Dni,
  name: &str,
) -> Result<Upsert> {
  if store.get_worker(dni).await.map_err(Error::store)?.is_some() {
    tracing::trace!(%dni, "worker already present");
    return Ok(Upsert::AlreadyPresent);
  }

  let (first_name, last_name) = split_name(name);
  let new = NewWorker {
    worker:     Worker {
      dni,
      first_name,
      last_name,
      birth_date: PLACEHOLDER_BIRTH_DATE.to_owned(),
      employment_date: PLACEHOLDER_EMPLOYMENT_DATE.to_owned(),
    },
    credential: generate_credential()?,
  };
  store.insert_worker(new).await.map_err(Error::store)?;
  tracing::debug!(%dni, "created worker");
  Ok(Upsert::Created)
}

pub async fn upsert_job<S: FleetStore>(store: &S, id: JobId, place: &str) -> Result<Upsert> {
  if store.get_job(id).await.map_err(Error::store)?.is_some() {
    tracing::trace!(job_id = %id, "job already present");
    return Ok(Upsert::AlreadyPresent);
  }

  let new = NewJob {
    job:        Job {
      id,
      client: place.to_owned(),
      date:   PLACEHOLDER_JOB_DATE.to_owned(),
    },
    credential: generate_credential()?,
  };
  store.insert_job(new).await.map_err(Error::store)?;
  tracing::debug!(job_id = %id, "created job");
  Ok(Upsert::Created)
}

/// Upsert every extracted key: vehicles, then workers, then jobs.
///
/// Runs inside the caller's batch; nothing is committed here.
pub async fn upsert_entities<S: FleetStore>(
  store: &S,
  keys: &EntityKeys,
) -> Result<EntityTallies> {
  let mut tallies = EntityTallies::default();

  for &plate in &keys.vehicles {
    tallies.vehicles.record(upsert_vehicle(store, plate).await?);
  }
  for (dni, name) in &keys.workers {
    tallies.workers.record(upsert_worker(store, *dni, name).await?);
  }
  for (id, place) in &keys.jobs {
    tallies.jobs.record(upsert_job(store, *id, place).await?);
  }

  Ok(tallies)
}
