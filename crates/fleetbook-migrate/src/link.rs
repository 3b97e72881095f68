//! Writing one link record per legacy row.
//!
//! The legacy row's non-key columns are flattened into the link's `notes`;
//! none of them survive as typed columns.

use fleetbook_core::{
  legacy::{LegacyJobForm, LegacyVehicleForm},
  link::{JobFormLink, VehicleFormLink},
  store::FleetStore,
};

use crate::{
  Error, Result,
  legacy::LegacySnapshot,
  report::Tally,
  text::{job_form_annotation, vehicle_form_annotation},
  upsert::Upsert,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkTallies {
  pub vehicle_forms: Tally,
  pub job_forms:     Tally,
}

pub async fn link_vehicle_form<S: FleetStore>(
  store: &S,
  row: &LegacyVehicleForm,
) -> Result<Upsert> {
  let key = row.link_key();
  if store.get_vehicle_form(key).await.map_err(Error::store)?.is_some() {
    tracing::trace!(?key, "vehicle form already present");
    return Ok(Upsert::AlreadyPresent);
  }

  let link = VehicleFormLink::annotated(key, vehicle_form_annotation(row));
  store.insert_vehicle_form(link).await.map_err(Error::store)?;
  tracing::debug!(job_id = %key.job_id, "created vehicle form");
  Ok(Upsert::Created)
}

pub async fn link_job_form<S: FleetStore>(store: &S, row: &LegacyJobForm) -> Result<Upsert> {
  let key = row.link_key();
  if store.get_job_form(key).await.map_err(Error::store)?.is_some() {
    tracing::trace!(?key, "job form already present");
    return Ok(Upsert::AlreadyPresent);
  }

  let link = JobFormLink::annotated(key, job_form_annotation(row));
  store.insert_job_form(link).await.map_err(Error::store)?;
  tracing::debug!(job_id = %key.job_id, "created job form");
  Ok(Upsert::Created)
}

/// Link every legacy row, vehicle formularies first.
///
/// Runs inside the caller's batch. Every referenced entity must already be
/// committed; a missing one surfaces as a store error on insert.
pub async fn build_links<S: FleetStore>(
  store: &S,
  snapshot: &LegacySnapshot,
) -> Result<LinkTallies> {
  let mut tallies = LinkTallies::default();

  for row in snapshot.vehicle_rows() {
    tallies.vehicle_forms.record(link_vehicle_form(store, row).await?);
  }
  for row in snapshot.job_rows() {
    tallies.job_forms.record(link_job_form(store, row).await?);
  }

  Ok(tallies)
}
