//! The `FleetStore` trait, the storage capability the migration consumes.
//!
//! Implemented by storage backends (e.g. `fleetbook-store-sqlite`). The
//! migration engine depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  entity::{Job, NewJob, NewVehicle, NewWorker, Vehicle, Worker},
  key::{Dni, JobId, Plate},
  legacy::{LegacyJobForm, LegacyTable, LegacyVehicleForm},
  link::{JobFormLink, LinkKey, VehicleFormLink},
};

/// Abstraction over one session against a Fleetbook relational store.
///
/// Writes issued between [`begin`](FleetStore::begin) and
/// [`commit`](FleetStore::commit) form one batch, and are visible to reads
/// made through the same store before the batch commits.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait FleetStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Schema ────────────────────────────────────────────────────────────

  /// Whether a table with this exact name exists.
  fn has_table<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Drop a legacy table. Dropping an absent table is not an error.
  fn drop_legacy_table(
    &self,
    table: LegacyTable,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Batches ───────────────────────────────────────────────────────────

  fn begin(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn commit(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Discard every write since the last [`begin`](FleetStore::begin).
  fn rollback(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Legacy reads ──────────────────────────────────────────────────────

  /// Full scan of `vehicle_formularies`, in storage order.
  fn read_legacy_vehicle_forms(
    &self,
  ) -> impl Future<Output = Result<Vec<LegacyVehicleForm>, Self::Error>> + Send + '_;

  /// Full scan of `job_formularies`, in storage order.
  fn read_legacy_job_forms(
    &self,
  ) -> impl Future<Output = Result<Vec<LegacyJobForm>, Self::Error>> + Send + '_;

  // ── Entities ──────────────────────────────────────────────────────────

  fn get_vehicle(
    &self,
    plate: Plate,
  ) -> impl Future<Output = Result<Option<Vehicle>, Self::Error>> + Send + '_;

  fn get_worker(
    &self,
    dni: Dni,
  ) -> impl Future<Output = Result<Option<Worker>, Self::Error>> + Send + '_;

  fn get_job(
    &self,
    id: JobId,
  ) -> impl Future<Output = Result<Option<Job>, Self::Error>> + Send + '_;

  /// Persist a new vehicle. Fails if the plate is already taken.
  fn insert_vehicle(
    &self,
    vehicle: NewVehicle,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn insert_worker(
    &self,
    worker: NewWorker,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn insert_job(
    &self,
    job: NewJob,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn list_vehicles(
    &self,
  ) -> impl Future<Output = Result<Vec<Vehicle>, Self::Error>> + Send + '_;

  fn list_workers(
    &self,
  ) -> impl Future<Output = Result<Vec<Worker>, Self::Error>> + Send + '_;

  fn list_jobs(&self) -> impl Future<Output = Result<Vec<Job>, Self::Error>> + Send + '_;

  // ── Links ─────────────────────────────────────────────────────────────

  fn get_vehicle_form(
    &self,
    key: LinkKey,
  ) -> impl Future<Output = Result<Option<VehicleFormLink>, Self::Error>> + Send + '_;

  fn get_job_form(
    &self,
    key: LinkKey,
  ) -> impl Future<Output = Result<Option<JobFormLink>, Self::Error>> + Send + '_;

  /// Persist a vehicle form. All three referenced entities must already
  /// exist.
  fn insert_vehicle_form(
    &self,
    link: VehicleFormLink,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn insert_job_form(
    &self,
    link: JobFormLink,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn list_vehicle_forms(
    &self,
  ) -> impl Future<Output = Result<Vec<VehicleFormLink>, Self::Error>> + Send + '_;

  fn list_job_forms(
    &self,
  ) -> impl Future<Output = Result<Vec<JobFormLink>, Self::Error>> + Send + '_;
}
