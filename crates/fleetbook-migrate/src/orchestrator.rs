//! Sequencing the migration phases and their batch boundaries.
//!
//! Each phase that writes runs in its own batch: entities, then links, then
//! the legacy drops. A failing phase rolls back only its own batch. Earlier
//! batches stay committed, so a run aborted during linking leaves its new
//! entities without links; re-running fills the links in.

use std::future::Future;

use fleetbook_core::{legacy::LegacyTable, store::FleetStore};
use tracing::Instrument as _;

use crate::{
  Error, Result,
  extract::extract_keys,
  legacy::{LegacySnapshot, read_legacy},
  link::build_links,
  report::{LegacyTableReport, MigrationOutcome, MigrationReport, MigrationState},
  upsert::upsert_entities,
};

/// Migrate the legacy formulary tables into the normalized model.
///
/// Never fails outright: faults are logged and reported through
/// [`MigrationOutcome::Aborted`] so the caller can decide whether to go on.
/// Not safe to run concurrently against the same store.
pub async fn migrate<S: FleetStore>(store: &S) -> MigrationOutcome {
  let report = MigrationReport::new();
  let span = tracing::info_span!("migration", run_id = %report.run_id);
  Run { store, state: MigrationState::Start, report }
    .execute()
    .instrument(span)
    .await
}

struct Run<'s, S> {
  store:  &'s S,
  state:  MigrationState,
  report: MigrationReport,
}

impl<S: FleetStore> Run<'_, S> {
  async fn execute(mut self) -> MigrationOutcome {
    tracing::info!("starting legacy migration");

    let snapshot = match read_legacy(self.store).await {
      Ok(snapshot) => snapshot,
      Err(e) => return self.abort(e),
    };
    self.report.legacy_tables = table_reports(&snapshot);
    self.advance(MigrationState::LegacyRead);

    if snapshot.is_vacuous() {
      tracing::info!("no legacy tables found, nothing to migrate");
      self.advance(MigrationState::Done);
      return MigrationOutcome::NothingToMigrate(self.report.finish(MigrationState::Done));
    }

    let keys = extract_keys(snapshot.vehicle_rows(), snapshot.job_rows());
    tracing::info!(
      vehicles = keys.vehicles.len(),
      workers = keys.workers.len(),
      jobs = keys.jobs.len(),
      "extracted entity keys"
    );
    match in_batch(self.store, upsert_entities(self.store, &keys)).await {
      Ok(t) => {
        self.report.vehicles = t.vehicles;
        self.report.workers = t.workers;
        self.report.jobs = t.jobs;
      }
      Err(e) => return self.abort(e),
    }
    self.advance(MigrationState::EntitiesCommitted);

    match in_batch(self.store, build_links(self.store, &snapshot)).await {
      Ok(t) => {
        self.report.vehicle_forms = t.vehicle_forms;
        self.report.job_forms = t.job_forms;
      }
      Err(e) => return self.abort(e),
    }
    self.advance(MigrationState::LinksCommitted);

    let present = snapshot.present_tables();
    match in_batch(self.store, drop_tables(self.store, &present)).await {
      Ok(()) => self.report.dropped = present,
      Err(e) => return self.abort(e),
    }
    self.advance(MigrationState::LegacyDropped);

    self.advance(MigrationState::Done);
    let report = self.report.finish(MigrationState::Done);
    tracing::info!(
      vehicles_created = report.vehicles.created,
      workers_created = report.workers.created,
      jobs_created = report.jobs.created,
      vehicle_forms_created = report.vehicle_forms.created,
      job_forms_created = report.job_forms.created,
      "migration completed"
    );
    MigrationOutcome::Completed(report)
  }

  fn advance(&mut self, to: MigrationState) {
    debug_assert!(!self.state.is_terminal(), "advance from {}", self.state);
    tracing::info!(from = %self.state, %to, "migration state");
    self.state = to;
  }

  fn abort(self, error: Error) -> MigrationOutcome {
    tracing::error!(last_state = %self.state, %error, "migration aborted");
    MigrationOutcome::Aborted {
      last_state: self.state,
      error,
      report: self.report.finish(MigrationState::Aborted),
    }
  }
}

/// Run `work` between `begin` and `commit`, rolling back if either `work`
/// or the commit fails.
async fn in_batch<S, T>(store: &S, work: impl Future<Output = Result<T>>) -> Result<T>
where
  S: FleetStore,
{
  store.begin().await.map_err(Error::store)?;

  let result = match work.await {
    Ok(value) => store.commit().await.map(|()| value).map_err(Error::store),
    Err(e) => Err(e),
  };

  if result.is_err() {
    match store.rollback().await {
      Ok(()) => tracing::warn!("batch rolled back"),
      Err(e) => tracing::error!(error = %e, "rollback failed"),
    }
  }
  result
}

async fn drop_tables<S: FleetStore>(store: &S, tables: &[LegacyTable]) -> Result<()> {
  for &table in tables {
    store.drop_legacy_table(table).await.map_err(Error::store)?;
    tracing::info!(%table, "dropped legacy table");
  }
  Ok(())
}

fn table_reports(snapshot: &LegacySnapshot) -> Vec<LegacyTableReport> {
  LegacyTable::ALL
    .into_iter()
    .map(|table| {
      let rows = snapshot.rows_in(table);
      LegacyTableReport { table, present: rows.is_some(), rows: rows.unwrap_or(0) }
    })
    .collect()
}
