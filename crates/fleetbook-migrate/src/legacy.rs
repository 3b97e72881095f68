//! Reading the legacy formulary tables.
//!
//! An absent table is a valid state meaning "nothing to migrate from this
//! source", not an error. A table that exists but cannot be scanned is
//! treated the same way, and is therefore never dropped.

use std::fmt::Display;

use fleetbook_core::{
  legacy::{LegacyJobForm, LegacyTable, LegacyVehicleForm},
  store::FleetStore,
};

use crate::{Error, Result};

/// Everything read from the legacy tables. `None` marks a table that was
/// absent (or unreadable).
#[derive(Debug, Clone, Default)]
pub struct LegacySnapshot {
  pub vehicle_forms: Option<Vec<LegacyVehicleForm>>,
  pub job_forms:     Option<Vec<LegacyJobForm>>,
}

impl LegacySnapshot {
  /// True when neither legacy table was found.
  pub fn is_vacuous(&self) -> bool {
    self.vehicle_forms.is_none() && self.job_forms.is_none()
  }

  pub fn vehicle_rows(&self) -> &[LegacyVehicleForm] {
    self.vehicle_forms.as_deref().unwrap_or_default()
  }

  pub fn job_rows(&self) -> &[LegacyJobForm] {
    self.job_forms.as_deref().unwrap_or_default()
  }

  /// Whether `table` was observed to exist, with its row count.
  pub fn rows_in(&self, table: LegacyTable) -> Option<usize> {
    match table {
      LegacyTable::VehicleFormularies => self.vehicle_forms.as_ref().map(Vec::len),
      LegacyTable::JobFormularies => self.job_forms.as_ref().map(Vec::len),
    }
  }

  /// Tables observed to exist, in drop order.
  pub fn present_tables(&self) -> Vec<LegacyTable> {
    LegacyTable::ALL
      .into_iter()
      .filter(|t| self.rows_in(*t).is_some())
      .collect()
  }
}

/// Scan both legacy tables.
///
/// Only a failure of the existence check itself is an error.
pub async fn read_legacy<S: FleetStore>(store: &S) -> Result<LegacySnapshot> {
  let vehicle_forms = if probe(store, LegacyTable::VehicleFormularies).await? {
    settle(
      LegacyTable::VehicleFormularies,
      store.read_legacy_vehicle_forms().await,
    )
  } else {
    None
  };

  let job_forms = if probe(store, LegacyTable::JobFormularies).await? {
    settle(LegacyTable::JobFormularies, store.read_legacy_job_forms().await)
  } else {
    None
  };

  Ok(LegacySnapshot { vehicle_forms, job_forms })
}

async fn probe<S: FleetStore>(store: &S, table: LegacyTable) -> Result<bool> {
  let exists = store
    .has_table(table.table_name())
    .await
    .map_err(Error::store)?;
  if !exists {
    tracing::info!(%table, "legacy table does not exist");
  }
  Ok(exists)
}

fn settle<T, E: Display>(
  table: LegacyTable,
  read: std::result::Result<Vec<T>, E>,
) -> Option<Vec<T>> {
  match read {
    Ok(rows) => {
      tracing::info!(%table, rows = rows.len(), "read legacy table");
      Some(rows)
    }
    Err(e) => {
      tracing::warn!(%table, error = %e, "legacy table unreadable, treating as absent");
      None
    }
  }
}
