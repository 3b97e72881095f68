//! Migration state, outcome and report types.

use std::fmt;

use chrono::{DateTime, Utc};
use fleetbook_core::legacy::LegacyTable;
use serde::Serialize;
use uuid::Uuid;

use crate::Error;

// ─── State machine ───────────────────────────────────────────────────────────

/// Progress of one migration run.
///
/// `Start → LegacyRead → EntitiesCommitted → LinksCommitted → LegacyDropped
/// → Done`, with `Aborted` reachable from any non-terminal state. A run with
/// no legacy tables goes straight from `LegacyRead` to `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationState {
  Start,
  LegacyRead,
  EntitiesCommitted,
  LinksCommitted,
  LegacyDropped,
  Done,
  Aborted,
}

impl MigrationState {
  pub fn is_terminal(self) -> bool { matches!(self, Self::Done | Self::Aborted) }
}

impl fmt::Display for MigrationState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Start => "start",
      Self::LegacyRead => "legacy_read",
      Self::EntitiesCommitted => "entities_committed",
      Self::LinksCommitted => "links_committed",
      Self::LegacyDropped => "legacy_dropped",
      Self::Done => "done",
      Self::Aborted => "aborted",
    })
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// Created/skipped counts for one kind of row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
  pub created: usize,
  /// Already present, so left untouched.
  pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyTableReport {
  pub table:   LegacyTable,
  pub present: bool,
  pub rows:    usize,
}

/// What a run did. Counts only reflect committed batches.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
  pub run_id:        Uuid,
  pub started_at:    DateTime<Utc>,
  pub finished_at:   Option<DateTime<Utc>>,
  pub final_state:   MigrationState,
  pub legacy_tables: Vec<LegacyTableReport>,
  pub vehicles:      Tally,
  pub workers:       Tally,
  pub jobs:          Tally,
  pub vehicle_forms: Tally,
  pub job_forms:     Tally,
  pub dropped:       Vec<LegacyTable>,
}

impl MigrationReport {
  pub fn new() -> Self {
    Self {
      run_id:        Uuid::new_v4(),
      started_at:    Utc::now(),
      finished_at:   None,
      final_state:   MigrationState::Start,
      legacy_tables: Vec::new(),
      vehicles:      Tally::default(),
      workers:       Tally::default(),
      jobs:          Tally::default(),
      vehicle_forms: Tally::default(),
      job_forms:     Tally::default(),
      dropped:       Vec::new(),
    }
  }

  pub(crate) fn finish(mut self, state: MigrationState) -> Self {
    self.final_state = state;
    self.finished_at = Some(Utc::now());
    self
  }
}

impl Default for MigrationReport {
  fn default() -> Self { Self::new() }
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// The result of [`migrate`](crate::migrate).
#[derive(Debug)]
pub enum MigrationOutcome {
  /// Neither legacy table exists.
  NothingToMigrate(MigrationReport),
  Completed(MigrationReport),
  /// A phase failed and its batch was rolled back.
  ///
  /// Batches are committed one phase at a time. `last_state` of
  /// `EntitiesCommitted` or later means the entities created by this run are
  /// in the store even though their links are not.
  Aborted {
    last_state: MigrationState,
    error:      Error,
    report:     MigrationReport,
  },
}

impl MigrationOutcome {
  pub fn report(&self) -> &MigrationReport {
    match self {
      Self::NothingToMigrate(r) | Self::Completed(r) => r,
      Self::Aborted { report, .. } => report,
    }
  }
}
