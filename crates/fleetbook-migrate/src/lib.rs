//! One-shot migration from the legacy formulary tables to the normalized
//! Fleetbook model.
//!
//! The two legacy tables repeat vehicle, worker and job attributes in every
//! row. [`migrate`] discovers the entities those rows reference, creates the
//! ones that do not exist yet, writes one link per legacy row, and finally
//! drops the legacy tables. Every phase skips work already done, so a re-run
//! against a partially migrated store only fills the gaps.
//!
//! ```rust,ignore
//! let store = SqliteStore::open("fleetbook.db").await?;
//! match fleetbook_migrate::migrate(&store).await {
//!   MigrationOutcome::Aborted { error, .. } => return Err(error.into()),
//!   _ => {}
//! }
//! ```

pub mod credential;
pub mod error;
pub mod extract;
pub mod legacy;
pub mod link;
pub mod orchestrator;
pub mod report;
pub mod settings;
pub mod text;
pub mod upsert;

pub use error::{Error, Result};
pub use orchestrator::migrate;
pub use report::{MigrationOutcome, MigrationReport, MigrationState};

#[cfg(test)]
mod tests;
