//! SQLite backend for the Fleetbook store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. One [`SqliteStore`] is one session:
//! batches opened with `begin` span every call made through it until
//! `commit` or `rollback`.

mod encode;
mod store;

pub mod error;
pub mod schema;

pub use error::{Error, Result};
pub use store::SqliteStore;
