//! Core types and the storage trait for the Fleetbook normalized model.
//!
//! This crate is deliberately free of database dependencies. The SQLite
//! backend and the legacy migration engine both depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod entity;
pub mod key;
pub mod legacy;
pub mod link;
pub mod store;
