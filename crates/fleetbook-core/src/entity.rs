//! Vehicle, Worker and Job: the normalized entities.
//!
//! Each entity comes in two shapes. The `New*` insert model carries the
//! [`Credential`] generated at creation time; the read model does not, so a
//! credential can never leak back out through a lookup.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::key::{Dni, JobId, Plate};

// ─── Credential ──────────────────────────────────────────────────────────────

/// An access secret attached to an entity when it is created.
///
/// Neither `Debug` nor any serialisation exposes the value; only the storage
/// backend reads it, through [`Credential::expose`].
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
  pub fn new(secret: impl Into<String>) -> Self { Self(secret.into()) }

  pub fn expose(&self) -> &str { &self.0 }

  pub fn len(&self) -> usize { self.0.chars().count() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl fmt::Debug for Credential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Credential(<redacted>)")
  }
}

// ─── Vehicle ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
  pub plate:            Plate,
  pub brand:            String,
  pub model:            String,
  /// `dd/mm/yyyy`, stored as free text.
  pub manufacture_date: String,
  pub purchase_date:    String,
}

#[derive(Debug, Clone)]
pub struct NewVehicle {
  pub vehicle:    Vehicle,
  pub credential: Credential,
}

// ─── Worker ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
  pub dni:             Dni,
  pub first_name:      String,
  /// May be empty when the source name had a single token.
  pub last_name:       String,
  pub birth_date:      String,
  pub employment_date: String,
}

#[derive(Debug, Clone)]
pub struct NewWorker {
  pub worker:     Worker,
  pub credential: Credential,
}

// ─── Job ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
  pub id:     JobId,
  pub client: String,
  pub date:   String,
}

#[derive(Debug, Clone)]
pub struct NewJob {
  pub job:        Job,
  pub credential: Credential,
}
