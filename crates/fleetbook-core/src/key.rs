//! Natural keys of the normalized entities.
//!
//! Every key is an integer assigned outside the system (licence plate number,
//! national id, job number). The newtypes keep a link triple from being
//! assembled in the wrong order.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! natural_key {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
    }
  };
}

natural_key!(
  /// A vehicle's licence plate number.
  Plate
);
natural_key!(
  /// A worker's national identity number.
  Dni
);
natural_key!(
  /// A job number.
  JobId
);
