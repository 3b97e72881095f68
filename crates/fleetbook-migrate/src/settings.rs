//! Settings for the `fleetbook-init` binary.

use std::path::{Path, PathBuf};

use config::{ConfigBuilder, ConfigError, builder::DefaultState};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "FLEETBOOK";
pub const DEFAULT_STORE_PATH: &str = "fleetbook.db";

#[derive(Debug, Clone, Deserialize)]
pub struct InitConfig {
  /// SQLite file holding both the legacy and the normalized tables.
  pub store_path: PathBuf,
}

impl InitConfig {
  /// Read `path` if it exists, then `FLEETBOOK_*` environment variables.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_builder(
      config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX)),
    )
  }

  fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
    builder
      .set_default("store_path", DEFAULT_STORE_PATH)?
      .build()?
      .try_deserialize()
  }

  /// `store_path` with a leading `~/` expanded.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
