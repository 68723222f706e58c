//! Session settings: which backend, and where its files live.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use people_core::backend::BackendKind;
use serde::Deserialize;

/// Deserialised from the optional TOML file and `PEOPLE_*` environment
/// variables; command-line flags are applied on top by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  #[serde(default)]
  pub backend:      BackendKind,
  #[serde(default = "default_storage_root")]
  pub storage_root: PathBuf,
}

fn default_storage_root() -> PathBuf { PathBuf::from("data") }

impl Settings {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("PEOPLE"))
      .build()
      .context("failed to read config file")?;

    let mut settings: Self = settings
      .try_deserialize()
      .context("failed to deserialise settings")?;
    settings.storage_root = expand_tilde(&settings.storage_root);
    Ok(settings)
  }

  /// Directory the chosen backend keeps its files in, if it has any.
  pub fn backend_dir(&self) -> Option<PathBuf> {
    self.backend.folder().map(|f| self.storage_root.join(f))
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
