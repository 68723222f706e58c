//! The enumerated set of storage strategies a session can choose from.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Which backend a session stores its people in. Chosen once at startup.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Display,
  EnumIter,
  EnumString,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BackendKind {
  /// `Vec` scanned linearly; lost when the process exits.
  InMemoryList,
  /// `HashMap` keyed by nif; lost when the process exits.
  #[default]
  InMemoryMap,
  /// One text line per person plus a directory of PNG files.
  FlatFile,
  /// The whole collection, photos embedded, in one binary file.
  SerializedObject,
  /// SQLite table plus a directory of PNG files.
  Relational,
  /// Managed by an external ORM layer; recognised but not provided here.
  OrmManaged,
}

impl BackendKind {
  /// Whether records survive the end of the process.
  pub fn is_durable(self) -> bool {
    !matches!(self, Self::InMemoryList | Self::InMemoryMap)
  }

  /// Sub-directory of the storage root this backend keeps its files in.
  pub fn folder(self) -> Option<&'static str> {
    match self {
      Self::FlatFile => Some("file"),
      Self::SerializedObject => Some("serial"),
      Self::Relational => Some("sqlite"),
      Self::InMemoryList | Self::InMemoryMap | Self::OrmManaged => None,
    }
  }
}
