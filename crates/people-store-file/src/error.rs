//! Error type for `people-store-file`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] people_core::Error),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("bincode error: {0}")]
  Bincode(#[from] bincode::Error),

  #[error("not a people store: {0}")]
  BadMagic(String),

  #[error("unsupported format version {found} (expected {expected})")]
  UnsupportedVersion { found: u16, expected: u16 },
}

impl From<Error> for people_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(e) => e,
      Error::Io(e) => Self::Io(e),
      Error::Bincode(e) => Self::Decode(e.to_string()),
      e @ (Error::BadMagic(_) | Error::UnsupportedVersion { .. }) => {
        Self::Decode(e.to_string())
      }
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
