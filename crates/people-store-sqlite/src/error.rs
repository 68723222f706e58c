//! Error type for `people-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] people_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("date parse error: {0}")]
  DateParse(String),

  #[error("invalid row: {0}")]
  InvalidRow(String),
}

impl From<Error> for people_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(e) => e,
      Error::Io(e) => Self::Io(e),
      Error::Database(e) => Self::Storage(Box::new(e)),
      e @ (Error::DateParse(_) | Error::InvalidRow(_)) => Self::Decode(e.to_string()),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
