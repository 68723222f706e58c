//! Error types for `people-core`.
//!
//! Every backend maps its own failures into [`Error`] so callers can react to
//! one taxonomy regardless of which store is behind the contract.

use thiserror::Error;

use crate::person::Nif;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} is registered and can not be inserted")]
  AlreadyRegistered(Nif),

  #[error("{0} is not registered")]
  NotRegistered(Nif),

  #[error("invalid nif: {0:?}")]
  InvalidNif(String),

  #[error("invalid photo: {0}")]
  InvalidPhoto(String),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("decode error: {0}")]
  Decode(String),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification of an [`Error`].
///
/// Domain errors are expected outcomes the caller reports and moves on from;
/// the other kinds mean the store can no longer be trusted for this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Domain,
  Io,
  Decode,
  Storage,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::AlreadyRegistered(_)
      | Self::NotRegistered(_)
      | Self::InvalidNif(_)
      | Self::InvalidPhoto(_) => ErrorKind::Domain,
      Self::Io(_) => ErrorKind::Io,
      Self::Decode(_) => ErrorKind::Decode,
      Self::Storage(_) => ErrorKind::Storage,
    }
  }

  pub fn is_domain(&self) -> bool { self.kind() == ErrorKind::Domain }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
