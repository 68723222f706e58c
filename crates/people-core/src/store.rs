//! The `PersonStore` trait.
//!
//! Implemented by every backend crate (`people-store-memory`,
//! `people-store-file`, `people-store-sqlite`). Callers depend on this
//! abstraction, usually through [`crate::registry::Registry`], never on a
//! concrete backend.

use std::{future::Future, path::PathBuf};

use crate::person::{Nif, Person};

// ─── Outcome types ───────────────────────────────────────────────────────────

/// Result of [`PersonStore::delete_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cleared {
  /// Number of records removed.
  pub records:         usize,
  /// Photo files that could not be removed. The records are gone regardless;
  /// these are reported so the caller can warn about them.
  pub leftover_photos: Vec<PathBuf>,
}

impl Cleared {
  pub fn is_clean(&self) -> bool { self.leftover_photos.is_empty() }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a People storage backend.
///
/// A store is owned by one caller that issues operations strictly one after
/// another, which is why the mutating methods take `&mut self` and no backend
/// locks internally. Each call finishes all of its side effects (photo files
/// included) before its future resolves.
///
/// Backends refuse to insert a nif that is already stored and to update or
/// delete one that is not, but callers should still go through the registry,
/// which checks first.
pub trait PersonStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  /// Look up a person by nif. Returns `None` if not stored.
  fn read<'a>(
    &'a self,
    nif: &'a Nif,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// Every stored person, in an order of the backend's choosing.
  fn read_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Persist a new person, photo included.
  fn insert(
    &mut self,
    person: Person,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Replace every mutable field of the stored person with the same nif.
  ///
  /// This is a full replace, not a patch: a `None` photo or birth date clears
  /// whatever was stored before.
  fn update(
    &mut self,
    person: Person,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove a person and any photo artifact kept for it.
  fn delete<'a>(
    &'a mut self,
    nif: &'a Nif,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove every person and every photo artifact.
  fn delete_all(
    &mut self,
  ) -> impl Future<Output = Result<Cleared, Self::Error>> + Send + '_;

  /// Number of stored people.
  fn count(&self) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_ {
    async move { Ok(self.read_all().await?.len()) }
  }
}
