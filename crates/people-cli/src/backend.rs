//! Runtime backend selection.

use std::path::Path;

use anyhow::Context as _;
use people_core::{
  backend::BackendKind,
  person::{Nif, Person},
  store::{Cleared, PersonStore},
};
use people_store_file::{FlatFileStore, SerialStore};
use people_store_memory::{ListStore, MapStore};
use people_store_sqlite::SqliteStore;

/// One variant per backend; the session picks one at startup.
pub enum AnyStore {
  List(ListStore),
  Map(MapStore),
  Flat(FlatFileStore),
  Serial(SerialStore),
  Sqlite(SqliteStore),
}

impl AnyStore {
  /// Open the backend `kind`, creating its folder under `storage_root`.
  pub async fn open(kind: BackendKind, storage_root: &Path) -> anyhow::Result<Self> {
    let dir = storage_root.join(kind.folder().unwrap_or_default());
    let store = match kind {
      BackendKind::InMemoryList => Self::List(ListStore::new()),
      BackendKind::InMemoryMap => Self::Map(MapStore::new()),
      BackendKind::FlatFile => Self::Flat(
        FlatFileStore::open(&dir)
          .await
          .with_context(|| format!("failed to open flat-file store at {dir:?}"))?,
      ),
      BackendKind::SerializedObject => Self::Serial(
        SerialStore::open(&dir)
          .await
          .with_context(|| format!("failed to open serialized store at {dir:?}"))?,
      ),
      BackendKind::Relational => Self::Sqlite(
        SqliteStore::open(&dir)
          .await
          .with_context(|| format!("failed to open sqlite store at {dir:?}"))?,
      ),
      BackendKind::OrmManaged => {
        anyhow::bail!("the {kind} backend is not available; choose another backend")
      }
    };
    tracing::debug!(backend = %kind, "backend opened");
    Ok(store)
  }
}

macro_rules! dispatch {
  ($self:ident, $store:ident => $call:expr) => {
    match $self {
      AnyStore::List($store) => $call.await.map_err(Into::into),
      AnyStore::Map($store) => $call.await.map_err(Into::into),
      AnyStore::Flat($store) => $call.await.map_err(Into::into),
      AnyStore::Serial($store) => $call.await.map_err(Into::into),
      AnyStore::Sqlite($store) => $call.await.map_err(Into::into),
    }
  };
}

impl PersonStore for AnyStore {
  type Error = people_core::Error;

  async fn read(&self, nif: &Nif) -> people_core::Result<Option<Person>> {
    dispatch!(self, s => s.read(nif))
  }

  async fn read_all(&self) -> people_core::Result<Vec<Person>> {
    dispatch!(self, s => s.read_all())
  }

  async fn insert(&mut self, person: Person) -> people_core::Result<()> {
    dispatch!(self, s => s.insert(person))
  }

  async fn update(&mut self, person: Person) -> people_core::Result<()> {
    dispatch!(self, s => s.update(person))
  }

  async fn delete(&mut self, nif: &Nif) -> people_core::Result<()> {
    dispatch!(self, s => s.delete(nif))
  }

  async fn delete_all(&mut self) -> people_core::Result<Cleared> {
    dispatch!(self, s => s.delete_all())
  }

  async fn count(&self) -> people_core::Result<usize> {
    dispatch!(self, s => s.count())
  }
}

#[cfg(test)]
mod tests {
  use people_core::registry::Registry;
  use strum::IntoEnumIterator as _;
  use tempfile::TempDir;

  use super::*;

  fn john() -> Person {
    Person::new(Nif::new("12345678X").unwrap(), "John Doe", "612352892", "08907")
  }

  #[tokio::test]
  async fn every_available_backend_opens_and_stores() {
    let root = TempDir::new().unwrap();
    for kind in BackendKind::iter().filter(|k| *k != BackendKind::OrmManaged) {
      let mut registry = Registry::new(AnyStore::open(kind, root.path()).await.unwrap());
      registry.insert(john()).await.unwrap();
      assert_eq!(registry.count().await.unwrap(), 1, "{kind}");
      registry.delete_all().await.unwrap();
    }
    for folder in ["file", "serial", "sqlite"] {
      assert!(root.path().join(folder).is_dir(), "{folder}");
    }
  }

  #[tokio::test]
  async fn orm_managed_is_refused() {
    let root = TempDir::new().unwrap();
    assert!(AnyStore::open(BackendKind::OrmManaged, root.path()).await.is_err());
  }

  #[tokio::test]
  async fn durable_backend_survives_reopen() {
    let root = TempDir::new().unwrap();
    let mut store = AnyStore::open(BackendKind::FlatFile, root.path()).await.unwrap();
    store.insert(john()).await.unwrap();

    let reopened = AnyStore::open(BackendKind::FlatFile, root.path()).await.unwrap();
    assert_eq!(reopened.count().await.unwrap(), 1);
  }
}
