//! The caller layer that sits in front of a single [`PersonStore`].
//!
//! Registration rules live here rather than in each backend so that every
//! store reports duplicates and missing records the same way.

use tracing::{debug, info};

use crate::{
  Error, Result,
  person::{Nif, Person},
  store::{Cleared, PersonStore},
};

/// Owns the session's one backend and checks the registration rules before
/// handing each call to it.
pub struct Registry<S> {
  store: S,
}

impl<S: PersonStore> Registry<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  pub fn into_inner(self) -> S { self.store }

  pub async fn read(&self, nif: &Nif) -> Result<Option<Person>> {
    debug!(%nif, "read");
    self.store.read(nif).await.map_err(Into::into)
  }

  pub async fn read_all(&self) -> Result<Vec<Person>> {
    let people = self.store.read_all().await.map_err(Into::into)?;
    debug!(count = people.len(), "read all");
    Ok(people)
  }

  pub async fn count(&self) -> Result<usize> {
    self.store.count().await.map_err(Into::into)
  }

  /// Fails with [`Error::AlreadyRegistered`] if the nif is taken.
  pub async fn insert(&mut self, person: Person) -> Result<()> {
    if self.read(person.nif()).await?.is_some() {
      return Err(Error::AlreadyRegistered(person.nif().clone()));
    }
    let nif = person.nif().clone();
    self.store.insert(person).await.map_err(Into::into)?;
    info!(%nif, "inserted");
    Ok(())
  }

  /// Fails with [`Error::NotRegistered`] if no record carries the nif. The
  /// nif itself can never change; it only selects the record to replace.
  pub async fn update(&mut self, person: Person) -> Result<()> {
    if self.read(person.nif()).await?.is_none() {
      return Err(Error::NotRegistered(person.nif().clone()));
    }
    let nif = person.nif().clone();
    self.store.update(person).await.map_err(Into::into)?;
    info!(%nif, "updated");
    Ok(())
  }

  /// Fails with [`Error::NotRegistered`] if no record carries the nif.
  pub async fn delete(&mut self, nif: &Nif) -> Result<()> {
    if self.read(nif).await?.is_none() {
      return Err(Error::NotRegistered(nif.clone()));
    }
    self.store.delete(nif).await.map_err(Into::into)?;
    info!(%nif, "deleted");
    Ok(())
  }

  pub async fn delete_all(&mut self) -> Result<Cleared> {
    let cleared = self.store.delete_all().await.map_err(Into::into)?;
    info!(records = cleared.records, "deleted all");
    Ok(cleared)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Minimal store that trusts its caller completely, so the tests below
  /// exercise only the registry's own checks.
  #[derive(Default)]
  struct Trusting {
    people:  Vec<Person>,
    inserts: usize,
    deletes: usize,
  }

  impl PersonStore for Trusting {
    type Error = Error;

    async fn read(&self, nif: &Nif) -> Result<Option<Person>> {
      Ok(self.people.iter().find(|p| p.nif() == nif).cloned())
    }

    async fn read_all(&self) -> Result<Vec<Person>> { Ok(self.people.clone()) }

    async fn insert(&mut self, person: Person) -> Result<()> {
      self.inserts += 1;
      self.people.push(person);
      Ok(())
    }

    async fn update(&mut self, person: Person) -> Result<()> {
      for p in &mut self.people {
        if p == &person {
          *p = person.clone();
        }
      }
      Ok(())
    }

    async fn delete(&mut self, nif: &Nif) -> Result<()> {
      self.deletes += 1;
      self.people.retain(|p| p.nif() != nif);
      Ok(())
    }

    async fn delete_all(&mut self) -> Result<Cleared> {
      let records = self.people.len();
      self.people.clear();
      Ok(Cleared { records, ..Cleared::default() })
    }
  }

  fn john() -> Person {
    Person::new(Nif::new("12345678X").unwrap(), "John Doe", "612352892", "08907")
  }

  #[tokio::test]
  async fn duplicate_insert_never_reaches_store() {
    let mut r = Registry::new(Trusting::default());
    r.insert(john()).await.unwrap();

    let err = r.insert(john()).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyRegistered(ref n) if n.as_str() == "12345678X"));
    assert_eq!(r.store().inserts, 1);
    assert_eq!(r.count().await.unwrap(), 1);
  }

  #[tokio::test]
  async fn delete_missing_never_reaches_store() {
    let mut r = Registry::new(Trusting::default());
    let err = r.delete(john().nif()).await.unwrap_err();
    assert!(matches!(err, Error::NotRegistered(_)));
    assert_eq!(r.store().deletes, 0);
  }

  #[tokio::test]
  async fn update_missing_is_not_registered() {
    let mut r = Registry::new(Trusting::default());
    let err = r.update(john()).await.unwrap_err();
    assert!(matches!(err, Error::NotRegistered(_)));
    assert!(r.read_all().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn update_replaces_fields() {
    let mut r = Registry::new(Trusting::default());
    r.insert(john()).await.unwrap();

    let mut changed = john();
    changed.name = "Johnny".into();
    r.update(changed).await.unwrap();

    let stored = r.read(john().nif()).await.unwrap().unwrap();
    assert_eq!(stored.name, "Johnny");
  }

  #[tokio::test]
  async fn delete_all_reports_count() {
    let mut r = Registry::new(Trusting::default());
    r.insert(john()).await.unwrap();
    let cleared = r.delete_all().await.unwrap();
    assert_eq!(cleared.records, 1);
    assert!(cleared.is_clean());
    assert_eq!(r.count().await.unwrap(), 0);
  }
}
