//! [`MapStore`]: nif-indexed backend.

use std::collections::{HashMap, hash_map::Entry};

use people_core::{
  Error, Result,
  person::{Nif, Person},
  store::{Cleared, PersonStore},
};
use tracing::debug;

/// People indexed by nif; every point operation is a single hash lookup.
#[derive(Debug, Default)]
pub struct MapStore {
  people: HashMap<Nif, Person>,
}

impl MapStore {
  pub fn new() -> Self { Self::default() }
}

impl PersonStore for MapStore {
  type Error = Error;

  async fn read(&self, nif: &Nif) -> Result<Option<Person>> {
    Ok(self.people.get(nif).cloned())
  }

  async fn read_all(&self) -> Result<Vec<Person>> {
    Ok(self.people.values().cloned().collect())
  }

  async fn insert(&mut self, person: Person) -> Result<()> {
    match self.people.entry(person.nif().clone()) {
      Entry::Occupied(e) => Err(Error::AlreadyRegistered(e.key().clone())),
      Entry::Vacant(e) => {
        debug!(nif = %person.nif(), "map insert");
        e.insert(person);
        Ok(())
      }
    }
  }

  async fn update(&mut self, person: Person) -> Result<()> {
    match self.people.get_mut(person.nif()) {
      Some(slot) => {
        debug!(nif = %person.nif(), "map update");
        *slot = person;
        Ok(())
      }
      None => Err(Error::NotRegistered(person.nif().clone())),
    }
  }

  async fn delete(&mut self, nif: &Nif) -> Result<()> {
    self
      .people
      .remove(nif)
      .map(|_| debug!(%nif, "map delete"))
      .ok_or_else(|| Error::NotRegistered(nif.clone()))
  }

  async fn delete_all(&mut self) -> Result<Cleared> {
    let records = self.people.len();
    self.people.clear();
    Ok(Cleared { records, ..Cleared::default() })
  }

  async fn count(&self) -> Result<usize> { Ok(self.people.len()) }
}
