//! [`ListStore`]: linear-scan backend.

use people_core::{
  Error, Result,
  person::{Nif, Person},
  store::{Cleared, PersonStore},
};
use tracing::debug;

/// People kept in insertion order; every point operation scans the list.
#[derive(Debug, Default)]
pub struct ListStore {
  people: Vec<Person>,
}

impl ListStore {
  pub fn new() -> Self { Self::default() }

  fn position(&self, nif: &Nif) -> Option<usize> {
    self.people.iter().position(|p| p.nif() == nif)
  }
}

impl PersonStore for ListStore {
  type Error = Error;

  async fn read(&self, nif: &Nif) -> Result<Option<Person>> {
    Ok(self.position(nif).map(|i| self.people[i].clone()))
  }

  async fn read_all(&self) -> Result<Vec<Person>> { Ok(self.people.clone()) }

  async fn insert(&mut self, person: Person) -> Result<()> {
    if self.position(person.nif()).is_some() {
      return Err(Error::AlreadyRegistered(person.nif().clone()));
    }
    debug!(nif = %person.nif(), "list insert");
    self.people.push(person);
    Ok(())
  }

  async fn update(&mut self, person: Person) -> Result<()> {
    let i = self
      .position(person.nif())
      .ok_or_else(|| Error::NotRegistered(person.nif().clone()))?;
    debug!(nif = %person.nif(), "list update");
    self.people[i] = person;
    Ok(())
  }

  async fn delete(&mut self, nif: &Nif) -> Result<()> {
    let i = self
      .position(nif)
      .ok_or_else(|| Error::NotRegistered(nif.clone()))?;
    debug!(%nif, "list delete");
    self.people.remove(i);
    Ok(())
  }

  async fn delete_all(&mut self) -> Result<Cleared> {
    let records = self.people.len();
    self.people.clear();
    Ok(Cleared { records, ..Cleared::default() })
  }

  async fn count(&self) -> Result<usize> { Ok(self.people.len()) }
}
