//! [`SerialStore`]: the whole collection as one binary blob.
//!
//! Layout of the file:
//!
//! | bytes | contents                                   |
//! |-------|--------------------------------------------|
//! | 0..4  | magic `PPLS`                               |
//! | 4..6  | format version, little-endian `u16`        |
//! | 6..   | `bincode` encoding of `Vec<Person>`        |
//!
//! Photos travel inside the blob; there is no side directory. There is also
//! no way to salvage part of a damaged file, so any decode failure is fatal.

use std::{
  io,
  path::{Path, PathBuf},
};

use people_core::{
  atomic::write_atomic,
  person::{Nif, Person},
  store::{Cleared, PersonStore},
};
use tokio::fs;
use tracing::debug;

use crate::{Error, Result};

pub const DATA_FILE: &str = "people.bin";
pub const MAGIC: &[u8; 4] = b"PPLS";
pub const FORMAT_VERSION: u16 = 1;

const HEADER_LEN: usize = MAGIC.len() + 2;

// ─── Codec ───────────────────────────────────────────────────────────────────

pub fn encode(people: &[Person]) -> Result<Vec<u8>> {
  let mut out = Vec::with_capacity(HEADER_LEN);
  out.extend_from_slice(MAGIC);
  out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
  bincode::serialize_into(&mut out, people)?;
  Ok(out)
}

/// Decode a whole file. Zero bytes is an empty collection.
pub fn decode(bytes: &[u8]) -> Result<Vec<Person>> {
  if bytes.is_empty() {
    return Ok(Vec::new());
  }
  if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
    return Err(Error::BadMagic(format!(
      "header {:?}",
      &bytes[..bytes.len().min(MAGIC.len())]
    )));
  }

  let found = u16::from_le_bytes([bytes[4], bytes[5]]);
  if found != FORMAT_VERSION {
    return Err(Error::UnsupportedVersion { found, expected: FORMAT_VERSION });
  }

  Ok(bincode::deserialize(&bytes[HEADER_LEN..])?)
}

// ─── Store ───────────────────────────────────────────────────────────────────

pub struct SerialStore {
  path: PathBuf,
}

impl SerialStore {
  /// Open (or create) a store under `root`.
  pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
    let root = root.as_ref();
    fs::create_dir_all(root).await?;
    let store = Self { path: root.join(DATA_FILE) };

    if !fs::try_exists(&store.path).await? {
      store.save(&[]).await?;
      debug!(path = %store.path.display(), "created serialized store");
    }
    Ok(store)
  }

  pub fn path(&self) -> &Path { &self.path }

  async fn load(&self) -> Result<Vec<Person>> {
    let bytes = match fs::read(&self.path).await {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(e.into()),
    };
    decode(&bytes)
  }

  async fn save(&self, people: &[Person]) -> Result<()> {
    let bytes = encode(people)?;
    write_atomic(&self.path, &bytes).await?;
    debug!(records = people.len(), bytes = bytes.len(), "rewrote serialized store");
    Ok(())
  }
}

fn position(people: &[Person], nif: &Nif) -> Option<usize> {
  people.iter().position(|p| p.nif() == nif)
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SerialStore {
  type Error = Error;

  async fn read(&self, nif: &Nif) -> Result<Option<Person>> {
    Ok(self.load().await?.into_iter().find(|p| p.nif() == nif))
  }

  async fn read_all(&self) -> Result<Vec<Person>> { self.load().await }

  async fn insert(&mut self, person: Person) -> Result<()> {
    let mut people = self.load().await?;
    if position(&people, person.nif()).is_some() {
      return Err(people_core::Error::AlreadyRegistered(person.nif().clone()).into());
    }
    people.push(person);
    self.save(&people).await
  }

  async fn update(&mut self, person: Person) -> Result<()> {
    let mut people = self.load().await?;
    let i = position(&people, person.nif())
      .ok_or_else(|| people_core::Error::NotRegistered(person.nif().clone()))?;
    people[i] = person;
    self.save(&people).await
  }

  async fn delete(&mut self, nif: &Nif) -> Result<()> {
    let mut people = self.load().await?;
    let i = position(&people, nif)
      .ok_or_else(|| people_core::Error::NotRegistered(nif.clone()))?;
    people.remove(i);
    self.save(&people).await
  }

  async fn delete_all(&mut self) -> Result<Cleared> {
    let records = self.load().await?.len();
    self.save(&[]).await?;
    Ok(Cleared { records, ..Cleared::default() })
  }
}
