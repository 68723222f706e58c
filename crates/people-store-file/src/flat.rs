//! [`FlatFileStore`]: one text line per person, photos beside it.
//!
//! ```text
//! root/
//! ├── people.txt
//! └── photos/
//!     └── <nif>.png
//! ```
//!
//! Text lines have no efficient in-place update, so every mutation reads the
//! whole file, changes it in memory and writes it back through
//! [`write_atomic`]. Lines that fail to decode are reported and carried over
//! untouched on rewrite.

use std::{
  io,
  path::{Path, PathBuf},
};

use people_core::{
  atomic::write_atomic,
  person::{Nif, Person},
  photo_dir::PhotoDir,
  store::{Cleared, PersonStore},
};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

use crate::{Error, Result, line};

pub const DATA_FILE: &str = "people.txt";
pub const PHOTO_DIR: &str = "photos";

/// A line of the data file that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason}")]
pub struct LineError {
  /// 1-based line number.
  pub line:   usize,
  pub reason: String,
}

/// The data file as a sequence of lines, decoded where possible.
enum Line {
  Record(Person),
  Unreadable(Vec<u8>),
}

// ─── Store ───────────────────────────────────────────────────────────────────

pub struct FlatFileStore {
  data_path: PathBuf,
  photos:    PhotoDir,
}

impl FlatFileStore {
  /// Open (or create) a store under `root`.
  pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
    let root = root.as_ref();
    fs::create_dir_all(root).await?;
    let photos = PhotoDir::create(root.join(PHOTO_DIR)).await?;
    let data_path = root.join(DATA_FILE);

    if fs::try_exists(&data_path).await? {
      debug!(path = %data_path.display(), "opened flat-file store");
    } else {
      fs::write(&data_path, b"").await?;
      debug!(path = %data_path.display(), "created flat-file store");
    }

    Ok(Self { data_path, photos })
  }

  pub fn data_path(&self) -> &Path { &self.data_path }

  pub fn photo_dir(&self) -> &PhotoDir { &self.photos }

  /// Decode every line independently. A line that fails does not stop the
  /// scan; only failing to read the file does.
  ///
  /// Returned records carry no photo.
  pub async fn scan(&self) -> Result<Vec<Result<Person, LineError>>> {
    let bytes = self.read_data().await?;
    Ok(
      split_lines(&bytes)
        .map(|(number, raw)| decode_line(number, raw))
        .collect(),
    )
  }

  async fn read_data(&self) -> Result<Vec<u8>> {
    match fs::read(&self.data_path).await {
      Ok(bytes) => Ok(bytes),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
      Err(e) => Err(e.into()),
    }
  }

  async fn load_lines(&self) -> Result<Vec<Line>> {
    let bytes = self.read_data().await?;
    Ok(
      split_lines(&bytes)
        .map(|(number, raw)| match decode_line(number, raw) {
          Ok(person) => Line::Record(person),
          Err(e) => {
            warn!(error = %e, "keeping undecodable line as-is");
            Line::Unreadable(raw.to_vec())
          }
        })
        .collect(),
    )
  }

  async fn save_lines(&self, lines: &[Line]) -> Result<()> {
    let mut out = Vec::new();
    for l in lines {
      match l {
        Line::Record(person) => out.extend_from_slice(line::encode(person).as_bytes()),
        Line::Unreadable(raw) => out.extend_from_slice(raw),
      }
      out.push(b'\n');
    }
    write_atomic(&self.data_path, &out).await?;
    debug!(lines = lines.len(), "rewrote flat file");
    Ok(())
  }

  async fn with_photo(&self, mut person: Person) -> Result<Person> {
    person.photo = self.photos.load(person.nif()).await?;
    Ok(person)
  }
}

fn position(lines: &[Line], nif: &Nif) -> Option<usize> {
  lines
    .iter()
    .position(|l| matches!(l, Line::Record(p) if p.nif() == nif))
}

/// Non-blank lines with 1-based numbers; a trailing CR is dropped.
fn split_lines(bytes: &[u8]) -> impl Iterator<Item = (usize, &[u8])> {
  bytes
    .split(|&b| b == b'\n')
    .enumerate()
    .map(|(i, raw)| (i + 1, raw.strip_suffix(b"\r").unwrap_or(raw)))
    .filter(|(_, raw)| !raw.is_empty())
}

fn decode_line(number: usize, raw: &[u8]) -> Result<Person, LineError> {
  let text = std::str::from_utf8(raw).map_err(|e| LineError {
    line:   number,
    reason: format!("not utf-8: {e}"),
  })?;
  line::decode(text).map_err(|reason| LineError { line: number, reason })
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for FlatFileStore {
  type Error = Error;

  async fn read(&self, nif: &Nif) -> Result<Option<Person>> {
    let found = self
      .scan()
      .await?
      .into_iter()
      .filter_map(Result::ok)
      .find(|p| p.nif() == nif);

    match found {
      Some(person) => Ok(Some(self.with_photo(person).await?)),
      None => Ok(None),
    }
  }

  async fn read_all(&self) -> Result<Vec<Person>> {
    let mut people = Vec::new();
    for outcome in self.scan().await? {
      match outcome {
        Ok(person) => people.push(self.with_photo(person).await?),
        Err(e) => warn!(error = %e, path = %self.data_path.display(), "skipping record"),
      }
    }
    Ok(people)
  }

  async fn insert(&mut self, mut person: Person) -> Result<()> {
    let mut lines = self.load_lines().await?;
    if position(&lines, person.nif()).is_some() {
      return Err(people_core::Error::AlreadyRegistered(person.nif().clone()).into());
    }

    let photo = person.photo.take();
    let nif = person.nif().clone();
    lines.push(Line::Record(person));
    self.save_lines(&lines).await?;
    self.photos.sync(&nif, photo.as_ref()).await?;
    Ok(())
  }

  async fn update(&mut self, mut person: Person) -> Result<()> {
    let mut lines = self.load_lines().await?;
    let i = position(&lines, person.nif())
      .ok_or_else(|| people_core::Error::NotRegistered(person.nif().clone()))?;

    let photo = person.photo.take();
    let nif = person.nif().clone();
    lines[i] = Line::Record(person);
    self.save_lines(&lines).await?;
    self.photos.sync(&nif, photo.as_ref()).await?;
    Ok(())
  }

  async fn delete(&mut self, nif: &Nif) -> Result<()> {
    let mut lines = self.load_lines().await?;
    let i = position(&lines, nif)
      .ok_or_else(|| people_core::Error::NotRegistered(nif.clone()))?;

    lines.remove(i);
    self.save_lines(&lines).await?;
    self.photos.remove(nif).await?;
    Ok(())
  }

  async fn delete_all(&mut self) -> Result<Cleared> {
    let records = self.scan().await?.iter().filter(|o| o.is_ok()).count();
    write_atomic(&self.data_path, b"").await?;
    let leftover_photos = self.photos.clear().await?;
    if !leftover_photos.is_empty() {
      warn!(count = leftover_photos.len(), "some photos could not be removed");
    }
    Ok(Cleared { records, leftover_photos })
  }

  async fn count(&self) -> Result<usize> {
    Ok(self.scan().await?.iter().filter(|o| o.is_ok()).count())
  }
}
