//! The Person record and its identity rules.
//!
//! A person is identified solely by its [`Nif`]. Two [`Person`] values with
//! the same nif are the same record, whatever their other fields say.

use std::{
  fmt,
  hash::{Hash, Hasher},
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Nif ─────────────────────────────────────────────────────────────────────

/// Upper bound matching the relational `CHAR(9)` key column.
pub const NIF_MAX_LEN: usize = 9;

/// National identity string; the primary key of a [`Person`].
///
/// Restricted to ASCII alphanumerics so it can name a photo file and sit in a
/// delimited text record without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Nif(String);

impl Nif {
  pub fn new(value: impl Into<String>) -> Result<Self> {
    let value = value.into();
    let valid = !value.is_empty()
      && value.len() <= NIF_MAX_LEN
      && value.bytes().all(|b| b.is_ascii_alphanumeric());
    if valid { Ok(Self(value)) } else { Err(Error::InvalidNif(value)) }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Nif {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl std::str::FromStr for Nif {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::new(s) }
}

impl TryFrom<String> for Nif {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::new(value) }
}

impl From<Nif> for String {
  fn from(nif: Nif) -> Self { nif.0 }
}

// ─── Photo ───────────────────────────────────────────────────────────────────

/// The eight-byte signature every PNG stream starts with.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// A PNG-encoded image. Backends decide whether to embed the bytes or keep
/// them in a side file; the model only ever sees the bytes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Photo(Vec<u8>);

impl Photo {
  pub fn from_png(bytes: impl Into<Vec<u8>>) -> Result<Self> {
    let bytes = bytes.into();
    if bytes.starts_with(&PNG_SIGNATURE) {
      Ok(Self(bytes))
    } else {
      Err(Error::InvalidPhoto(format!(
        "{} bytes without a PNG signature",
        bytes.len()
      )))
    }
  }

  pub fn as_png(&self) -> &[u8] { &self.0 }

  /// Size of the encoded image.
  pub fn byte_len(&self) -> usize { self.0.len() }
}

impl fmt::Debug for Photo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Photo({} bytes)", self.0.len())
  }
}

impl TryFrom<Vec<u8>> for Photo {
  type Error = Error;

  fn try_from(bytes: Vec<u8>) -> Result<Self> { Self::from_png(bytes) }
}

impl From<Photo> for Vec<u8> {
  fn from(photo: Photo) -> Self { photo.0 }
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// A personal record. The nif is fixed at construction; every other field is
/// freely mutable on the caller's copy and only reaches storage through an
/// explicit update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
  nif:               Nif,
  pub name:          String,
  pub phone_number:  String,
  pub postal_code:   String,
  pub date_of_birth: Option<NaiveDate>,
  pub photo:         Option<Photo>,
}

impl Person {
  pub fn new(
    nif: Nif,
    name: impl Into<String>,
    phone_number: impl Into<String>,
    postal_code: impl Into<String>,
  ) -> Self {
    Self {
      nif,
      name: name.into(),
      phone_number: phone_number.into(),
      postal_code: postal_code.into(),
      date_of_birth: None,
      photo: None,
    }
  }

  pub fn with_date_of_birth(mut self, date: NaiveDate) -> Self {
    self.date_of_birth = Some(date);
    self
  }

  pub fn with_photo(mut self, photo: Photo) -> Self {
    self.photo = Some(photo);
    self
  }

  pub fn nif(&self) -> &Nif { &self.nif }

  /// Field-by-field comparison, as opposed to `==` which only looks at the
  /// nif.
  pub fn same_contents(&self, other: &Person) -> bool {
    self.nif == other.nif
      && self.name == other.name
      && self.phone_number == other.phone_number
      && self.postal_code == other.postal_code
      && self.date_of_birth == other.date_of_birth
      && self.photo == other.photo
  }
}

impl PartialEq for Person {
  fn eq(&self, other: &Self) -> bool { self.nif == other.nif }
}

impl Eq for Person {}

impl Hash for Person {
  fn hash<H: Hasher>(&self, state: &mut H) { self.nif.hash(state); }
}
