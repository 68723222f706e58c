//! Encoding and decoding helpers between [`Person`] and the plain values
//! stored in SQLite columns.
//!
//! Dates are stored as ISO 8601 `YYYY-MM-DD` strings. The photo column holds
//! a filesystem path, never image bytes.

use chrono::NaiveDate;
use people_core::person::{Nif, Person};

use crate::{Error, Result};

/// Column list shared by every `SELECT`, in [`RawPerson::from_row`] order.
pub const COLUMNS: &str = "nif, name, phoneNumber, postalCode, dateOfBirth, photo";

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw values read from or written to a `person` row.
pub struct RawPerson {
  pub nif:           String,
  pub name:          String,
  pub phone_number:  String,
  pub postal_code:   String,
  pub date_of_birth: Option<String>,
  pub photo:         Option<String>,
}

impl RawPerson {
  /// Column values for `person`; `photo_path` is where its PNG was (or will
  /// be) written.
  pub fn from_person(person: &Person, photo_path: Option<String>) -> Self {
    Self {
      nif:           person.nif().to_string(),
      name:          person.name.clone(),
      phone_number:  person.phone_number.clone(),
      postal_code:   person.postal_code.clone(),
      date_of_birth: person.date_of_birth.map(encode_date),
      photo:         photo_path,
    }
  }

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      nif:           row.get(0)?,
      name:          row.get(1)?,
      phone_number:  row.get(2)?,
      postal_code:   row.get(3)?,
      date_of_birth: row.get(4)?,
      photo:         row.get(5)?,
    })
  }

  /// The person without a photo, plus the stored photo path, if any.
  pub fn into_parts(self) -> Result<(Person, Option<String>)> {
    let nif = Nif::new(self.nif).map_err(|e| Error::InvalidRow(e.to_string()))?;
    let mut person = Person::new(nif, self.name, self.phone_number, self.postal_code);
    person.date_of_birth = self.date_of_birth.as_deref().map(decode_date).transpose()?;
    Ok((person, self.photo))
  }
}
