//! Text codec for one flat-file record.
//!
//! A record is five TAB-separated fields:
//!
//! ```text
//! nif  name  phone_number  postal_code  date_of_birth
//! ```
//!
//! Inside a field, backslash, TAB, LF and CR are escaped as `\\`, `\t`, `\n`
//! and `\r`. A field that is exactly `\N` means "absent". Escaping a real
//! string can never produce that field (a literal `\N` becomes `\\N`), so an
//! absent birth date and an empty string stay distinguishable.

use chrono::NaiveDate;
use people_core::person::{Nif, Person};

pub const SEPARATOR: char = '\t';
pub const ABSENT: &str = "\\N";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const FIELDS: usize = 5;

// ─── Encode ──────────────────────────────────────────────────────────────────

/// Encode `person` as one line, without the trailing newline. The photo is
/// not part of the line.
pub fn encode(person: &Person) -> String {
  let mut out = String::new();
  out.push_str(person.nif().as_str());
  for field in [&person.name, &person.phone_number, &person.postal_code] {
    out.push(SEPARATOR);
    escape_into(field, &mut out);
  }
  out.push(SEPARATOR);
  match person.date_of_birth {
    Some(date) => out.push_str(&date.format(DATE_FORMAT).to_string()),
    None => out.push_str(ABSENT),
  }
  out
}

fn escape_into(s: &str, out: &mut String) {
  for c in s.chars() {
    match c {
      '\\' => out.push_str("\\\\"),
      '\t' => out.push_str("\\t"),
      '\n' => out.push_str("\\n"),
      '\r' => out.push_str("\\r"),
      c => out.push(c),
    }
  }
}

// ─── Decode ──────────────────────────────────────────────────────────────────

/// Decode one line (without its newline) into a photo-less [`Person`].
pub fn decode(line: &str) -> Result<Person, String> {
  let fields: Vec<&str> = line.split(SEPARATOR).collect();
  if fields.len() != FIELDS {
    return Err(format!("expected {FIELDS} fields, found {}", fields.len()));
  }

  let nif = required("nif", fields[0])?;
  let nif = Nif::new(nif).map_err(|e| e.to_string())?;
  let name = required("name", fields[1])?;
  let phone_number = required("phone_number", fields[2])?;
  let postal_code = required("postal_code", fields[3])?;

  let mut person = Person::new(nif, name, phone_number, postal_code);
  person.date_of_birth = unescape(fields[4])?
    .map(|s| {
      NaiveDate::parse_from_str(&s, DATE_FORMAT)
        .map_err(|e| format!("date_of_birth {s:?}: {e}"))
    })
    .transpose()?;
  Ok(person)
}

fn required(name: &str, field: &str) -> Result<String, String> {
  unescape(field)?.ok_or_else(|| format!("{name} is absent"))
}

/// `Ok(None)` for the absent marker, otherwise the unescaped text.
fn unescape(field: &str) -> Result<Option<String>, String> {
  if field == ABSENT {
    return Ok(None);
  }

  let mut out = String::with_capacity(field.len());
  let mut chars = field.chars();
  while let Some(c) = chars.next() {
    if c != '\\' {
      out.push(c);
      continue;
    }
    match chars.next() {
      Some('\\') => out.push('\\'),
      Some('t') => out.push('\t'),
      Some('n') => out.push('\n'),
      Some('r') => out.push('\r'),
      Some(other) => return Err(format!("unknown escape \\{other} in {field:?}")),
      None => return Err(format!("dangling backslash in {field:?}")),
    }
  }
  Ok(Some(out))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn nif(s: &str) -> Nif { Nif::new(s).unwrap() }

  #[test]
  fn encodes_absent_date_as_marker() {
    let p = Person::new(nif("12345678X"), "John Doe", "612352892", "08907");
    assert_eq!(encode(&p), "12345678X\tJohn Doe\t612352892\t08907\t\\N");
  }

  #[test]
  fn decodes_what_it_encodes() {
    let p = Person::new(nif("1A"), "Tab\there\\N", "line\nbreak\r", "")
      .with_date_of_birth(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
    let line = encode(&p);
    assert!(!line.contains('\n'));

    let back = decode(&line).unwrap();
    assert!(back.same_contents(&p));
  }

  #[test]
  fn empty_string_is_not_absent() {
    let p = Person::new(nif("1A"), "", "", "");
    let back = decode(&encode(&p)).unwrap();
    assert_eq!(back.name, "");
    assert_eq!(back.date_of_birth, None);
  }

  #[test]
  fn rejects_wrong_field_count() {
    let err = decode("1A\tname").unwrap_err();
    assert!(err.contains("expected 5 fields"), "{err}");
  }

  #[test]
  fn rejects_absent_required_field() {
    let err = decode("1A\t\\N\tp\tc\t\\N").unwrap_err();
    assert_eq!(err, "name is absent");
  }

  #[test]
  fn rejects_bad_date_and_escape() {
    assert!(decode("1A\tn\tp\tc\t1970-13-01").is_err());
    assert!(decode("1A\tn\\x\tp\tc\t\\N").is_err());
    assert!(decode("1A\tn\\\tp\tc\t\\N").is_err());
  }

  #[test]
  fn rejects_invalid_nif() {
    assert!(decode("bad/nif\tn\tp\tc\t\\N").is_err());
  }
}
