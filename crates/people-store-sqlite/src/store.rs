//! [`SqliteStore`]: the SQLite implementation of [`PersonStore`].

use std::path::{Path, PathBuf};

use people_core::{
  person::{Nif, Person},
  photo_dir::{PhotoDir, load_png_or_warn},
  store::{Cleared, PersonStore},
};
use rusqlite::OptionalExtension as _;
use tokio::fs;
use tracing::{debug, warn};

use crate::{
  Error, Result,
  encode::{COLUMNS, RawPerson},
  schema::SCHEMA,
};

pub const DATABASE_FILE: &str = "people.db";
pub const PHOTO_DIR: &str = "photos";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A People store backed by a single SQLite file plus a photo directory.
///
/// Holds no open connection: every operation opens one, runs, and closes it
/// again, on error paths too.
///
/// ```text
/// root/
/// ├── people.db
/// └── photos/
///     └── <nif>.png
/// ```
pub struct SqliteStore {
  db_path: PathBuf,
  photos:  PhotoDir,
}

impl SqliteStore {
  /// Open (or create) a store under `root` and run schema initialisation.
  ///
  /// `root` is made absolute first: the photo column stores full paths, which
  /// must still resolve from another working directory.
  pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
    fs::create_dir_all(root.as_ref()).await?;
    let root = fs::canonicalize(root.as_ref()).await?;
    let store = Self {
      db_path: root.join(DATABASE_FILE),
      photos:  PhotoDir::create(root.join(PHOTO_DIR)).await?,
    };
    store.init_schema().await?;
    Ok(store)
  }

  pub fn db_path(&self) -> &Path { &self.db_path }

  pub fn photo_dir(&self) -> &PhotoDir { &self.photos }

  async fn init_schema(&self) -> Result<()> {
    self
      .with_connection(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    debug!(path = %self.db_path.display(), "schema ready");
    Ok(())
  }

  /// Run `f` on a fresh connection that is closed before returning.
  async fn with_connection<F, R>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection) -> tokio_rusqlite::Result<R> + Send + 'static,
    R: Send + 'static,
  {
    let conn = tokio_rusqlite::Connection::open(&self.db_path).await?;
    let result = conn.call(f).await;
    let closed = conn.close().await;
    let value = result?;
    closed?;
    Ok(value)
  }

  /// The raw `photo` column for `nif`: `None` if the row is missing,
  /// `Some(None)` if the column is NULL.
  pub async fn photo_column(&self, nif: &Nif) -> Result<Option<Option<String>>> {
    let nif_str = nif.to_string();
    self
      .with_connection(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT photo FROM person WHERE nif = ?1",
              rusqlite::params![nif_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await
  }

  /// Decode a row and load the PNG its photo column points at. A missing or
  /// damaged file leaves the person without a photo.
  async fn hydrate(&self, raw: RawPerson) -> Result<Person> {
    let (mut person, path) = raw.into_parts()?;
    if let Some(path) = path {
      person.photo = load_png_or_warn(Path::new(&path)).await?;
      if person.photo.is_none() {
        warn!(nif = %person.nif(), %path, "no usable photo file");
      }
    }
    Ok(person)
  }

  fn photo_path_for(&self, person: &Person) -> Option<String> {
    person
      .photo
      .as_ref()
      .map(|_| self.photos.path_for(person.nif()).to_string_lossy().into_owned())
  }
}

fn is_constraint_violation(e: &Error) -> bool {
  matches!(
    e,
    Error::Database(tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _)))
      if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
  type Error = Error;

  async fn read(&self, nif: &Nif) -> Result<Option<Person>> {
    let nif_str = nif.to_string();

    let raw: Option<RawPerson> = self
      .with_connection(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COLUMNS} FROM person WHERE nif = ?1"),
              rusqlite::params![nif_str],
              RawPerson::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    match raw {
      Some(raw) => Ok(Some(self.hydrate(raw).await?)),
      None => Ok(None),
    }
  }

  async fn read_all(&self) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .with_connection(|conn| {
        let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM person"))?;
        let rows = stmt
          .query_map([], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut people = Vec::with_capacity(raws.len());
    for raw in raws {
      people.push(self.hydrate(raw).await?);
    }
    Ok(people)
  }

  async fn insert(&mut self, person: Person) -> Result<()> {
    let raw = RawPerson::from_person(&person, self.photo_path_for(&person));

    let inserted = self
      .with_connection(move |conn| {
        conn.execute(
          "INSERT INTO person (nif, name, phoneNumber, postalCode, dateOfBirth, photo)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            raw.nif,
            raw.name,
            raw.phone_number,
            raw.postal_code,
            raw.date_of_birth,
            raw.photo,
          ],
        )?;
        Ok(())
      })
      .await;

    match inserted {
      Err(e) if is_constraint_violation(&e) => {
        return Err(people_core::Error::AlreadyRegistered(person.nif().clone()).into());
      }
      other => other?,
    }

    self.photos.sync(person.nif(), person.photo.as_ref()).await?;
    debug!(nif = %person.nif(), "sqlite insert");
    Ok(())
  }

  async fn update(&mut self, person: Person) -> Result<()> {
    let raw = RawPerson::from_person(&person, self.photo_path_for(&person));

    let changed = self
      .with_connection(move |conn| {
        Ok(conn.execute(
          "UPDATE person
           SET name = ?1, phoneNumber = ?2, postalCode = ?3, dateOfBirth = ?4, photo = ?5
           WHERE nif = ?6",
          rusqlite::params![
            raw.name,
            raw.phone_number,
            raw.postal_code,
            raw.date_of_birth,
            raw.photo,
            raw.nif,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(people_core::Error::NotRegistered(person.nif().clone()).into());
    }

    self.photos.sync(person.nif(), person.photo.as_ref()).await?;
    debug!(nif = %person.nif(), "sqlite update");
    Ok(())
  }

  async fn delete(&mut self, nif: &Nif) -> Result<()> {
    let nif_str = nif.to_string();

    let changed = self
      .with_connection(move |conn| {
        Ok(conn.execute("DELETE FROM person WHERE nif = ?1", rusqlite::params![nif_str])?)
      })
      .await?;

    if changed == 0 {
      return Err(people_core::Error::NotRegistered(nif.clone()).into());
    }

    self.photos.remove(nif).await?;
    debug!(%nif, "sqlite delete");
    Ok(())
  }

  async fn delete_all(&mut self) -> Result<Cleared> {
    let records = self
      .with_connection(|conn| Ok(conn.execute("DELETE FROM person", [])?))
      .await?;

    let leftover_photos = self.photos.clear().await?;
    if !leftover_photos.is_empty() {
      warn!(count = leftover_photos.len(), "some photos could not be removed");
    }
    Ok(Cleared { records, leftover_photos })
  }

  async fn count(&self) -> Result<usize> {
    let n: i64 = self
      .with_connection(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM person", [], |row| row.get(0))?)
      })
      .await?;
    usize::try_from(n).map_err(|e| Error::InvalidRow(e.to_string()))
  }
}
