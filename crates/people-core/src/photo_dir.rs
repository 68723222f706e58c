//! Photo side-channel for backends that keep images outside the record store.
//!
//! ```text
//! photos/
//! ├── 12345678X.png
//! └── 87654321Z.png
//! ```
//!
//! File names derive from the nif alone, so the record store never needs to
//! remember where a photo lives.

use std::{
  future::Future,
  io,
  path::{Path, PathBuf},
};

use tokio::fs;
use tracing::{debug, warn};

use crate::{
  Error, Result, atomic::write_atomic,
  person::{Nif, Photo},
};

/// A directory holding one `<nif>.png` per person with a photo.
#[derive(Debug, Clone)]
pub struct PhotoDir {
  root: PathBuf,
}

impl PhotoDir {
  /// Use (and create if needed) `root` as the photo directory.
  pub async fn create(root: impl Into<PathBuf>) -> io::Result<Self> {
    let root = root.into();
    fs::create_dir_all(&root).await?;
    Ok(Self { root })
  }

  /// Where the photo for `nif` lives, whether or not it exists yet.
  pub fn path_for(&self, nif: &Nif) -> PathBuf {
    self.root.join(format!("{nif}.png"))
  }

  /// Write (or overwrite) the photo for `nif`; returns its path.
  pub async fn store(&self, nif: &Nif, photo: &Photo) -> io::Result<PathBuf> {
    let path = self.path_for(nif);
    write_atomic(&path, photo.as_png()).await?;
    debug!(%nif, path = %path.display(), bytes = photo.byte_len(), "photo written");
    Ok(path)
  }

  /// Write the photo if there is one, otherwise remove any stale file. Either
  /// way the directory ends up matching `photo`.
  pub async fn sync(&self, nif: &Nif, photo: Option<&Photo>) -> io::Result<Option<PathBuf>> {
    match photo {
      Some(photo) => self.store(nif, photo).await.map(Some),
      None => {
        self.remove(nif).await?;
        Ok(None)
      }
    }
  }

  /// Load the photo for `nif`, or `None` if there is no usable file. A file
  /// that is not a PNG is logged and read as absent; see [`load_png_or_warn`].
  pub async fn load(&self, nif: &Nif) -> Result<Option<Photo>> {
    load_png_or_warn(&self.path_for(nif)).await
  }

  /// Remove the photo for `nif`. A missing file is not an error; returns
  /// whether a file was actually removed.
  pub async fn remove(&self, nif: &Nif) -> io::Result<bool> {
    let path = self.path_for(nif);
    match fs::remove_file(&path).await {
      Ok(()) => {
        debug!(%nif, "photo removed");
        Ok(true)
      }
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
      Err(e) => Err(e),
    }
  }

  /// Remove every file in the directory.
  ///
  /// Best-effort: a file that cannot be removed is logged and returned, and
  /// the sweep carries on. Only failing to list the directory is an error.
  pub async fn clear(&self) -> io::Result<Vec<PathBuf>> {
    let files = self.files().await?;
    Ok(sweep(files, |path| async move { fs::remove_file(path).await }).await)
  }

  async fn files(&self) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut entries = match fs::read_dir(&self.root).await {
      Ok(entries) => entries,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(files),
      Err(e) => return Err(e),
    };
    while let Some(entry) = entries.next_entry().await? {
      if !entry.file_type().await?.is_dir() {
        files.push(entry.path());
      }
    }
    Ok(files)
  }
}

/// Remove each of `files` with `remove`; returns the ones that are still
/// there. A file that has already gone counts as removed.
async fn sweep<F, Fut>(files: Vec<PathBuf>, mut remove: F) -> Vec<PathBuf>
where
  F: FnMut(PathBuf) -> Fut,
  Fut: Future<Output = io::Result<()>>,
{
  let mut leftovers = Vec::new();
  for path in files {
    if let Err(e) = remove(path.clone()).await
      && e.kind() != io::ErrorKind::NotFound
    {
      warn!(path = %path.display(), error = %e, "could not remove photo");
      leftovers.push(path);
    }
  }
  leftovers
}

/// Read a PNG from `path`. A missing file is `Ok(None)`; a file that is not a
/// PNG is a decode error.
pub async fn load_png(path: &Path) -> Result<Option<Photo>> {
  let bytes = match fs::read(path).await {
    Ok(bytes) => bytes,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
    Err(e) => return Err(e.into()),
  };
  Photo::from_png(bytes)
    .map(Some)
    .map_err(|e| Error::Decode(format!("{}: {e}", path.display())))
}

/// [`load_png`], except that a file which is not a PNG is logged at `warn`
/// and read as absent. One damaged photo must not hide its record.
pub async fn load_png_or_warn(path: &Path) -> Result<Option<Photo>> {
  match load_png(path).await {
    Err(Error::Decode(reason)) => {
      warn!(%reason, "ignoring unreadable photo");
      Ok(None)
    }
    other => other,
  }
}
