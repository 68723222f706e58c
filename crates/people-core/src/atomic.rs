//! Whole-file replacement that never leaves a half-written file behind.
//!
//! The bytes go to a sibling `*.tmp` file, are flushed to disk, and the temp
//! file is renamed over the target. A crash leaves either the old contents or
//! the new ones.

use std::{
  ffi::OsString,
  io,
  path::{Path, PathBuf},
};

use tokio::{fs, io::AsyncWriteExt as _};

/// Replace the contents of `path` with `bytes`.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
  let tmp_path = tmp_path_for(path);

  let mut tmp_file = fs::File::create(&tmp_path).await?;
  let written = async {
    tmp_file.write_all(bytes).await?;
    tmp_file.sync_all().await
  }
  .await;
  drop(tmp_file);

  if let Err(e) = written {
    let _ = fs::remove_file(&tmp_path).await;
    return Err(e);
  }

  fs::rename(&tmp_path, path).await
}

fn tmp_path_for(path: &Path) -> PathBuf {
  let mut name = path
    .file_name()
    .map(OsString::from)
    .unwrap_or_default();
  name.push(".tmp");
  path.with_file_name(name)
}
