//! Tests for the flat-file and serialized stores against temporary
//! directories.

use chrono::NaiveDate;
use people_core::{
  ErrorKind,
  person::{Nif, PNG_SIGNATURE, Person, Photo},
  registry::Registry,
  store::PersonStore,
};
use tempfile::TempDir;

use crate::{FlatFileStore, SerialStore, serial};

fn nif(s: &str) -> Nif { Nif::new(s).unwrap() }

fn john() -> Person {
  Person::new(nif("12345678X"), "John Doe", "612352892", "08907")
}

fn photo(tag: u8) -> Photo {
  let mut bytes = PNG_SIGNATURE.to_vec();
  bytes.extend_from_slice(&[0, 0, 0, 13, tag]);
  Photo::from_png(bytes).unwrap()
}

fn ana() -> Person {
  Person::new(nif("87654321Z"), "Ana Ruiz", "699000111", "28001")
    .with_date_of_birth(NaiveDate::from_ymd_opt(1985, 6, 30).unwrap())
    .with_photo(photo(1))
}

async fn open_flat(dir: &TempDir) -> Registry<FlatFileStore> {
  Registry::new(FlatFileStore::open(dir.path()).await.expect("flat store"))
}

async fn open_serial(dir: &TempDir) -> Registry<SerialStore> {
  Registry::new(SerialStore::open(dir.path()).await.expect("serial store"))
}

// ─── Flat file ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn flat_single_record_lifecycle() {
  let dir = TempDir::new().unwrap();
  let mut r = open_flat(&dir).await;

  r.insert(john()).await.unwrap();
  let all = r.read_all().await.unwrap();
  assert_eq!(all.len(), 1);
  assert!(all[0].same_contents(&john()));
  assert_eq!(r.count().await.unwrap(), 1);

  r.delete_all().await.unwrap();
  assert!(r.read_all().await.unwrap().is_empty());
  assert_eq!(r.count().await.unwrap(), 0);
}

#[tokio::test]
async fn flat_roundtrips_optionals_and_photo() {
  let dir = TempDir::new().unwrap();
  let mut r = open_flat(&dir).await;
  r.insert(john()).await.unwrap();
  r.insert(ana()).await.unwrap();

  let photo_path = dir.path().join("photos").join("87654321Z.png");
  assert_eq!(std::fs::read(&photo_path).unwrap(), photo(1).as_png());
  assert!(!dir.path().join("photos").join("12345678X.png").exists());

  let bare = r.read(&nif("12345678X")).await.unwrap().unwrap();
  assert!(bare.same_contents(&john()));
  assert_eq!(bare.date_of_birth, None);
  assert_eq!(bare.photo, None);

  let full = r.read(&nif("87654321Z")).await.unwrap().unwrap();
  assert!(full.same_contents(&ana()));
}

#[tokio::test]
async fn flat_survives_reopen() {
  let dir = TempDir::new().unwrap();
  open_flat(&dir).await.insert(ana()).await.unwrap();

  let r = open_flat(&dir).await;
  let stored = r.read(&nif("87654321Z")).await.unwrap().unwrap();
  assert!(stored.same_contents(&ana()));
}

#[tokio::test]
async fn flat_corrupted_line_is_isolated() {
  let dir = TempDir::new().unwrap();
  let mut r = open_flat(&dir).await;
  r.insert(john()).await.unwrap();
  r.insert(ana()).await.unwrap();

  // Damage the first line only.
  let path = r.store().data_path().to_path_buf();
  let text = std::fs::read_to_string(&path).unwrap();
  let damaged = text.replacen("12345678X\t", "12345678X\tgarbage\t", 1);
  std::fs::write(&path, damaged).unwrap();

  let all = r.read_all().await.unwrap();
  assert_eq!(all.len(), 1);
  assert!(all[0].same_contents(&ana()));

  let scan = r.store().scan().await.unwrap();
  assert_eq!(scan.len(), 2);
  let bad = scan[0].as_ref().unwrap_err();
  assert_eq!(bad.line, 1);
  assert!(bad.reason.contains("expected 5 fields"), "{}", bad.reason);
}

#[tokio::test]
async fn flat_rewrite_keeps_undecodable_lines() {
  let dir = TempDir::new().unwrap();
  let mut r = open_flat(&dir).await;
  let path = r.store().data_path().to_path_buf();
  std::fs::write(&path, b"not a record\n\xff\xfe\n").unwrap();

  r.insert(john()).await.unwrap();

  let bytes = std::fs::read(&path).unwrap();
  assert!(bytes.starts_with(b"not a record\n\xff\xfe\n"));
  assert_eq!(r.count().await.unwrap(), 1);
  assert_eq!(r.store().scan().await.unwrap().len(), 3);
}

#[tokio::test]
async fn flat_duplicate_insert_keeps_one() {
  let dir = TempDir::new().unwrap();
  let mut r = open_flat(&dir).await;
  r.insert(john()).await.unwrap();

  let err = r.insert(john()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Domain);
  assert_eq!(r.count().await.unwrap(), 1);
}

#[tokio::test]
async fn flat_delete_missing_changes_nothing() {
  let dir = TempDir::new().unwrap();
  let mut r = open_flat(&dir).await;
  r.insert(john()).await.unwrap();
  let before = std::fs::read(r.store().data_path()).unwrap();

  let err = r.delete(&nif("0000")).await.unwrap_err();
  assert!(matches!(err, people_core::Error::NotRegistered(_)));
  assert_eq!(std::fs::read(r.store().data_path()).unwrap(), before);
}

#[tokio::test]
async fn flat_delete_removes_photo() {
  let dir = TempDir::new().unwrap();
  let mut r = open_flat(&dir).await;
  r.insert(ana()).await.unwrap();

  r.delete(&nif("87654321Z")).await.unwrap();
  assert!(r.read(&nif("87654321Z")).await.unwrap().is_none());
  assert!(!dir.path().join("photos").join("87654321Z.png").exists());
}

#[tokio::test]
async fn flat_update_without_photo_clears_it() {
  let dir = TempDir::new().unwrap();
  let mut r = open_flat(&dir).await;
  r.insert(ana()).await.unwrap();

  let replacement = Person::new(nif("87654321Z"), "Ana R.", "600000000", "28002");
  r.update(replacement.clone()).await.unwrap();

  let stored = r.read(&nif("87654321Z")).await.unwrap().unwrap();
  assert!(stored.same_contents(&replacement));
  assert!(!dir.path().join("photos").join("87654321Z.png").exists());
}

#[tokio::test]
async fn flat_update_replaces_photo() {
  let dir = TempDir::new().unwrap();
  let mut r = open_flat(&dir).await;
  r.insert(ana()).await.unwrap();

  r.update(ana().with_photo(photo(2))).await.unwrap();
  let stored = r.read(&nif("87654321Z")).await.unwrap().unwrap();
  assert_eq!(stored.photo, Some(photo(2)));
}

#[tokio::test]
async fn flat_delete_all_clears_photos() {
  let dir = TempDir::new().unwrap();
  let mut r = open_flat(&dir).await;
  r.insert(john()).await.unwrap();
  r.insert(ana()).await.unwrap();

  let cleared = r.delete_all().await.unwrap();
  assert_eq!(cleared.records, 2);
  assert!(cleared.is_clean());
  assert_eq!(std::fs::read_dir(dir.path().join("photos")).unwrap().count(), 0);
}

#[tokio::test]
async fn flat_damaged_photo_does_not_hide_records() {
  let dir = TempDir::new().unwrap();
  let mut r = open_flat(&dir).await;
  r.insert(john()).await.unwrap();
  r.insert(ana()).await.unwrap();
  let photo_path = dir.path().join("photos").join("87654321Z.png");
  std::fs::write(&photo_path, b"junk").unwrap();

  let all = r.read_all().await.unwrap();
  assert_eq!(all.len(), 2);
  let damaged = all.iter().find(|p| p.nif() == &nif("87654321Z")).unwrap();
  assert_eq!(damaged.photo, None);
  assert_eq!(damaged.name, "Ana Ruiz");

  r.delete(&nif("87654321Z")).await.unwrap();
  assert!(!photo_path.exists());
  assert_eq!(r.count().await.unwrap(), 1);
}

#[tokio::test]
async fn flat_damaged_photo_can_be_replaced() {
  let dir = TempDir::new().unwrap();
  let mut r = open_flat(&dir).await;
  r.insert(ana()).await.unwrap();
  std::fs::write(dir.path().join("photos").join("87654321Z.png"), b"junk").unwrap();

  let fixed = ana().with_photo(photo(7));
  r.update(fixed.clone()).await.unwrap();
  let stored = r.read(&nif("87654321Z")).await.unwrap().unwrap();
  assert!(stored.same_contents(&fixed));
}

// ─── Serialized ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn serial_single_record_lifecycle() {
  let dir = TempDir::new().unwrap();
  let mut r = open_serial(&dir).await;

  r.insert(john()).await.unwrap();
  let all = r.read_all().await.unwrap();
  assert_eq!(all.len(), 1);
  assert!(all[0].same_contents(&john()));
  assert_eq!(r.count().await.unwrap(), 1);

  let cleared = r.delete_all().await.unwrap();
  assert_eq!(cleared.records, 1);
  assert!(r.read_all().await.unwrap().is_empty());
  assert_eq!(r.count().await.unwrap(), 0);
}

#[tokio::test]
async fn serial_embeds_photo() {
  let dir = TempDir::new().unwrap();
  let mut r = open_serial(&dir).await;
  r.insert(ana()).await.unwrap();

  // Nothing but the blob on disk.
  let names: Vec<String> = std::fs::read_dir(dir.path())
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
    .collect();
  assert_eq!(names, [serial::DATA_FILE]);

  let reopened = open_serial(&dir).await;
  let stored = reopened.read(&nif("87654321Z")).await.unwrap().unwrap();
  assert!(stored.same_contents(&ana()));
}

#[tokio::test]
async fn serial_absent_fields_stay_absent() {
  let dir = TempDir::new().unwrap();
  let mut r = open_serial(&dir).await;
  r.insert(john()).await.unwrap();

  let stored = r.read(&nif("12345678X")).await.unwrap().unwrap();
  assert_eq!(stored.date_of_birth, None);
  assert_eq!(stored.photo, None);
}

#[tokio::test]
async fn serial_duplicate_and_missing_are_domain_errors() {
  let dir = TempDir::new().unwrap();
  let mut r = open_serial(&dir).await;
  r.insert(john()).await.unwrap();

  assert!(matches!(
    r.insert(john()).await,
    Err(people_core::Error::AlreadyRegistered(_))
  ));
  assert!(matches!(
    r.delete(&nif("0000")).await,
    Err(people_core::Error::NotRegistered(_))
  ));
  assert_eq!(r.count().await.unwrap(), 1);
}

#[tokio::test]
async fn serial_update_is_full_replace() {
  let dir = TempDir::new().unwrap();
  let mut r = open_serial(&dir).await;
  r.insert(ana()).await.unwrap();

  let replacement = Person::new(nif("87654321Z"), "Ana R.", "600000000", "28002");
  r.update(replacement.clone()).await.unwrap();
  let stored = r.read(&nif("87654321Z")).await.unwrap().unwrap();
  assert!(stored.same_contents(&replacement));
}

#[tokio::test]
async fn serial_delete() {
  let dir = TempDir::new().unwrap();
  let mut r = open_serial(&dir).await;
  r.insert(john()).await.unwrap();
  r.insert(ana()).await.unwrap();

  r.delete(&nif("12345678X")).await.unwrap();
  assert!(r.read(&nif("12345678X")).await.unwrap().is_none());
  assert_eq!(r.count().await.unwrap(), 1);
}

#[tokio::test]
async fn serial_corruption_is_fatal() {
  let dir = TempDir::new().unwrap();
  let mut r = open_serial(&dir).await;
  r.insert(john()).await.unwrap();

  let path = r.store().path().to_path_buf();
  let mut bytes = std::fs::read(&path).unwrap();
  bytes.truncate(bytes.len() - 3);
  std::fs::write(&path, bytes).unwrap();

  let err = r.read_all().await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Decode);
  assert_eq!(r.read(&nif("12345678X")).await.unwrap_err().kind(), ErrorKind::Decode);
}

#[tokio::test]
async fn serial_rejects_other_versions_and_files() {
  let dir = TempDir::new().unwrap();
  let r = open_serial(&dir).await;
  let path = r.store().path().to_path_buf();

  let mut bytes = serial::encode(&[john()]).unwrap();
  bytes[4] = 9;
  std::fs::write(&path, &bytes).unwrap();
  assert!(matches!(
    r.store().read_all().await,
    Err(crate::Error::UnsupportedVersion { found: 9, expected: 1 })
  ));

  std::fs::write(&path, b"hello world").unwrap();
  assert!(matches!(r.store().read_all().await, Err(crate::Error::BadMagic(_))));
}

#[test]
fn serial_codec_empty_file_is_empty_collection() {
  assert!(serial::decode(&[]).unwrap().is_empty());
  let bytes = serial::encode(&[]).unwrap();
  assert!(bytes.starts_with(serial::MAGIC));
  assert!(serial::decode(&bytes).unwrap().is_empty());
}
