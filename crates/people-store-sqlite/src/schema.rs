//! SQL schema for the People SQLite store.
//!
//! Executed once when the store is opened; never on the CRUD path.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS person (
    nif         CHAR(9) PRIMARY KEY NOT NULL,
    name        TEXT NOT NULL,
    phoneNumber TEXT NOT NULL,
    postalCode  TEXT NOT NULL,
    dateOfBirth TEXT,          -- ISO 8601 date (YYYY-MM-DD) or NULL
    photo       TEXT           -- path of the PNG on disk or NULL
);
";
