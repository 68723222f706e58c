//! SQLite backend for the People store.
//!
//! Wraps [`tokio_rusqlite`] so database work runs off the async runtime.
//! Photos are not stored in the database; the `photo` column holds the path
//! of a PNG in the store's photo directory.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
