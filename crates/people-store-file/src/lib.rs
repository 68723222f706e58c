//! File-backed stores for People.
//!
//! - [`FlatFileStore`]: line-per-record text file, photos as side PNG files.
//! - [`SerialStore`]: one versioned binary blob with photos embedded.

mod flat;
mod line;
mod serial;

pub mod error;

pub use error::{Error, Result};
pub use flat::{FlatFileStore, LineError};
pub use serial::SerialStore;

#[cfg(test)]
mod tests;
