//! In-memory backends for the People store.
//!
//! Nothing here outlives the process. [`ListStore`] scans a `Vec`,
//! [`MapStore`] indexes a `HashMap` by nif; callers cannot tell them apart
//! through [`people_core::store::PersonStore`].

mod list;
mod map;

pub use list::ListStore;
pub use map::MapStore;
