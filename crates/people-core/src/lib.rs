//! Core types and trait definitions for the People records store.
//!
//! This crate knows nothing about any particular persistence strategy. Every
//! backend crate depends on it and implements [`store::PersonStore`]; callers
//! drive a backend through [`registry::Registry`], which enforces the
//! registration rules identically for all of them.

// Trait methods spell out their `Send` bounds; the lint does not apply.
#![allow(async_fn_in_trait)]

pub mod atomic;
pub mod backend;
pub mod error;
pub mod person;
pub mod photo_dir;
pub mod registry;
pub mod store;

pub use error::{Error, ErrorKind, Result};
