//! # nakuma-store
//!
//! Persistence for the nakuma hub.
//!
//! The hub only ever talks to the [`Store`] trait: one async method per
//! mutation a handler can issue, plus the two queries the view materializer
//! needs. [`SqliteStore`] is the shipped adapter, backed by an `r2d2` pool of
//! `rusqlite` connections; each call runs on the blocking thread pool.

#![deny(unsafe_code)]

pub mod errors;
pub mod port;
pub mod sqlite;

pub use errors::{Result, StoreError};
pub use port::Store;
pub use sqlite::SqliteStore;
