//! # arena-kv
//!
//! A string to `i32` hash table whose storage is laid out by hand.
//!
//! Two structures do the work:
//!
//! - [`KeyArena`]: an append-only byte store for key strings. Each key gets
//!   a [`Locator`] that stays valid while the arena grows.
//! - [`HashTable`]: an open-addressed slot array of `(locator, value)`
//!   pairs with linear probing. It doubles and rehashes once the load
//!   factor passes 0.55 (configurable).
//!
//! Keys cannot be removed and the table is single-owner; wrap it in a lock
//! to share it across threads.
//!
//! ## Example
//!
//! ```rust
//! use arena_kv::HashTable;
//!
//! let mut table = HashTable::new(10);
//! table.put("fake", 100).unwrap();
//! table.put("another", 100).unwrap();
//! table.put("fake", 200).unwrap();
//!
//! assert_eq!(table.get("fake"), Some(200));
//! assert_eq!(table.get("another"), Some(100));
//! assert_eq!(table.get("missing"), None);
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod arena;
pub mod config;
pub mod error;
pub mod hash;
pub mod table;

pub use arena::{KeyArena, Locator};
pub use config::{Config, MIN_CAPACITY};
pub use error::{Error, Result};
pub use table::{HashTable, MemoryStats};

#[cfg(test)]
mod proptests;
