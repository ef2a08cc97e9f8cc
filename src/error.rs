//! Error types for arena and table operations.

use thiserror::Error;

use crate::arena::Locator;

/// Errors that can occur while storing keys or growing the table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The allocator refused to grow a backing buffer.
    #[error("allocation of {requested} bytes failed")]
    AllocationFailure { requested: usize },

    /// An offset, record count or slot count left its addressable range.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// Key length does not fit the 32-bit length field.
    #[error("key too long: {len} bytes")]
    KeyTooLong { len: usize },

    /// Locator was not issued by this arena.
    #[error("invalid locator: {0:?}")]
    InvalidLocator(Locator),

    /// Rejected configuration value.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
