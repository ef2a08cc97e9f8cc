//! Table configuration.

use crate::error::{Error, Result};

/// Smallest slot count a table is created with.
///
/// Below this a table at the default load factor could fill every slot.
pub const MIN_CAPACITY: usize = 4;

/// Configuration for a [`HashTable`](crate::HashTable).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Initial number of slots. Raised to [`MIN_CAPACITY`] if smaller.
    pub initial_capacity: usize,
    /// Load factor above which `put` doubles the slot array first.
    pub max_load_factor: f64,
    /// Payload bytes reserved in the key arena per initial slot.
    pub key_bytes_per_slot: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_capacity: 16,
            max_load_factor: 0.55,
            key_bytes_per_slot: 8,
        }
    }
}

impl Config {
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_max_load_factor(mut self, max_load_factor: f64) -> Self {
        self.max_load_factor = max_load_factor;
        self
    }

    pub fn with_key_bytes_per_slot(mut self, key_bytes_per_slot: usize) -> Self {
        self.key_bytes_per_slot = key_bytes_per_slot;
        self
    }

    /// Check that the values describe a usable table.
    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 {
            return Err(Error::InvalidConfig(
                "initial_capacity must be positive".into(),
            ));
        }
        // NaN fails both comparisons.
        if !(self.max_load_factor > 0.0 && self.max_load_factor < 1.0) {
            return Err(Error::InvalidConfig(format!(
                "max_load_factor must be in (0, 1), got {}",
                self.max_load_factor
            )));
        }
        Ok(())
    }

    /// Slot count actually allocated at construction.
    pub(crate) fn effective_capacity(&self) -> usize {
        self.initial_capacity.max(MIN_CAPACITY)
    }
}
