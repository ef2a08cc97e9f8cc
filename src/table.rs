//! Open-addressed hash table over a raw slot buffer.
//!
//! Slot layout (8 bytes, little endian):
//!
//! ```text
//! [locator:4][value:4]
//! ```
//!
//! A slot is empty iff its locator is [`Locator::NONE`]. The value field of
//! an empty slot is ignored, so `0` is an ordinary value everywhere.
//!
//! Collisions are resolved by linear probing with wrap-around. There are no
//! tombstones; keys are never removed.

use std::fmt;

use tracing::debug;

use crate::arena::{read_u32, write_u32, KeyArena, Locator};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::hash;

const SLOT_SIZE: usize = 8;

const EMPTY_SLOT: [u8; SLOT_SIZE] = [0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0];

#[inline]
fn slot_locator(slots: &[u8], i: usize) -> Locator {
    Locator::from_raw(read_u32(slots, i * SLOT_SIZE))
}

#[inline]
fn slot_value(slots: &[u8], i: usize) -> i32 {
    read_u32(slots, i * SLOT_SIZE + 4) as i32
}

#[inline]
fn write_value(slots: &mut [u8], i: usize, value: i32) {
    write_u32(slots, i * SLOT_SIZE + 4, value as u32);
}

#[inline]
fn write_slot(slots: &mut [u8], i: usize, locator: Locator, value: i32) {
    write_u32(slots, i * SLOT_SIZE, locator.raw());
    write_value(slots, i, value);
}

fn push_empty_slots(slots: &mut Vec<u8>, capacity: usize) {
    for _ in 0..capacity {
        slots.extend_from_slice(&EMPTY_SLOT);
    }
}

/// Allocate `capacity` empty slots, reporting failure instead of aborting.
fn try_alloc_slots(capacity: usize) -> Result<Vec<u8>> {
    let bytes = capacity
        .checked_mul(SLOT_SIZE)
        .ok_or(Error::CapacityOverflow)?;
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(bytes)
        .map_err(|_| Error::AllocationFailure { requested: bytes })?;
    push_empty_slots(&mut slots, capacity);
    Ok(slots)
}

/// Outcome of probing for a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Probe {
    /// Slot already holding the key.
    Occupied(usize),
    /// First empty slot on the key's probe sequence.
    Vacant(usize),
}

/// Memory usage snapshot of a table.
#[derive(Debug, Clone, Default)]
pub struct MemoryStats {
    /// Bytes reserved for the slot array
    pub slot_bytes: usize,
    /// Bytes reserved by the key arena (index + payload)
    pub key_bytes: usize,
    /// Number of keys stored
    pub num_keys: usize,
    /// Number of slots
    pub capacity: usize,
    /// Occupied slots / capacity
    pub load_factor: f64,
    /// Total bytes per stored key (0 when empty)
    pub bytes_per_key: f64,
}

/// Map from string keys to `i32` values.
///
/// Keys are copied into an owned [`KeyArena`]; slots only hold the key's
/// locator and the value. Once the occupied fraction exceeds the configured
/// load factor, the next `put` doubles the slot array and rehashes every
/// live slot before inserting.
pub struct HashTable {
    slots: Vec<u8>,
    capacity: usize,
    filled: usize,
    keys: KeyArena,
    max_load_factor: f64,
}

impl HashTable {
    /// Create a table with `initial_capacity` slots and the default load
    /// factor. Capacities below [`MIN_CAPACITY`](crate::MIN_CAPACITY),
    /// including `0`, are raised to it; [`with_config`](Self::with_config)
    /// rejects `0` instead.
    ///
    /// # Panics
    ///
    /// Panics if the initial buffers cannot be allocated, as
    /// `Vec::with_capacity` does. Use `with_config` to get an error instead.
    pub fn new(initial_capacity: usize) -> Self {
        Self::build(&Config::default().with_initial_capacity(initial_capacity))
    }

    /// Create a table from a validated `config`.
    ///
    /// Oversized initial buffers are reported as `CapacityOverflow` or
    /// `AllocationFailure`.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let capacity = config.effective_capacity();
        let key_bytes = capacity
            .checked_mul(config.key_bytes_per_slot)
            .ok_or(Error::CapacityOverflow)?;
        Ok(Self {
            slots: try_alloc_slots(capacity)?,
            capacity,
            filled: 0,
            keys: KeyArena::try_with_capacity(capacity, key_bytes)?,
            max_load_factor: config.max_load_factor,
        })
    }

    fn build(config: &Config) -> Self {
        let capacity = config.effective_capacity();
        let mut slots = Vec::with_capacity(capacity.saturating_mul(SLOT_SIZE));
        push_empty_slots(&mut slots, capacity);
        Self {
            slots,
            capacity,
            filled: 0,
            keys: KeyArena::with_capacity(
                capacity,
                capacity.saturating_mul(config.key_bytes_per_slot),
            ),
            max_load_factor: config.max_load_factor,
        }
    }

    /// Number of keys stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.filled
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn load_factor(&self) -> f64 {
        self.filled as f64 / self.capacity as f64
    }

    /// The arena holding this table's keys.
    #[cfg(test)]
    pub(crate) fn keys(&self) -> &KeyArena {
        &self.keys
    }

    /// Contents of slot `index`, or `None` if it is empty or out of range.
    pub fn slot(&self, index: usize) -> Option<(Locator, i32)> {
        if index >= self.capacity {
            return None;
        }
        let locator = slot_locator(&self.slots, index);
        (!locator.is_none()).then(|| (locator, slot_value(&self.slots, index)))
    }

    pub fn memory_usage(&self) -> usize {
        self.slots.capacity() + self.keys.capacity_bytes()
    }

    pub fn stats(&self) -> MemoryStats {
        let slot_bytes = self.slots.capacity();
        let key_bytes = self.keys.capacity_bytes();
        MemoryStats {
            slot_bytes,
            key_bytes,
            num_keys: self.filled,
            capacity: self.capacity,
            load_factor: self.load_factor(),
            bytes_per_key: if self.filled > 0 {
                (slot_bytes + key_bytes) as f64 / self.filled as f64
            } else {
                0.0
            },
        }
    }

    /// Release spare arena capacity. The slot array keeps its size.
    pub fn shrink_to_fit(&mut self) {
        self.keys.shrink_to_fit();
    }

    pub fn get(&self, key: &str) -> Option<i32> {
        match self.probe(key.as_bytes()) {
            Probe::Occupied(i) => Some(slot_value(&self.slots, i)),
            Probe::Vacant(_) => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        matches!(self.probe(key.as_bytes()), Probe::Occupied(_))
    }

    /// Store `value` under `key`, overwriting any previous value.
    pub fn put(&mut self, key: &str, value: i32) -> Result<()> {
        self.insert(key, value).map(|_| ())
    }

    /// Like [`put`](Self::put), returning the value previously stored under
    /// `key`.
    pub fn insert(&mut self, key: &str, value: i32) -> Result<Option<i32>> {
        // Checked once against the pre-insert load.
        if self.needs_resize() {
            self.resize()?;
        }

        match self.probe(key.as_bytes()) {
            Probe::Occupied(i) => {
                let old = slot_value(&self.slots, i);
                write_value(&mut self.slots, i, value);
                Ok(Some(old))
            }
            Probe::Vacant(i) => {
                let locator = self.keys.add(key.as_bytes())?;
                write_slot(&mut self.slots, i, locator, value);
                self.filled += 1;
                Ok(None)
            }
        }
    }

    /// Also grows when the next insert would take the last empty slot, so
    /// probe loops always meet an empty slot.
    #[inline]
    fn needs_resize(&self) -> bool {
        self.load_factor() > self.max_load_factor || self.filled + 1 >= self.capacity
    }

    fn probe(&self, key: &[u8]) -> Probe {
        let mut i = hash::bucket(hash::fnv1a(key), self.capacity);
        for _ in 0..self.capacity {
            let locator = slot_locator(&self.slots, i);
            if locator.is_none() {
                return Probe::Vacant(i);
            }
            if self.keys.bytes_at(locator) == key {
                return Probe::Occupied(i);
            }
            i += 1;
            if i == self.capacity {
                i = 0;
            }
        }
        unreachable!("slot array has no empty slot");
    }

    /// Double the slot array and reinsert every live slot.
    ///
    /// The new array is allocated before anything is touched, so on failure
    /// the table is unchanged.
    fn resize(&mut self) -> Result<()> {
        let new_capacity = self
            .capacity
            .checked_mul(2)
            .ok_or(Error::CapacityOverflow)?;
        let mut new_slots = try_alloc_slots(new_capacity)?;

        for i in 0..self.capacity {
            let locator = slot_locator(&self.slots, i);
            if locator.is_none() {
                continue;
            }
            let value = slot_value(&self.slots, i);
            // Live keys are distinct, so only an empty slot is needed.
            let key = self.keys.bytes_at(locator);
            let mut j = hash::bucket(hash::fnv1a(key), new_capacity);
            while !slot_locator(&new_slots, j).is_none() {
                j += 1;
                if j == new_capacity {
                    j = 0;
                }
            }
            write_slot(&mut new_slots, j, locator, value);
        }

        debug!(
            old_capacity = self.capacity,
            new_capacity,
            filled = self.filled,
            "hash table resized"
        );
        self.slots = new_slots;
        self.capacity = new_capacity;
        Ok(())
    }
}

impl Default for HashTable {
    fn default() -> Self {
        Self::build(&Config::default())
    }
}

impl fmt::Debug for HashTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashTable")
            .field("capacity", &self.capacity)
            .field("len", &self.filled)
            .field("load_factor", &self.load_factor())
            .finish()
    }
}
