//! Append-only byte arena for key strings.
//!
//! Keys live in two raw byte buffers:
//!
//! ```text
//! index:   [len:4][start:4] [len:4][start:4] ...   one record per key, LE
//! payload: [key 0 bytes][key 1 bytes] ...
//! ```
//!
//! A [`Locator`] is a record number, not an address. Both buffers may be
//! reallocated as they grow; the copy is byte-exact and offset-preserving,
//! so every locator handed out earlier keeps resolving to the same bytes.

use tracing::debug;

use crate::error::{Error, Result};

/// Size of one index record.
const RECORD_SIZE: usize = 8;

/// Default number of index records reserved up front.
const DEFAULT_KEYS: usize = 16;

/// Default payload bytes reserved up front.
const DEFAULT_PAYLOAD_BYTES: usize = 100;

/// Handle to a key stored in a [`KeyArena`].
///
/// Only meaningful for the arena that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Locator(u32);

impl Locator {
    /// Reserved value that no arena ever issues.
    pub const NONE: Locator = Locator(u32::MAX);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    /// Record number of this locator.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub(crate) const fn raw(self) -> u32 {
        self.0
    }
}

#[inline]
pub(crate) fn read_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

#[inline]
pub(crate) fn write_u32(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

/// Make room for `additional` more bytes, at least doubling capacity when
/// a reallocation is needed.
fn grow_for(buf: &mut Vec<u8>, additional: usize, name: &'static str) -> Result<()> {
    let needed = buf
        .len()
        .checked_add(additional)
        .ok_or(Error::CapacityOverflow)?;
    let old = buf.capacity();
    if needed <= old {
        return Ok(());
    }

    let new_cap = old.saturating_mul(2).max(needed);
    buf.try_reserve_exact(new_cap - buf.len())
        .map_err(|_| Error::AllocationFailure { requested: new_cap })?;
    debug!(buffer = name, old, new = buf.capacity(), "key arena grew");
    Ok(())
}

/// Append-only store of variable-length keys.
#[derive(Clone, Debug)]
pub struct KeyArena {
    index: Vec<u8>,
    payload: Vec<u8>,
}

impl KeyArena {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_KEYS, DEFAULT_PAYLOAD_BYTES)
    }

    /// Create an arena with room for `keys` records and `bytes` payload
    /// bytes before the first growth.
    pub fn with_capacity(keys: usize, bytes: usize) -> Self {
        Self {
            index: Vec::with_capacity(keys.saturating_mul(RECORD_SIZE)),
            payload: Vec::with_capacity(bytes),
        }
    }

    /// Fallible [`with_capacity`](Self::with_capacity).
    pub fn try_with_capacity(keys: usize, bytes: usize) -> Result<Self> {
        let index_bytes = keys
            .checked_mul(RECORD_SIZE)
            .ok_or(Error::CapacityOverflow)?;
        let mut index = Vec::new();
        index
            .try_reserve_exact(index_bytes)
            .map_err(|_| Error::AllocationFailure {
                requested: index_bytes,
            })?;
        let mut payload = Vec::new();
        payload
            .try_reserve_exact(bytes)
            .map_err(|_| Error::AllocationFailure { requested: bytes })?;
        Ok(Self { index, payload })
    }

    /// Number of keys stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len() / RECORD_SIZE
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Total key bytes stored.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Bytes reserved by both buffers.
    pub fn capacity_bytes(&self) -> usize {
        self.index.capacity() + self.payload.capacity()
    }

    pub fn shrink_to_fit(&mut self) {
        self.index.shrink_to_fit();
        self.payload.shrink_to_fit();
    }

    /// Whether `locator` was issued by this arena.
    #[inline]
    pub fn contains(&self, locator: Locator) -> bool {
        !locator.is_none() && locator.index() < self.len()
    }

    /// Append `key` and return its locator.
    pub fn add(&mut self, key: &[u8]) -> Result<Locator> {
        let len = u32::try_from(key.len()).map_err(|_| Error::KeyTooLong { len: key.len() })?;

        let start = self.payload.len();
        match start.checked_add(key.len()) {
            Some(end) if end <= u32::MAX as usize => {}
            _ => return Err(Error::CapacityOverflow),
        }
        // u32::MAX is Locator::NONE.
        let record = self.len();
        if record >= u32::MAX as usize {
            return Err(Error::CapacityOverflow);
        }

        grow_for(&mut self.payload, key.len(), "payload")?;
        grow_for(&mut self.index, RECORD_SIZE, "index")?;

        self.payload.extend_from_slice(key);
        let at = self.index.len();
        self.index.resize(at + RECORD_SIZE, 0);
        write_u32(&mut self.index, at, len);
        write_u32(&mut self.index, at + 4, start as u32);

        Ok(Locator::from_raw(record as u32))
    }

    /// Bytes stored under `locator`.
    pub fn get(&self, locator: Locator) -> Result<&[u8]> {
        if !self.contains(locator) {
            return Err(Error::InvalidLocator(locator));
        }
        Ok(self.bytes_at(locator))
    }

    /// Unchecked-by-contract lookup for locators the caller obtained from
    /// this arena. Panics on a foreign locator.
    #[inline]
    pub(crate) fn bytes_at(&self, locator: Locator) -> &[u8] {
        debug_assert!(self.contains(locator), "foreign locator {locator:?}");
        let o = locator.index() * RECORD_SIZE;
        let len = read_u32(&self.index, o) as usize;
        let start = read_u32(&self.index, o + 4) as usize;
        &self.payload[start..start + len]
    }
}

impl Default for KeyArena {
    fn default() -> Self {
        Self::new()
    }
}
