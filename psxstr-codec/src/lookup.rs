//! The version-disambiguation lookup table.
//!
//! Titles with a randomized version tag cannot be identified from the
//! header alone. A precomputed table maps a 32-bit key built from the
//! random tag plus 15 bits of actual frame data to the sub-dialect the
//! frame was encoded with. The table ships as a packaged binary blob:
//! a 4-byte little-endian entry count followed by that many 4-byte
//! little-endian keys, sorted ascending, with no trailer permitted.
//!
//! Each stored entry packs the key in its top 31 bits and the dialect in
//! its low bit, so a probe has to compare against both possible stored
//! values (`key | 0` and `key | 1`).

use std::io::Read;
use std::sync::OnceLock;

use psxstr_core::LookupTableError;

use crate::variant::Dialect;

static GLOBAL: OnceLock<VersionLookupTable> = OnceLock::new();

/// An immutable, sorted table of version-disambiguation keys.
///
/// Read-only after construction; safe to share across any number of
/// concurrent frame decodes.
#[derive(Debug, Clone)]
pub struct VersionLookupTable {
    keys: Vec<u32>,
}

impl VersionLookupTable {
    /// Parse the packaged blob format. Trailing bytes, truncation, and
    /// out-of-order entries are load-time errors.
    pub fn from_bytes(data: &[u8]) -> Result<Self, LookupTableError> {
        if data.len() < 4 {
            return Err(LookupTableError::Truncated {
                expected: 4,
                actual: data.len(),
            });
        }
        let count = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
        let expected = 4 + count * 4;
        if data.len() < expected {
            return Err(LookupTableError::Truncated {
                expected,
                actual: data.len(),
            });
        }
        if data.len() > expected {
            return Err(LookupTableError::TrailingData {
                extra: data.len() - expected,
            });
        }

        let mut keys = Vec::with_capacity(count);
        for i in 0..count {
            let at = 4 + i * 4;
            let key = u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);
            if let Some(&prev) = keys.last()
                && key < prev
            {
                return Err(LookupTableError::NotSorted { index: i });
            }
            keys.push(key);
        }
        Ok(Self { keys })
    }

    pub fn from_reader(mut reader: impl Read) -> Result<Self, LookupTableError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Binary-search for an entry whose top 31 bits equal `key` (the low
    /// bit of `key` is ignored). A hit's low bit selects the dialect; a
    /// miss means the frame does not belong to these titles.
    pub fn dialect_for_key(&self, key: u32) -> Option<Dialect> {
        let key = key & !1;
        let mut lo = 0usize;
        let mut hi = self.keys.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let entry = self.keys[mid];
            if entry < key {
                // Below both candidate stored values.
                lo = mid + 1;
            } else if entry > (key | 1) {
                // Above both candidate stored values.
                hi = mid;
            } else {
                return Some(if entry & 1 == 0 { Dialect::A } else { Dialect::B });
            }
        }
        None
    }

    /// Install a table as the process-wide shared instance. Returns false
    /// if one was already installed (the existing table is kept).
    pub fn install(self) -> bool {
        GLOBAL.set(self).is_ok()
    }

    /// The process-wide table, if one has been installed.
    pub fn global() -> Option<&'static VersionLookupTable> {
        GLOBAL.get()
    }
}

#[cfg(test)]
#[path = "tests/lookup_tests.rs"]
mod tests;
