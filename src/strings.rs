//! String interning table shared by every node of one [`crate::Factory`].
//!
//! Node attributes never store strings directly; they store [`Key`] values
//! handed out by the [`StringTable`]. Interning the same value twice yields
//! the same key, distinct values never collide, and keys stay stable for the
//! lifetime of the owning factory. Key `0` is reserved for the empty/absent
//! string, so a zero key in a node record always means "no value".
//!
//! On save, only the keys actually referenced by a persisted node are written
//! out (the encoder marks them while walking the records); on load the table
//! is rehydrated and keys are remapped, so persisted keys are not required to
//! survive a round-trip verbatim - only the strings behind them are.

use std::collections::HashMap;
use std::fmt;

/// Integer key of an interned string, `0` meaning empty/absent.
///
/// Keys are only meaningful together with the [`StringTable`] that issued
/// them; two factories never share keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Key(u32);

impl Key {
    /// The reserved key of the empty/absent string.
    pub const EMPTY: Key = Key(0);

    /// Builds a key from its raw wire representation.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Key {
        Key(raw)
    }

    /// The raw wire representation of this key.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns true for the reserved empty key.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bidirectional string <-> key map owned by one factory.
///
/// Entry `0` is the empty string; real entries are issued dense, ascending
/// keys in interning order. Lookup of a key that this table never issued
/// yields the empty string, mirroring the "absent" meaning of key `0`.
#[derive(Debug)]
pub struct StringTable {
    /// Dense store, indexed by key. `entries[0]` is always `""`.
    entries: Vec<String>,
    /// Reverse map from string to its key.
    map: HashMap<String, Key>,
}

impl Default for StringTable {
    fn default() -> StringTable {
        StringTable::new()
    }
}

impl StringTable {
    /// Creates an empty table holding only the reserved empty entry.
    #[must_use]
    pub fn new() -> StringTable {
        StringTable {
            entries: vec![String::new()],
            map: HashMap::new(),
        }
    }

    /// Interns a string, returning its stable key.
    ///
    /// Interning an identical value twice returns the same key; the empty
    /// string always maps to [`Key::EMPTY`].
    pub fn intern(&mut self, value: &str) -> Key {
        if value.is_empty() {
            return Key::EMPTY;
        }
        if let Some(&key) = self.map.get(value) {
            return key;
        }
        let key = Key(u32::try_from(self.entries.len()).unwrap_or(u32::MAX));
        self.entries.push(value.to_string());
        self.map.insert(value.to_string(), key);
        key
    }

    /// Resolves a key to its string.
    ///
    /// [`Key::EMPTY`] and keys this table never issued resolve to `""`.
    #[must_use]
    pub fn get(&self, key: Key) -> &str {
        self.entries
            .get(key.0 as usize)
            .map_or("", String::as_str)
    }

    /// Number of entries, the reserved empty entry included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no string beyond the reserved empty entry has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 1
    }

    /// Iterates over all real entries as `(key, value)` pairs, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, &str)> {
        self.entries
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, s)| (Key(i as u32), s.as_str()))
    }
}
