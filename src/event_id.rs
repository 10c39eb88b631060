//! Stable string ids.
//!
//! Event types are keyed by a small integer computed from a name. The value
//! only has to be stable across runs; in debug builds the original name is
//! remembered so diagnostics can print `wait` instead of `0x1c3a70a4`.

use std::fmt;

#[cfg(debug_assertions)]
use once_cell::sync::Lazy;
#[cfg(debug_assertions)]
use std::collections::HashMap;
#[cfg(debug_assertions)]
use std::sync::Mutex;

#[cfg(debug_assertions)]
static NAMES: Lazy<Mutex<HashMap<u32, String>>> = Lazy::new(|| Mutex::new(HashMap::new()));

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// A stable 32-bit identifier for a string (FNV-1a).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EventId(u32);

impl EventId {
    /// The id of the empty string. Used when no event type is configured.
    pub const NULL: EventId = EventId(0);

    /// Hash `name` into an id.
    pub fn new(name: &str) -> Self {
        if name.is_empty() {
            return Self::NULL;
        }

        let mut hash = FNV_OFFSET;
        for b in name.bytes() {
            hash ^= u32::from(b);
            hash = hash.wrapping_mul(FNV_PRIME);
        }

        #[cfg(debug_assertions)]
        if let Ok(mut names) = NAMES.lock() {
            names.entry(hash).or_insert_with(|| name.to_string());
        }

        EventId(hash)
    }

    /// Wrap a precomputed hash value.
    pub const fn from_raw(hash: u32) -> Self {
        EventId(hash)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Reverse lookup of the name this id was created from.
    ///
    /// Only available in debug builds; release builds always return `None`.
    pub fn name(self) -> Option<String> {
        #[cfg(debug_assertions)]
        {
            NAMES.lock().ok().and_then(|names| names.get(&self.0).cloned())
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    }
}

impl From<&str> for EventId {
    fn from(name: &str) -> Self {
        EventId::new(name)
    }
}

impl From<&String> for EventId {
    fn from(name: &String) -> Self {
        EventId::new(name)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl fmt::Debug for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "EventId({name:?})"),
            None => write!(f, "EventId({:#010x})", self.0),
        }
    }
}
