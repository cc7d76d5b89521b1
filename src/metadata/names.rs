//! Name pool for metadata identifiers.
//!
//! Every identifier that takes part in an interned key (type names, member names, namespace
//! segments, assembly names) is first interned into a [`NameTable`]. The resulting [`Name`]
//! handle carries two stable integers:
//!
//! - [`Name::unique_key`] - equal for exactly equal strings
//! - [`Name::unique_key_ignoring_case`] - equal for strings that only differ in letter case
//!
//! The key derivation engine and the member scopes only ever look at these integers, so
//! strings are hashed once, when they enter the pool.
//!
//! # Example
//!
//! ```rust
//! use cilintern::metadata::names::NameTable;
//!
//! let names = NameTable::new();
//! let upper = names.intern("Count");
//! let lower = names.intern("count");
//!
//! assert_ne!(upper.unique_key(), lower.unique_key());
//! assert_eq!(upper.unique_key_ignoring_case(), lower.unique_key_ignoring_case());
//! assert_eq!(upper, names.intern("Count"));
//! ```

use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
};

use dashmap::DashMap;

/// Handle for an interned identifier.
///
/// Equality and hashing only consider [`Name::unique_key`]; two handles from the same
/// [`NameTable`] compare equal if and only if their strings are identical.
#[derive(Clone)]
pub struct Name {
    key: u32,
    key_ignoring_case: u32,
    value: Arc<str>,
}

impl Name {
    /// Case-sensitive key of this name.
    #[must_use]
    pub fn unique_key(&self) -> u32 {
        self.key
    }

    /// Case-insensitive key of this name.
    #[must_use]
    pub fn unique_key_ignoring_case(&self) -> u32 {
        self.key_ignoring_case
    }

    /// The identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// `true` for the empty identifier.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({}, {:?})", self.key, self.value)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Thread-safe pool mapping identifier strings to [`Name`] handles.
///
/// Keys are handed out from a single counter starting at 1. The case-insensitive key of a
/// name is the case-sensitive key of its lower-cased form, so a name that is already lower
/// case has identical keys.
pub struct NameTable {
    names: DashMap<Arc<str>, Name>,
    next_key: AtomicU32,
}

impl NameTable {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        NameTable {
            names: DashMap::new(),
            next_key: AtomicU32::new(1),
        }
    }

    /// Intern `value`, returning the handle shared by every equal string.
    pub fn intern(&self, value: &str) -> Name {
        if let Some(existing) = self.names.get(value) {
            return existing.clone();
        }

        let folded = value.to_lowercase();
        let key_ignoring_case = if folded == value {
            None
        } else {
            Some(self.intern(&folded).key)
        };

        self.names
            .entry(Arc::from(value))
            .or_insert_with(|| {
                let key = self.next_key.fetch_add(1, Ordering::Relaxed);
                Name {
                    key,
                    key_ignoring_case: key_ignoring_case.unwrap_or(key),
                    value: Arc::from(value),
                }
            })
            .clone()
    }

    /// The handle for the empty identifier.
    pub fn empty_name(&self) -> Name {
        self.intern("")
    }

    /// Number of distinct strings in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// `true` if nothing has been interned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}
