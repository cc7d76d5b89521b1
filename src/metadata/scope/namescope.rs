//! Compact multimap from keys to shared values.
//!
//! Most member names in a type are unique, so a [`NameScope`] stores a single value inline and
//! only switches to an exactly sized array once a key receives a second value (an overload
//! set). Values are kept in insertion order and compared by object identity, never by
//! equality.

use std::{collections::HashMap, hash::Hash, iter::FusedIterator, slice, sync::Arc};

enum Slot<V> {
    Single(Arc<V>),
    Many(Box<[Arc<V>]>),
}

impl<V> Slot<V> {
    fn as_slice(&self) -> &[Arc<V>] {
        match self {
            Slot::Single(value) => slice::from_ref(value),
            Slot::Many(values) => values,
        }
    }
}

/// A multimap from `K` to shared values of `V`.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use cilintern::metadata::scope::NameScope;
///
/// let mut scope: NameScope<u32, &'static str> = NameScope::new();
/// let first = Arc::new("ToString()");
/// let second = Arc::new("ToString(IFormatProvider)");
///
/// assert!(scope.add(7, first.clone()));
/// assert!(scope.add(7, second.clone()));
/// assert!(!scope.add(7, first.clone()));
///
/// assert_eq!(scope.len(), 1);
/// assert_eq!(scope.get_values(&7).count(), 2);
/// assert_eq!(scope.get_values(&8).count(), 0);
/// ```
pub struct NameScope<K, V> {
    slots: HashMap<K, Slot<V>>,
}

impl<K: Eq + Hash, V> NameScope<K, V> {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        NameScope {
            slots: HashMap::new(),
        }
    }

    /// Create an empty scope with room for `capacity` distinct keys.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        NameScope {
            slots: HashMap::with_capacity(capacity),
        }
    }

    /// Number of distinct keys, not values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// `true` if no key has a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Associate `value` with `key`.
    ///
    /// Returns `false` and leaves the scope unchanged if this very object is already
    /// associated with `key`. A structurally equal but distinct object is added.
    pub fn add(&mut self, key: K, value: Arc<V>) -> bool {
        let Some(slot) = self.slots.get_mut(&key) else {
            self.slots.insert(key, Slot::Single(value));
            return true;
        };

        if slot.as_slice().iter().any(|v| Arc::ptr_eq(v, &value)) {
            return false;
        }

        let grown: Box<[Arc<V>]> = slot
            .as_slice()
            .iter()
            .cloned()
            .chain(std::iter::once(value))
            .collect();
        *slot = Slot::Many(grown);
        true
    }

    /// The values of `key` in insertion order; empty if the key is unknown.
    pub fn get_values(&self, key: &K) -> Values<'_, V> {
        Values::new(self.get_value_array(key))
    }

    /// The values of `key` together with their number.
    pub fn get_values_and_count(&self, key: &K) -> (Values<'_, V>, usize) {
        let values = self.get_value_array(key);
        (Values::new(values), values.len())
    }

    /// The values of `key` as a slice; empty if the key is unknown.
    pub fn get_value_array(&self, key: &K) -> &[Arc<V>] {
        match self.slots.get(key) {
            Some(slot) => slot.as_slice(),
            None => &[],
        }
    }

    /// `true` if `key` has at least one value.
    pub fn contains_key(&self, key: &K) -> bool {
        self.slots.contains_key(key)
    }

    /// One value sequence per distinct key, in no particular order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.slots.values(),
        }
    }

    /// The distinct keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.slots.keys()
    }
}

impl<K: Eq + Hash, V> Default for NameScope<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, K: Eq + Hash, V> IntoIterator for &'a NameScope<K, V> {
    type Item = Values<'a, V>;
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy sequence over the values of one key.
///
/// Clones iterate independently of each other, so a sequence can be walked more than once.
pub struct Values<'a, V> {
    inner: slice::Iter<'a, Arc<V>>,
}

impl<'a, V> Values<'a, V> {
    fn new(values: &'a [Arc<V>]) -> Self {
        Values {
            inner: values.iter(),
        }
    }

    /// The remaining values as a slice.
    pub fn as_slice(&self) -> &'a [Arc<V>] {
        self.inner.as_slice()
    }
}

impl<V> Clone for Values<'_, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a Arc<V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> DoubleEndedIterator for Values<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<V> ExactSizeIterator for Values<'_, V> {}
impl<V> FusedIterator for Values<'_, V> {}

/// Iterator over the per-key value sequences of a [`NameScope`].
pub struct Iter<'a, K, V> {
    inner: std::collections::hash_map::Values<'a, K, Slot<V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = Values<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|slot| Values::new(slot.as_slice()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Member(&'static str);

    #[test]
    fn test_single_value() {
        let mut scope = NameScope::new();
        let value = Arc::new(Member("Count"));

        assert!(scope.add(1u32, value.clone()));
        assert_eq!(scope.len(), 1);
        assert_eq!(scope.get_value_array(&1).len(), 1);
        assert!(Arc::ptr_eq(&scope.get_value_array(&1)[0], &value));
    }

    #[test]
    fn test_add_is_idempotent_by_identity() {
        let mut scope = NameScope::new();
        let value = Arc::new(Member("Count"));

        assert!(scope.add(1u32, value.clone()));
        assert!(!scope.add(1, value.clone()));
        assert_eq!(scope.get_value_array(&1).len(), 1);

        // Equal, but a distinct object.
        assert!(scope.add(1, Arc::new(Member("Count"))));
        assert_eq!(scope.get_value_array(&1).len(), 2);
        assert!(!scope.add(1, value));
        assert_eq!(scope.get_value_array(&1).len(), 2);
    }

    #[test]
    fn test_overloads_keep_insertion_order() {
        let mut scope = NameScope::new();
        let overloads: Vec<_> = ["M()", "M(int)", "M(string)", "M(int, int)"]
            .into_iter()
            .map(|s| Arc::new(Member(s)))
            .collect();

        for (added, overload) in overloads.iter().enumerate() {
            assert!(scope.add(3u32, overload.clone()));
            assert_eq!(scope.get_value_array(&3).len(), added + 1);
        }

        let names: Vec<_> = scope.get_values(&3).map(|m| m.0).collect();
        assert_eq!(names, ["M()", "M(int)", "M(string)", "M(int, int)"]);
        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn test_unknown_key_is_empty() {
        let scope: NameScope<u32, Member> = NameScope::new();
        assert!(scope.is_empty());
        assert_eq!(scope.get_values(&42).count(), 0);
        assert!(scope.get_value_array(&42).is_empty());

        let (values, count) = scope.get_values_and_count(&42);
        assert_eq!(count, 0);
        assert_eq!(values.len(), 0);
    }

    #[test]
    fn test_values_are_restartable() {
        let mut scope = NameScope::with_capacity(4);
        scope.add(5u32, Arc::new(Member("A")));
        scope.add(5, Arc::new(Member("B")));

        let (values, count) = scope.get_values_and_count(&5);
        assert_eq!(count, 2);

        let first_pass: Vec<_> = values.clone().map(|m| m.0).collect();
        let second_pass: Vec<_> = values.map(|m| m.0).collect();
        assert_eq!(first_pass, second_pass);
        assert_eq!(scope.get_values(&5).rev().next().map(|m| m.0), Some("B"));
    }

    #[test]
    fn test_iterate_all_keys() {
        let mut scope = NameScope::new();
        scope.add(1u32, Arc::new(Member("A")));
        scope.add(2, Arc::new(Member("B")));
        scope.add(2, Arc::new(Member("C")));

        let mut sizes: Vec<_> = (&scope).into_iter().map(|values| values.len()).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, [1, 2]);
        assert_eq!(scope.iter().flatten().count(), 3);

        let mut keys: Vec<_> = scope.keys().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, [1, 2]);
        assert!(scope.contains_key(&2));
    }
}
