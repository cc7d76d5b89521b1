//! Name-based member lookup.
//!
//! [`NameScope`] is the underlying multimap from a key to the (usually one, sometimes
//! several) entities sharing it. [`Scope`] builds the lookup structure used by containers
//! such as namespaces and types on top of it: members are indexed by the case-sensitive and
//! the case-insensitive key of their name, so both C#-style and VB-style lookups are a
//! single hash probe.
//!
//! # Examples
//!
//! ```rust
//! use cilintern::metadata::{
//!     names::NameTable,
//!     scope::Scope,
//!     typesystem::{FieldReference, NamespaceReference, TypeReference},
//! };
//!
//! let names = NameTable::new();
//! let root = NamespaceReference::unresolved_root();
//! let owner = TypeReference::namespace_type(&root, names.intern("Point"), 0);
//! let int32 = TypeReference::namespace_type(&root, names.intern("Int32"), 0);
//!
//! let mut members = Scope::new();
//! members.add_member(FieldReference::new(Some(owner.clone()), names.intern("X"), &int32));
//! members.add_member(FieldReference::new(Some(owner.clone()), names.intern("Y"), &int32));
//!
//! assert_eq!(members.members_named(&names.intern("X"), false).count(), 1);
//! assert_eq!(members.members_named(&names.intern("x"), false).count(), 0);
//! assert_eq!(members.members_named(&names.intern("x"), true).count(), 1);
//! ```

mod namescope;

use std::sync::Arc;

pub use namescope::{Iter, NameScope, Values};

use crate::metadata::{names::Name, typesystem::NamedEntity};

/// Members of one container, indexed by name.
///
/// Members without a name (structural type expressions) are never indexed.
pub struct Scope<M> {
    by_name: NameScope<u32, M>,
    by_name_ignoring_case: NameScope<u32, M>,
    count: usize,
}

impl<M: NamedEntity> Scope<M> {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Scope {
            by_name: NameScope::new(),
            by_name_ignoring_case: NameScope::new(),
            count: 0,
        }
    }

    /// Add `member`.
    ///
    /// Returns `false` if the member has no name or this very object was already added.
    pub fn add_member(&mut self, member: Arc<M>) -> bool {
        let Some(name) = member.name() else {
            return false;
        };
        let key = name.unique_key();
        let key_ignoring_case = name.unique_key_ignoring_case();

        if !self.by_name.add(key, member.clone()) {
            return false;
        }

        self.by_name_ignoring_case.add(key_ignoring_case, member);
        self.count += 1;
        true
    }

    /// `true` if this very object was added.
    pub fn contains(&self, member: &Arc<M>) -> bool {
        member.name().is_some_and(|name| {
            self.by_name
                .get_values(&name.unique_key())
                .any(|m| Arc::ptr_eq(m, member))
        })
    }

    /// Members named `name`, in the order they were added.
    pub fn members_named(&self, name: &Name, ignore_case: bool) -> Values<'_, M> {
        if ignore_case {
            self.by_name_ignoring_case
                .get_values(&name.unique_key_ignoring_case())
        } else {
            self.by_name.get_values(&name.unique_key())
        }
    }

    /// Members named `name` that satisfy `predicate`.
    pub fn matching_members_named<'a, P>(
        &'a self,
        name: &Name,
        ignore_case: bool,
        mut predicate: P,
    ) -> impl Iterator<Item = &'a Arc<M>> + 'a
    where
        P: FnMut(&M) -> bool + 'a,
    {
        self.members_named(name, ignore_case)
            .filter(move |m| predicate(m))
    }

    /// All members that satisfy `predicate`, in no particular order.
    pub fn matching_members<'a, P>(
        &'a self,
        mut predicate: P,
    ) -> impl Iterator<Item = &'a Arc<M>> + 'a
    where
        P: FnMut(&M) -> bool + 'a,
    {
        self.members().filter(move |m| predicate(m))
    }

    /// All members, in no particular order.
    pub fn members(&self) -> impl Iterator<Item = &Arc<M>> + '_ {
        self.by_name.iter().flatten()
    }

    /// Number of members (not names).
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// `true` if no member was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl<M: NamedEntity> Default for Scope<M> {
    fn default() -> Self {
        Self::new()
    }
}
