//! Namespace references.
//!
//! Namespaces form a chain from a nested namespace up to the root namespace of a unit.
//! A root whose unit could not be resolved is represented by `unit: None`; such a chain can
//! still be built and displayed, but nothing inside it can be keyed.

use std::sync::Arc;

use crate::metadata::{identity::UnitIdentity, names::Name};

/// Shared handle to a [`NamespaceReference`]
pub type NamespaceRc = Arc<NamespaceReference>;

/// A reference to a namespace of a unit.
#[derive(Debug, Clone)]
pub enum NamespaceReference {
    /// The root namespace of a unit
    Root {
        /// The owning unit, `None` if it is unresolved
        unit: Option<UnitIdentity>,
    },
    /// A namespace nested in another one
    Nested {
        /// The parent namespace
        containing: NamespaceRc,
        /// The segment name (e.g. "Generic" in "System.Collections.Generic")
        name: Name,
    },
}

impl NamespaceReference {
    /// The root namespace of `unit`.
    pub fn root(unit: impl Into<UnitIdentity>) -> NamespaceRc {
        Arc::new(NamespaceReference::Root {
            unit: Some(unit.into()),
        })
    }

    /// A root namespace whose unit is not known.
    #[must_use]
    pub fn unresolved_root() -> NamespaceRc {
        Arc::new(NamespaceReference::Root { unit: None })
    }

    /// A namespace named `name` inside `containing`.
    #[must_use]
    pub fn nested(containing: &NamespaceRc, name: Name) -> NamespaceRc {
        Arc::new(NamespaceReference::Nested {
            containing: containing.clone(),
            name,
        })
    }

    /// The segment name, `None` for a root namespace.
    #[must_use]
    pub fn name(&self) -> Option<&Name> {
        match self {
            NamespaceReference::Root { .. } => None,
            NamespaceReference::Nested { name, .. } => Some(name),
        }
    }

    /// The unit owning the chain, if resolved.
    #[must_use]
    pub fn unit(&self) -> Option<&UnitIdentity> {
        let mut current = self;
        loop {
            match current {
                NamespaceReference::Root { unit } => return unit.as_ref(),
                NamespaceReference::Nested { containing, .. } => current = &**containing,
            }
        }
    }

    /// Dotted name of the namespace; empty for a root.
    #[must_use]
    pub fn full_name(&self) -> String {
        match self {
            NamespaceReference::Root { .. } => String::new(),
            NamespaceReference::Nested { containing, name } => {
                let parent = containing.full_name();
                if parent.is_empty() {
                    name.as_str().to_string()
                } else {
                    format!("{}.{}", parent, name)
                }
            }
        }
    }
}
