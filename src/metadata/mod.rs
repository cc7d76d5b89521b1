//! Identity and canonicalization infrastructure for .NET metadata object graphs.
//!
//! Everything in this module operates on already-resolved references: names come from the
//! [`names::NameTable`], assemblies and modules are described by [`identity`] values and type
//! expressions are modelled by the closed [`typesystem::TypeReference`] enumeration.
//!
//! # Key Components
//!
//! - [`names`] - Name pool with case-sensitive and case-insensitive keys
//! - [`identity`] - Assembly and module identities
//! - [`typesystem`] - Type expressions, namespaces, fields and methods
//! - [`intern`] - Interned keys and canonical instances
//! - [`scope`] - Name to member lookup structures
//! - [`diagnostics`] - Soft-failure reporting
//!
//! # Examples
//!
//! ```rust
//! use cilintern::metadata::{
//!     intern::{InternFactory, KeyFactory},
//!     names::NameTable,
//!     typesystem::{NamespaceReference, TypeReference},
//! };
//!
//! let names = NameTable::new();
//! let factory = KeyFactory::default();
//!
//! let global = NamespaceReference::unresolved_root();
//! let first = TypeReference::namespace_type(&global, names.intern("Widget"), 0);
//! let second = TypeReference::namespace_type(&global, names.intern("Widget"), 0);
//!
//! // Distinct objects, same logical type. The unit is absent, so keying fails fast.
//! assert!(!TypeReference::same_identity(&first, &second));
//! assert!(factory.type_reference_key(&first).is_err());
//! ```

use strum::Display;

/// Collector for soft inconsistencies found while interning
pub mod diagnostics;
/// Assembly and module identities
pub mod identity;
/// Interned keys and the canonicalization cache
pub mod intern;
/// The name pool
pub mod names;
/// Name to member lookup structures
pub mod scope;
/// The closed model of type expressions and member references
pub mod typesystem;

/// The kind of metadata entity a key or reference describes.
///
/// Used to label absent references in [`crate::Error::AbsentReference`] and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EntityKind {
    /// An assembly
    Assembly,
    /// A module
    Module,
    /// A unit (assembly or module)
    Unit,
    /// A namespace
    Namespace,
    /// A type
    Type,
    /// A field
    Field,
    /// A method
    Method,
}
