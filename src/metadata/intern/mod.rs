//! Interned keys and canonical instances.
//!
//! An *interned key* is a 32-bit integer derived from the structural content of a metadata
//! entity. Two references that describe the same logical entity get the same key even when
//! they are distinct objects, loaded from different places.
//!
//! # Architecture
//!
//! - [`InternFactory`] - one key derivation operation per descriptor shape
//! - [`KeyFactory`] - the engine, with a sequential or a hashed [`KeyScheme`]
//! - [`CachingInternFactory`] - wraps an engine and hands out one canonical instance per
//!   structurally distinct generic instance (and array/pointer shape)
//!
//! Keys of sub-components feed into the key of the composite: a vector key is derived from
//! the element type key, a method key from its containing type key, name and signature.
//!
//! # Examples
//!
//! ```rust
//! use cilintern::metadata::{
//!     identity::{AssemblyIdentity, AssemblyVersion},
//!     intern::{InternFactory, KeyFactory},
//!     names::NameTable,
//!     typesystem::{NamespaceReference, TypeReference},
//! };
//!
//! let names = NameTable::new();
//! let factory = KeyFactory::default();
//!
//! let load = || {
//!     let version = AssemblyVersion::new(4, 0, 0, 0);
//!     let corlib = AssemblyIdentity::new(names.intern("mscorlib"), version);
//!     let root = NamespaceReference::root(corlib);
//!     let system = NamespaceReference::nested(&root, names.intern("System"));
//!     TypeReference::vector(&TypeReference::namespace_type(&system, names.intern("Int32"), 0))
//! };
//!
//! // Built twice from scratch, keyed identically.
//! assert_eq!(factory.type_reference_key(&load())?, factory.type_reference_key(&load())?);
//! # Ok::<(), cilintern::Error>(())
//! ```

mod caching;
mod config;
mod descriptor;
mod factory;

pub use caching::{CacheStatistics, CachingInternFactory};
pub use config::{InternConfig, KeyScheme};
pub use factory::KeyFactory;

use crate::{
    metadata::{
        identity::{AssemblyIdentity, ModuleIdentity, UnitIdentity},
        names::Name,
        typesystem::{
            CustomModifier, FieldReference, MethodReference, MethodSignature,
            NamespaceReference, TypeRefRc, TypeReference,
        },
    },
    Result,
};

/// Derives interned keys for metadata entities.
///
/// Every operation is a pure function of the structural content of its input: sub-components
/// contribute their own keys, never their object identity. Implementations must not keep the
/// entities they are handed alive.
///
/// # Errors
///
/// Key derivation only fails on caller errors:
/// - [`crate::Error::AbsentReference`] if a required sub-reference is unresolved
/// - [`crate::Error::Malformed`] if a descriptor is structurally invalid
/// - [`crate::Error::FactoryReleased`] if a released factory is used
pub trait InternFactory: Send + Sync {
    /// `true` if distinct descriptors are guaranteed to receive distinct keys.
    ///
    /// Caches that rely on key equality implying structural equality must check this first.
    fn intern_keys_are_reliably_unique(&self) -> bool;

    /// Key of an assembly identity.
    ///
    /// The name is compared ignoring case and the culture is case folded.
    fn assembly_key(&self, assembly: &AssemblyIdentity) -> Result<u32>;

    /// Key of a module identity, including its containing assembly if any.
    fn module_key(&self, module: &ModuleIdentity) -> Result<u32>;

    /// Key of an assembly or module.
    fn unit_key(&self, unit: &UnitIdentity) -> Result<u32> {
        match unit {
            UnitIdentity::Assembly(assembly) => self.assembly_key(assembly),
            UnitIdentity::Module(module) => self.module_key(module),
        }
    }

    /// Key of a namespace; the root namespace is keyed by its unit.
    fn namespace_key(&self, namespace: &NamespaceReference) -> Result<u32>;

    /// Key of a type named through its namespace.
    fn namespace_type_key(
        &self,
        namespace: &NamespaceReference,
        name: &Name,
        generic_parameter_count: u16,
    ) -> Result<u32>;

    /// Key of a type named through its enclosing type.
    fn nested_type_key(
        &self,
        containing_type: &TypeReference,
        name: &Name,
        generic_parameter_count: u16,
    ) -> Result<u32>;

    /// Key of `element_type[]`.
    fn vector_type_key(&self, element_type: &TypeReference) -> Result<u32>;

    /// Key of a general array.
    ///
    /// `sizes` and `lower_bounds` describe the leading dimensions and may be shorter than
    /// `rank`, but not longer. A rank of 0 is malformed.
    fn matrix_type_key(
        &self,
        element_type: &TypeReference,
        rank: u32,
        sizes: &[u64],
        lower_bounds: &[i32],
    ) -> Result<u32>;

    /// Key of `generic_type<generic_arguments...>`; argument order matters.
    fn generic_type_instance_key(
        &self,
        generic_type: &TypeReference,
        generic_arguments: &[TypeRefRc],
    ) -> Result<u32>;

    /// Key of `target_type*`.
    fn pointer_type_key(&self, target_type: &TypeReference) -> Result<u32>;

    /// Key of `ref target_type`.
    fn managed_pointer_type_key(&self, target_type: &TypeReference) -> Result<u32>;

    /// Key of type parameter `index` of `defining_type`.
    fn generic_type_parameter_key(&self, defining_type: &TypeReference, index: u16) -> Result<u32>;

    /// Key of method type parameter `index` of `defining_method`.
    fn generic_method_parameter_key(
        &self,
        defining_method: &MethodReference,
        index: u16,
    ) -> Result<u32>;

    /// Key of a function pointer type.
    fn function_pointer_type_key(&self, signature: &MethodSignature) -> Result<u32>;

    /// Key of a type with custom modifiers; modifier order matters.
    fn modified_type_key(
        &self,
        unmodified_type: &TypeReference,
        custom_modifiers: &[CustomModifier],
    ) -> Result<u32>;

    /// Key of a field reference.
    fn field_key(&self, field: &FieldReference) -> Result<u32>;

    /// Key of a method reference.
    fn method_key(&self, method: &MethodReference) -> Result<u32>;

    /// Key of any type expression, by its shape.
    fn type_reference_key(&self, type_ref: &TypeReference) -> Result<u32>;
}
