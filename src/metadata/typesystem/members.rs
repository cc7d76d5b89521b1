//! Field and method references.
//!
//! A member reference names its containing type, its own name and (for methods) its
//! signature. An unresolved containing type is `None`; the member can still be indexed in
//! a [`Scope`](crate::metadata::scope::Scope) but not keyed.
//!
//! # Generic Methods
//!
//! A generic method's signature usually mentions its own type parameters, and each of
//! those parameters points back at the method. [`MethodReference::new_generic`] builds
//! both sides in one step:
//!
//! ```rust
//! use cilintern::metadata::{
//!     names::NameTable,
//!     typesystem::{MethodReference, MethodSignature, NamespaceReference, TypeReference},
//! };
//!
//! let names = NameTable::new();
//! let ns = NamespaceReference::unresolved_root();
//! let enumerable = TypeReference::namespace_type(&ns, names.intern("Enumerable"), 0);
//!
//! // static T First<T>(T[] source)
//! let first = MethodReference::new_generic(
//!     Some(enumerable),
//!     names.intern("First"),
//!     &[names.intern("T")],
//!     |parameters| {
//!         MethodSignature::new(&parameters[0])
//!             .with_parameter(&TypeReference::vector(&parameters[0]))
//!     },
//! );
//!
//! assert_eq!(first.generic_parameter_count, 1);
//! assert_eq!(first.generic_parameters.len(), 1);
//! ```

use std::sync::Arc;

use crate::metadata::{
    names::Name,
    typesystem::{CallingConvention, CustomModifier, MethodSignature, TypeRefRc, TypeReference},
};

/// Shared handle to a [`FieldReference`]
pub type FieldRefRc = Arc<FieldReference>;
/// Shared handle to a [`MethodReference`]
pub type MethodRefRc = Arc<MethodReference>;

/// An entity that can be found by name in a scope.
///
/// Structural type expressions (arrays, pointers, instances) have no name and return `None`.
pub trait NamedEntity {
    /// The entity's name, if it has one.
    fn name(&self) -> Option<&Name>;
}

/// A reference to a field.
#[derive(Debug, Clone)]
pub struct FieldReference {
    /// The type declaring the field, `None` if unresolved
    pub containing_type: Option<TypeRefRc>,
    /// Field name
    pub name: Name,
    /// Declared field type
    pub field_type: TypeRefRc,
    /// Custom modifiers of the field type
    pub custom_modifiers: Vec<CustomModifier>,
}

impl FieldReference {
    /// Create a field reference.
    #[must_use]
    pub fn new(
        containing_type: Option<TypeRefRc>,
        name: Name,
        field_type: &TypeRefRc,
    ) -> FieldRefRc {
        Arc::new(FieldReference {
            containing_type,
            name,
            field_type: field_type.clone(),
            custom_modifiers: Vec::new(),
        })
    }

    /// Create a field reference with custom modifiers on its type (e.g. `modreq(IsVolatile)`).
    #[must_use]
    pub fn with_modifiers(
        containing_type: Option<TypeRefRc>,
        name: Name,
        field_type: &TypeRefRc,
        custom_modifiers: Vec<CustomModifier>,
    ) -> FieldRefRc {
        Arc::new(FieldReference {
            containing_type,
            name,
            field_type: field_type.clone(),
            custom_modifiers,
        })
    }
}

impl NamedEntity for FieldReference {
    fn name(&self) -> Option<&Name> {
        Some(&self.name)
    }
}

/// A reference to a method.
#[derive(Debug, Clone)]
pub struct MethodReference {
    /// The type declaring the method, `None` if unresolved
    pub containing_type: Option<TypeRefRc>,
    /// Method name
    pub name: Name,
    /// Number of generic parameters the method declares
    pub generic_parameter_count: u16,
    /// The method's own generic parameters, as referenced from its signature
    pub generic_parameters: Vec<TypeRefRc>,
    /// Parameter and return types
    pub signature: MethodSignature,
}

impl MethodReference {
    /// Create a non-generic method reference.
    #[must_use]
    pub fn new(
        containing_type: Option<TypeRefRc>,
        name: Name,
        signature: MethodSignature,
    ) -> MethodRefRc {
        Arc::new(MethodReference {
            containing_type,
            name,
            generic_parameter_count: 0,
            generic_parameters: Vec::new(),
            signature,
        })
    }

    /// Create a generic method reference.
    ///
    /// One generic method parameter is created per entry of `parameter_names`, each pointing
    /// back at the new method, and handed to `build` to produce the signature. The
    /// [`CallingConvention::GENERIC`] flag is added to the signature.
    pub fn new_generic<F>(
        containing_type: Option<TypeRefRc>,
        name: Name,
        parameter_names: &[Name],
        build: F,
    ) -> MethodRefRc
    where
        F: FnOnce(&[TypeRefRc]) -> MethodSignature,
    {
        Arc::new_cyclic(|method| {
            let generic_parameters: Vec<TypeRefRc> = parameter_names
                .iter()
                .enumerate()
                .map(|(index, parameter_name)| {
                    TypeReference::generic_method_parameter(
                        method.clone(),
                        u16::try_from(index).unwrap_or(u16::MAX),
                        parameter_name.clone(),
                    )
                })
                .collect();

            let mut signature = build(&generic_parameters);
            signature.calling_convention |= CallingConvention::GENERIC;

            MethodReference {
                containing_type,
                name,
                generic_parameter_count: u16::try_from(generic_parameters.len())
                    .unwrap_or(u16::MAX),
                generic_parameters,
                signature,
            }
        })
    }

    /// `true` if the method declares generic parameters.
    #[must_use]
    pub fn is_generic(&self) -> bool {
        self.generic_parameter_count > 0
    }
}

impl NamedEntity for MethodReference {
    fn name(&self) -> Option<&Name> {
        Some(&self.name)
    }
}
