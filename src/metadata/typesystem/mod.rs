//! Closed model of type expressions, namespaces and member references.
//!
//! Type expressions are represented by the [`TypeReference`] enumeration, one variant per
//! structural shape. Because the set of shapes is closed, every consumer that needs a rule
//! per shape (key derivation in particular) is a single exhaustive `match` that the compiler
//! checks for completeness.
//!
//! # Identity vs. Equality
//!
//! Type references are shared through [`TypeRefRc`] handles. Two handles are *identical* if
//! they point at the same allocation ([`TypeReference::same_identity`]); they are
//! *structurally equal* if they derive the same interned key. The canonicalization cache
//! depends on the distinction: it only reuses an instance whose components are identical,
//! not merely equal.
//!
//! # Key Components
//!
//! - [`TypeReference`] - the type expression shapes
//! - [`NamespaceReference`] - namespace chains rooted in a unit
//! - [`FieldReference`], [`MethodReference`] - member references
//! - [`MethodSignature`], [`ParameterTypeInformation`], [`CustomModifier`] - signature parts
//! - [`InternKeyHash`] - order-sensitive hashing of descriptor content
//!
//! # Examples
//!
//! ```rust
//! use cilintern::metadata::{
//!     names::NameTable,
//!     typesystem::{NamespaceReference, TypeKind, TypeReference},
//! };
//!
//! let names = NameTable::new();
//! let root = NamespaceReference::unresolved_root();
//! let system = NamespaceReference::nested(&root, names.intern("System"));
//! let byte = TypeReference::namespace_type(&system, names.intern("Byte"), 0);
//!
//! let buffer = TypeReference::vector(&byte);
//! let cursor = TypeReference::pointer(&byte);
//!
//! assert_eq!(buffer.kind(), TypeKind::Vector);
//! assert_eq!(cursor.kind(), TypeKind::Pointer);
//! assert!(buffer.name().is_none());
//! assert_eq!(byte.name().map(|n| n.as_str()), Some("Byte"));
//! ```

mod base;
mod hash;
mod members;
mod namespace;

use std::sync::{Arc, Weak};

use strum::{Display, EnumCount};

pub use base::{
    CallingConvention, CustomModifier, GenericMethodParameterReference,
    GenericTypeInstanceReference, GenericTypeParameterReference, MatrixTypeReference,
    MethodSignature, ModifiedTypeReference, NamespaceTypeReference, NestedTypeReference,
    ParameterTypeInformation,
};
pub use hash::InternKeyHash;
pub use members::{FieldRefRc, FieldReference, MethodRefRc, MethodReference, NamedEntity};
pub use namespace::{NamespaceRc, NamespaceReference};

use crate::metadata::names::Name;

/// Shared handle to a [`TypeReference`]; identity is pointer identity
pub type TypeRefRc = Arc<TypeReference>;

/// The shape of a [`TypeReference`], without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount)]
pub enum TypeKind {
    /// Type named through its namespace
    Namespace,
    /// Type named through its enclosing type
    Nested,
    /// Single-dimension, zero-based array
    Vector,
    /// General array
    Matrix,
    /// Instantiated generic type
    GenericInstance,
    /// Unmanaged pointer
    Pointer,
    /// Managed pointer (`ref T`)
    ManagedPointer,
    /// Type parameter of a generic type
    GenericTypeParameter,
    /// Type parameter of a generic method
    GenericMethodParameter,
    /// Function pointer
    FunctionPointer,
    /// Type with custom modifiers
    Modified,
}

/// A type expression.
#[derive(Debug, Clone)]
pub enum TypeReference {
    /// `Namespace.Name`
    Namespace(NamespaceTypeReference),
    /// `Outer+Name`
    Nested(NestedTypeReference),
    /// `T[]`
    Vector(TypeRefRc),
    /// `T[,]`, `T[1..5]`
    Matrix(MatrixTypeReference),
    /// `G<A, B>`
    GenericInstance(GenericTypeInstanceReference),
    /// `T*`
    Pointer(TypeRefRc),
    /// `T&`
    ManagedPointer(TypeRefRc),
    /// `!n`
    GenericTypeParameter(GenericTypeParameterReference),
    /// `!!n`
    GenericMethodParameter(GenericMethodParameterReference),
    /// `method R *(P...)`
    FunctionPointer(MethodSignature),
    /// `T modreq(M) modopt(N)`
    Modified(ModifiedTypeReference),
}

impl TypeReference {
    /// A type in `namespace`.
    #[must_use]
    pub fn namespace_type(
        namespace: &NamespaceRc,
        name: Name,
        generic_parameter_count: u16,
    ) -> TypeRefRc {
        Arc::new(TypeReference::Namespace(NamespaceTypeReference {
            namespace: namespace.clone(),
            name,
            generic_parameter_count,
        }))
    }

    /// A type nested in `containing_type`.
    #[must_use]
    pub fn nested_type(
        containing_type: &TypeRefRc,
        name: Name,
        generic_parameter_count: u16,
    ) -> TypeRefRc {
        Arc::new(TypeReference::Nested(NestedTypeReference {
            containing_type: containing_type.clone(),
            name,
            generic_parameter_count,
        }))
    }

    /// A zero-based single-dimension array of `element_type`.
    #[must_use]
    pub fn vector(element_type: &TypeRefRc) -> TypeRefRc {
        Arc::new(TypeReference::Vector(element_type.clone()))
    }

    /// A general array of `element_type`.
    #[must_use]
    pub fn matrix(
        element_type: &TypeRefRc,
        rank: u32,
        sizes: Vec<u64>,
        lower_bounds: Vec<i32>,
    ) -> TypeRefRc {
        Arc::new(TypeReference::Matrix(MatrixTypeReference {
            element_type: element_type.clone(),
            rank,
            sizes,
            lower_bounds,
        }))
    }

    /// A new, uncached instance of `generic_type` with `generic_arguments`.
    ///
    /// Prefer [`get_or_make_generic_type_instance`] to share instances.
    ///
    /// [`get_or_make_generic_type_instance`]: crate::metadata::intern::CachingInternFactory::get_or_make_generic_type_instance
    #[must_use]
    pub fn generic_instance(
        generic_type: &TypeRefRc,
        generic_arguments: &[TypeRefRc],
    ) -> TypeRefRc {
        Arc::new(TypeReference::GenericInstance(GenericTypeInstanceReference {
            generic_type: generic_type.clone(),
            generic_arguments: generic_arguments.to_vec(),
        }))
    }

    /// An unmanaged pointer to `target`.
    #[must_use]
    pub fn pointer(target: &TypeRefRc) -> TypeRefRc {
        Arc::new(TypeReference::Pointer(target.clone()))
    }

    /// A managed pointer to `target`.
    #[must_use]
    pub fn managed_pointer(target: &TypeRefRc) -> TypeRefRc {
        Arc::new(TypeReference::ManagedPointer(target.clone()))
    }

    /// Type parameter `index` of `defining_type`.
    #[must_use]
    pub fn generic_type_parameter(defining_type: &TypeRefRc, index: u16, name: Name) -> TypeRefRc {
        Arc::new(TypeReference::GenericTypeParameter(
            GenericTypeParameterReference {
                defining_type: defining_type.clone(),
                index,
                name,
            },
        ))
    }

    /// Type parameter `index` of `defining_method`.
    #[must_use]
    pub fn generic_method_parameter(
        defining_method: Weak<MethodReference>,
        index: u16,
        name: Name,
    ) -> TypeRefRc {
        Arc::new(TypeReference::GenericMethodParameter(
            GenericMethodParameterReference {
                defining_method,
                index,
                name,
            },
        ))
    }

    /// A function pointer with `signature`.
    #[must_use]
    pub fn function_pointer(signature: MethodSignature) -> TypeRefRc {
        Arc::new(TypeReference::FunctionPointer(signature))
    }

    /// `unmodified_type` with `custom_modifiers` attached.
    #[must_use]
    pub fn modified(
        unmodified_type: &TypeRefRc,
        custom_modifiers: Vec<CustomModifier>,
    ) -> TypeRefRc {
        Arc::new(TypeReference::Modified(ModifiedTypeReference {
            unmodified_type: unmodified_type.clone(),
            custom_modifiers,
        }))
    }

    /// `true` if both handles point at the same object.
    #[must_use]
    pub fn same_identity(left: &TypeRefRc, right: &TypeRefRc) -> bool {
        Arc::ptr_eq(left, right)
    }

    /// The shape of this type expression.
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        match self {
            TypeReference::Namespace(_) => TypeKind::Namespace,
            TypeReference::Nested(_) => TypeKind::Nested,
            TypeReference::Vector(_) => TypeKind::Vector,
            TypeReference::Matrix(_) => TypeKind::Matrix,
            TypeReference::GenericInstance(_) => TypeKind::GenericInstance,
            TypeReference::Pointer(_) => TypeKind::Pointer,
            TypeReference::ManagedPointer(_) => TypeKind::ManagedPointer,
            TypeReference::GenericTypeParameter(_) => TypeKind::GenericTypeParameter,
            TypeReference::GenericMethodParameter(_) => TypeKind::GenericMethodParameter,
            TypeReference::FunctionPointer(_) => TypeKind::FunctionPointer,
            TypeReference::Modified(_) => TypeKind::Modified,
        }
    }

    /// The declared name of named types and generic parameters.
    #[must_use]
    pub fn name(&self) -> Option<&Name> {
        match self {
            TypeReference::Namespace(t) => Some(&t.name),
            TypeReference::Nested(t) => Some(&t.name),
            TypeReference::GenericTypeParameter(p) => Some(&p.name),
            TypeReference::GenericMethodParameter(p) => Some(&p.name),
            TypeReference::Vector(_)
            | TypeReference::Matrix(_)
            | TypeReference::GenericInstance(_)
            | TypeReference::Pointer(_)
            | TypeReference::ManagedPointer(_)
            | TypeReference::FunctionPointer(_)
            | TypeReference::Modified(_) => None,
        }
    }

    /// The instance payload, if this is a generic type instance.
    #[must_use]
    pub fn as_generic_instance(&self) -> Option<&GenericTypeInstanceReference> {
        match self {
            TypeReference::GenericInstance(instance) => Some(instance),
            _ => None,
        }
    }

    /// The direct component types, in a fixed order.
    ///
    /// Used to compare composite types component by component.
    #[must_use]
    pub fn components(&self) -> Vec<&TypeRefRc> {
        match self {
            TypeReference::Namespace(_) | TypeReference::GenericMethodParameter(_) => Vec::new(),
            TypeReference::Nested(t) => vec![&t.containing_type],
            TypeReference::Vector(element)
            | TypeReference::Pointer(element)
            | TypeReference::ManagedPointer(element) => vec![element],
            TypeReference::Matrix(m) => vec![&m.element_type],
            TypeReference::GenericInstance(i) => std::iter::once(&i.generic_type)
                .chain(i.generic_arguments.iter())
                .collect(),
            TypeReference::GenericTypeParameter(p) => vec![&p.defining_type],
            TypeReference::FunctionPointer(s) => s
                .parameters
                .iter()
                .chain(s.extra_argument_types.iter())
                .map(|p| &p.param_type)
                .chain(std::iter::once(&s.return_type))
                .collect(),
            TypeReference::Modified(m) => std::iter::once(&m.unmodified_type)
                .chain(m.custom_modifiers.iter().map(|c| &c.modifier))
                .collect(),
        }
    }
}

impl NamedEntity for TypeReference {
    fn name(&self) -> Option<&Name> {
        TypeReference::name(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::Fixture;

    #[test]
    fn test_kinds_and_names() {
        let fx = Fixture::new();
        let nested = TypeReference::nested_type(&fx.object, fx.name("Inner"), 0);
        let matrix = TypeReference::matrix(&fx.int32, 2, vec![], vec![]);
        let modified =
            TypeReference::modified(&fx.int32, vec![CustomModifier::required(&fx.object)]);

        assert_eq!(nested.kind(), TypeKind::Nested);
        assert_eq!(nested.name().map(Name::as_str), Some("Inner"));
        assert_eq!(matrix.kind(), TypeKind::Matrix);
        assert!(matrix.name().is_none());
        assert_eq!(modified.kind().to_string(), "Modified");
        assert_eq!(TypeKind::COUNT, 11);
    }

    #[test]
    fn test_identity_is_pointer_identity() {
        let fx = Fixture::new();
        let first = TypeReference::vector(&fx.int32);
        let second = TypeReference::vector(&fx.int32);

        assert!(!TypeReference::same_identity(&first, &second));
        assert!(TypeReference::same_identity(&first, &first.clone()));
    }

    #[test]
    fn test_components() {
        let fx = Fixture::new();
        let instance =
            TypeReference::generic_instance(&fx.dictionary, &[fx.int32.clone(), fx.string.clone()]);
        let components = instance.components();

        assert_eq!(components.len(), 3);
        assert!(TypeReference::same_identity(components[0], &fx.dictionary));
        assert!(TypeReference::same_identity(components[2], &fx.string));

        let args = instance.as_generic_instance().unwrap();
        assert_eq!(args.arguments_identical_to(&[fx.int32.clone(), fx.string.clone()]), Some(true));
        assert_eq!(args.arguments_identical_to(&[fx.int32.clone()]), None);
        assert_eq!(
            args.arguments_identical_to(&[fx.int32.clone(), TypeReference::vector(&fx.string)]),
            Some(false)
        );
    }
}
