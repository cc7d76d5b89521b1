//! Payload structures of the [`TypeReference`](super::TypeReference) variants.
//!
//! Every structure here is immutable once built and refers to its components through
//! shared handles ([`TypeRefRc`], [`NamespaceRc`]), so composite types share their
//! sub-expressions instead of copying them.

use std::sync::Weak;

use bitflags::bitflags;

use crate::metadata::{
    names::Name,
    typesystem::{MethodReference, NamespaceRc, TypeRefRc},
};

bitflags! {
    /// Calling convention of a method or function pointer signature.
    ///
    /// The low nibble holds the convention kind (`DEFAULT`, `C`, `STANDARD`, `THIS_CALL`,
    /// `FAST_CALL`, `EXTRA_ARGUMENTS`); the high bits are modifiers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CallingConvention: u8 {
        /// Managed default convention
        const DEFAULT = 0x00;
        /// C / cdecl
        const C = 0x01;
        /// stdcall
        const STANDARD = 0x02;
        /// thiscall
        const THIS_CALL = 0x03;
        /// fastcall
        const FAST_CALL = 0x04;
        /// Managed varargs, extra arguments follow the sentinel
        const EXTRA_ARGUMENTS = 0x05;
        /// The method has generic parameters
        const GENERIC = 0x10;
        /// Instance method, `this` is implicit
        const HAS_THIS = 0x20;
        /// `this` is passed explicitly as first parameter
        const EXPLICIT_THIS = 0x40;
    }
}

impl CallingConvention {
    /// The convention kind without the modifier bits.
    #[must_use]
    pub fn kind(self) -> u8 {
        self.bits() & 0x0F
    }
}

/// A custom modifier (`modreq` / `modopt`) attached to a type or parameter.
#[derive(Debug, Clone)]
pub struct CustomModifier {
    /// `true` for `modopt`, `false` for `modreq`
    pub is_optional: bool,
    /// The modifier type
    pub modifier: TypeRefRc,
}

impl CustomModifier {
    /// A required modifier (`modreq`).
    #[must_use]
    pub fn required(modifier: &TypeRefRc) -> Self {
        Self {
            is_optional: false,
            modifier: modifier.clone(),
        }
    }

    /// An optional modifier (`modopt`).
    #[must_use]
    pub fn optional(modifier: &TypeRefRc) -> Self {
        Self {
            is_optional: true,
            modifier: modifier.clone(),
        }
    }
}

/// Type information of one parameter of a method or function pointer signature.
#[derive(Debug, Clone)]
pub struct ParameterTypeInformation {
    /// Zero based position of the parameter
    pub index: u16,
    /// The declared parameter type
    pub param_type: TypeRefRc,
    /// The parameter is passed by reference
    pub is_by_reference: bool,
    /// Custom modifiers of the parameter
    pub custom_modifiers: Vec<CustomModifier>,
}

impl ParameterTypeInformation {
    /// A by-value parameter without modifiers.
    #[must_use]
    pub fn new(index: u16, param_type: &TypeRefRc) -> Self {
        Self {
            index,
            param_type: param_type.clone(),
            is_by_reference: false,
            custom_modifiers: Vec::new(),
        }
    }

    /// Mark the parameter as passed by reference.
    #[must_use]
    pub fn by_reference(mut self) -> Self {
        self.is_by_reference = true;
        self
    }

    /// Attach a custom modifier.
    #[must_use]
    pub fn with_modifier(mut self, modifier: CustomModifier) -> Self {
        self.custom_modifiers.push(modifier);
        self
    }
}

/// The shape shared by method signatures and function pointer types.
#[derive(Debug, Clone)]
pub struct MethodSignature {
    /// Calling convention
    pub calling_convention: CallingConvention,
    /// Fixed parameters
    pub parameters: Vec<ParameterTypeInformation>,
    /// Parameters after the varargs sentinel
    pub extra_argument_types: Vec<ParameterTypeInformation>,
    /// Custom modifiers on the return value
    pub return_value_custom_modifiers: Vec<CustomModifier>,
    /// The return value is returned by reference
    pub return_value_is_by_ref: bool,
    /// The return type
    pub return_type: TypeRefRc,
}

impl MethodSignature {
    /// A default-convention signature without parameters.
    #[must_use]
    pub fn new(return_type: &TypeRefRc) -> Self {
        Self {
            calling_convention: CallingConvention::DEFAULT,
            parameters: Vec::new(),
            extra_argument_types: Vec::new(),
            return_value_custom_modifiers: Vec::new(),
            return_value_is_by_ref: false,
            return_type: return_type.clone(),
        }
    }

    /// Set the calling convention.
    #[must_use]
    pub fn with_calling_convention(mut self, calling_convention: CallingConvention) -> Self {
        self.calling_convention = calling_convention;
        self
    }

    /// Append a by-value parameter of the given type.
    #[must_use]
    pub fn with_parameter(mut self, param_type: &TypeRefRc) -> Self {
        let index = self.next_index();
        self.parameters
            .push(ParameterTypeInformation::new(index, param_type));
        self
    }

    /// Append a fully described parameter.
    #[must_use]
    pub fn with_parameter_info(mut self, parameter: ParameterTypeInformation) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Append a varargs parameter.
    #[must_use]
    pub fn with_extra_argument(mut self, param_type: &TypeRefRc) -> Self {
        let index = self.next_index();
        self.extra_argument_types
            .push(ParameterTypeInformation::new(index, param_type));
        self
    }

    /// Attach a custom modifier to the return value.
    #[must_use]
    pub fn with_return_modifier(mut self, modifier: CustomModifier) -> Self {
        self.return_value_custom_modifiers.push(modifier);
        self
    }

    /// Return the value by reference.
    #[must_use]
    pub fn returning_by_ref(mut self) -> Self {
        self.return_value_is_by_ref = true;
        self
    }

    fn next_index(&self) -> u16 {
        u16::try_from(self.parameters.len() + self.extra_argument_types.len()).unwrap_or(u16::MAX)
    }
}

/// A type referenced through its containing namespace.
#[derive(Debug, Clone)]
pub struct NamespaceTypeReference {
    /// The containing namespace
    pub namespace: NamespaceRc,
    /// Simple type name, including any arity suffix (e.g. "List`1")
    pub name: Name,
    /// Number of generic parameters the type declares
    pub generic_parameter_count: u16,
}

/// A type referenced through its containing type.
#[derive(Debug, Clone)]
pub struct NestedTypeReference {
    /// The enclosing type
    pub containing_type: TypeRefRc,
    /// Simple type name
    pub name: Name,
    /// Number of generic parameters the nested type adds
    pub generic_parameter_count: u16,
}

/// A general (possibly multi-dimensional, possibly non-zero based) array.
#[derive(Debug, Clone)]
pub struct MatrixTypeReference {
    /// Element type
    pub element_type: TypeRefRc,
    /// Number of dimensions
    pub rank: u32,
    /// Sizes of the leading dimensions that have one
    pub sizes: Vec<u64>,
    /// Lower bounds of the leading dimensions that have one
    pub lower_bounds: Vec<i32>,
}

/// A generic type definition with concrete type arguments substituted.
#[derive(Debug, Clone)]
pub struct GenericTypeInstanceReference {
    /// The generic type definition being instantiated
    pub generic_type: TypeRefRc,
    /// Type arguments, in parameter order
    pub generic_arguments: Vec<TypeRefRc>,
}

impl GenericTypeInstanceReference {
    /// `true` if `arguments` are the very same objects, in order, as this instance's
    /// arguments.
    ///
    /// Returns `None` if the lengths differ.
    #[must_use]
    pub fn arguments_identical_to(&self, arguments: &[TypeRefRc]) -> Option<bool> {
        if self.generic_arguments.len() != arguments.len() {
            return None;
        }

        Some(
            self.generic_arguments
                .iter()
                .zip(arguments)
                .all(|(cached, requested)| TypeRefRc::ptr_eq(cached, requested)),
        )
    }
}

/// A type parameter of a generic type.
#[derive(Debug, Clone)]
pub struct GenericTypeParameterReference {
    /// The generic type declaring the parameter
    pub defining_type: TypeRefRc,
    /// Ordinal of the parameter
    pub index: u16,
    /// Declared name (not part of the key)
    pub name: Name,
}

/// A type parameter of a generic method.
///
/// The defining method usually mentions its own parameters in its signature, so the link
/// back to it is weak; the method is built with [`MethodReference::new_generic`].
#[derive(Debug, Clone)]
pub struct GenericMethodParameterReference {
    /// The generic method declaring the parameter
    pub defining_method: Weak<MethodReference>,
    /// Ordinal of the parameter
    pub index: u16,
    /// Declared name (not part of the key)
    pub name: Name,
}

/// A type with custom modifiers attached.
#[derive(Debug, Clone)]
pub struct ModifiedTypeReference {
    /// The type being modified
    pub unmodified_type: TypeRefRc,
    /// Modifiers, in signature order
    pub custom_modifiers: Vec<CustomModifier>,
}
