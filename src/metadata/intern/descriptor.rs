//! Flat descriptors that interned keys are derived from.
//!
//! A descriptor captures the structural content of one entity with every sub-component
//! already replaced by its own key. Descriptors hold integers and copied identity strings
//! only, so a key table full of them keeps no metadata entity alive.

use crate::metadata::typesystem::InternKeyHash;

/// A custom modifier reduced to its optional flag and modifier key.
pub(crate) type ModifierDescriptor = (bool, u32);

/// One parameter of a signature; the position in the list is its index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ParameterDescriptor {
    pub param_type: u32,
    pub is_by_reference: bool,
    pub custom_modifiers: Vec<ModifierDescriptor>,
}

/// A method or function pointer signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SignatureDescriptor {
    pub calling_convention: u8,
    pub parameters: Vec<ParameterDescriptor>,
    pub extra_argument_types: Vec<ParameterDescriptor>,
    pub return_value_custom_modifiers: Vec<ModifierDescriptor>,
    pub return_value_is_by_ref: bool,
    pub return_type: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Descriptor {
    Assembly {
        name: u32,
        culture: String,
        version: [u16; 4],
        public_key_token: Vec<u8>,
        location: String,
    },
    Module {
        name: u32,
        location: String,
        assembly: Option<u32>,
    },
    RootNamespace {
        unit: u32,
    },
    NestedNamespace {
        containing: u32,
        name: u32,
    },
    NamespaceType {
        namespace: u32,
        name: u32,
        generic_parameter_count: u16,
    },
    NestedType {
        containing_type: u32,
        name: u32,
        generic_parameter_count: u16,
    },
    Vector {
        element_type: u32,
    },
    Matrix {
        element_type: u32,
        rank: u32,
        sizes: Vec<u64>,
        lower_bounds: Vec<i32>,
    },
    GenericInstance {
        generic_type: u32,
        generic_arguments: Vec<u32>,
    },
    Pointer {
        target: u32,
    },
    ManagedPointer {
        target: u32,
    },
    GenericTypeParameter {
        defining_type: u32,
        index: u16,
    },
    GenericMethodParameter {
        defining_method: u32,
        index: u16,
    },
    /// A generic method parameter seen from inside the signature of its own method
    MethodParameterOrdinal {
        index: u16,
    },
    FunctionPointer(SignatureDescriptor),
    Modified {
        unmodified_type: u32,
        custom_modifiers: Vec<ModifierDescriptor>,
    },
    Field {
        containing_type: u32,
        name: u32,
        field_type: u32,
        custom_modifiers: Vec<ModifierDescriptor>,
    },
    Method {
        containing_type: u32,
        name: u32,
        generic_parameter_count: u16,
        signature: SignatureDescriptor,
    },
}

impl Descriptor {
    fn tag(&self) -> u8 {
        match self {
            Descriptor::Assembly { .. } => 1,
            Descriptor::Module { .. } => 2,
            Descriptor::RootNamespace { .. } => 3,
            Descriptor::NestedNamespace { .. } => 4,
            Descriptor::NamespaceType { .. } => 5,
            Descriptor::NestedType { .. } => 6,
            Descriptor::Vector { .. } => 7,
            Descriptor::Matrix { .. } => 8,
            Descriptor::GenericInstance { .. } => 9,
            Descriptor::Pointer { .. } => 10,
            Descriptor::ManagedPointer { .. } => 11,
            Descriptor::GenericTypeParameter { .. } => 12,
            Descriptor::GenericMethodParameter { .. } => 13,
            Descriptor::MethodParameterOrdinal { .. } => 14,
            Descriptor::FunctionPointer(_) => 15,
            Descriptor::Modified { .. } => 16,
            Descriptor::Field { .. } => 17,
            Descriptor::Method { .. } => 18,
        }
    }

    /// Content hash of the descriptor, folded to a 32-bit key.
    pub(crate) fn hashed_key(&self) -> u32 {
        let hash = InternKeyHash::new().add_component(&self.tag());

        let hash = match self {
            Descriptor::Assembly {
                name,
                culture,
                version,
                public_key_token,
                location,
            } => hash
                .add_key(*name)
                .add_component(culture.as_str())
                .add_component(version)
                .add_component(public_key_token.as_slice())
                .add_component(location.as_str()),
            Descriptor::Module {
                name,
                location,
                assembly,
            } => hash
                .add_key(*name)
                .add_component(location.as_str())
                .add_component(assembly),
            Descriptor::RootNamespace { unit } => hash.add_key(*unit),
            Descriptor::NestedNamespace { containing, name } => {
                hash.add_key(*containing).add_key(*name)
            }
            Descriptor::NamespaceType {
                namespace: parent,
                name,
                generic_parameter_count,
            }
            | Descriptor::NestedType {
                containing_type: parent,
                name,
                generic_parameter_count,
            } => hash
                .add_key(*parent)
                .add_key(*name)
                .add_component(generic_parameter_count),
            Descriptor::Vector { element_type: inner }
            | Descriptor::Pointer { target: inner }
            | Descriptor::ManagedPointer { target: inner } => hash.add_key(*inner),
            Descriptor::Matrix {
                element_type,
                rank,
                sizes,
                lower_bounds,
            } => hash
                .add_key(*element_type)
                .add_key(*rank)
                .add_component(sizes.as_slice())
                .add_component(lower_bounds.as_slice()),
            Descriptor::GenericInstance {
                generic_type,
                generic_arguments,
            } => generic_arguments
                .iter()
                .fold(hash.add_key(*generic_type), |h, arg| h.add_key(*arg))
                .add_component(&generic_arguments.len()),
            Descriptor::GenericTypeParameter {
                defining_type: owner,
                index,
            }
            | Descriptor::GenericMethodParameter {
                defining_method: owner,
                index,
            } => hash.add_key(*owner).add_component(index),
            Descriptor::MethodParameterOrdinal { index } => hash.add_component(index),
            Descriptor::FunctionPointer(signature) => add_signature(hash, signature),
            Descriptor::Modified {
                unmodified_type,
                custom_modifiers,
            } => hash
                .add_key(*unmodified_type)
                .add_component(custom_modifiers.as_slice()),
            Descriptor::Field {
                containing_type,
                name,
                field_type,
                custom_modifiers,
            } => hash
                .add_key(*containing_type)
                .add_key(*name)
                .add_key(*field_type)
                .add_component(custom_modifiers.as_slice()),
            Descriptor::Method {
                containing_type,
                name,
                generic_parameter_count,
                signature,
            } => add_signature(
                hash.add_key(*containing_type)
                    .add_key(*name)
                    .add_component(generic_parameter_count),
                signature,
            ),
        };

        hash.finalize_u32()
    }
}

fn add_signature(hash: InternKeyHash, signature: &SignatureDescriptor) -> InternKeyHash {
    let hash = hash.add_component(&signature.calling_convention);
    let hash = add_parameters(hash, &signature.parameters);
    let hash = add_parameters(hash, &signature.extra_argument_types);

    hash.add_component(signature.return_value_custom_modifiers.as_slice())
        .add_component(&signature.return_value_is_by_ref)
        .add_key(signature.return_type)
}

fn add_parameters(hash: InternKeyHash, parameters: &[ParameterDescriptor]) -> InternKeyHash {
    parameters
        .iter()
        .fold(hash.add_component(&parameters.len()), |h, p| {
            h.add_key(p.param_type)
                .add_component(&p.is_by_reference)
                .add_component(p.custom_modifiers.as_slice())
        })
}
