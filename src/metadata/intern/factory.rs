//! The key derivation engine.

use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::{mapref::entry::Entry, DashMap};

use crate::{
    metadata::{
        identity::{AssemblyIdentity, ModuleIdentity},
        intern::{
            config::{InternConfig, KeyScheme},
            descriptor::{
                Descriptor, ModifierDescriptor, ParameterDescriptor, SignatureDescriptor,
            },
            InternFactory,
        },
        names::Name,
        typesystem::{
            CustomModifier, FieldReference, MethodReference, MethodSignature,
            NamespaceReference, ParameterTypeInformation, TypeRefRc, TypeReference,
        },
        EntityKind,
    },
    Error, Result,
};

/// Derives interned keys from structural content.
///
/// The sequential scheme remembers every descriptor it has keyed in a table of
/// integers and copied identity strings, and assigns the next free key to new ones.
/// The hashed scheme keeps no state at all.
///
/// # Thread Safety
///
/// All operations take `&self` and may be called concurrently. Under the sequential scheme
/// two threads racing on the same new descriptor both observe the key of whichever
/// insert wins.
///
/// # Examples
///
/// ```rust
/// use cilintern::metadata::{
///     identity::{AssemblyIdentity, AssemblyVersion},
///     intern::{InternFactory, KeyFactory},
///     names::NameTable,
/// };
///
/// let names = NameTable::new();
/// let factory = KeyFactory::sequential();
///
/// let lower = AssemblyIdentity::new(names.intern("widgets"), AssemblyVersion::new(1, 0, 0, 0));
/// let upper = AssemblyIdentity::new(names.intern("Widgets"), AssemblyVersion::new(1, 0, 0, 0));
///
/// // Assembly names bind case-insensitively.
/// assert_eq!(factory.assembly_key(&lower)?, factory.assembly_key(&upper)?);
/// # Ok::<(), cilintern::Error>(())
/// ```
pub struct KeyFactory {
    config: InternConfig,
    table: DashMap<Descriptor, u32>,
    next_key: AtomicU32,
}

impl KeyFactory {
    /// Create an engine with the given configuration.
    #[must_use]
    pub fn new(config: InternConfig) -> Self {
        KeyFactory {
            config,
            table: DashMap::with_capacity(match config.scheme {
                KeyScheme::Sequential => config.cache_capacity,
                KeyScheme::Hashed => 0,
            }),
            next_key: AtomicU32::new(1),
        }
    }

    /// Engine with reliable, factory-local keys.
    #[must_use]
    pub fn sequential() -> Self {
        Self::new(InternConfig::sequential())
    }

    /// Engine with content-hashed keys.
    #[must_use]
    pub fn hashed() -> Self {
        Self::new(InternConfig::hashed())
    }

    /// The configured key scheme.
    #[must_use]
    pub fn scheme(&self) -> KeyScheme {
        self.config.scheme
    }

    /// Number of distinct descriptors keyed so far; always 0 for the hashed scheme.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// `true` if no descriptor has been keyed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn intern(&self, descriptor: Descriptor) -> Result<u32> {
        match self.config.scheme {
            KeyScheme::Hashed => Ok(descriptor.hashed_key()),
            KeyScheme::Sequential => match self.table.entry(descriptor) {
                Entry::Occupied(entry) => Ok(*entry.get()),
                Entry::Vacant(entry) => {
                    let key = self.allocate_key()?;
                    entry.insert(key);
                    Ok(key)
                }
            },
        }
    }

    fn allocate_key(&self) -> Result<u32> {
        self.next_key
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |key| {
                key.checked_add(1)
            })
            .map_err(|_| Error::KeySpaceExhausted)
    }

    fn type_key(&self, type_ref: &TypeReference, cx: Option<&MethodReference>) -> Result<u32> {
        let descriptor = match type_ref {
            TypeReference::Namespace(t) => Descriptor::NamespaceType {
                namespace: self.namespace_key(&t.namespace)?,
                name: t.name.unique_key(),
                generic_parameter_count: t.generic_parameter_count,
            },
            TypeReference::Nested(t) => Descriptor::NestedType {
                containing_type: self.type_key(&t.containing_type, cx)?,
                name: t.name.unique_key(),
                generic_parameter_count: t.generic_parameter_count,
            },
            TypeReference::Vector(element) => Descriptor::Vector {
                element_type: self.type_key(element, cx)?,
            },
            TypeReference::Matrix(m) => {
                self.matrix_descriptor(&m.element_type, m.rank, &m.sizes, &m.lower_bounds, cx)?
            }
            TypeReference::GenericInstance(i) => Descriptor::GenericInstance {
                generic_type: self.type_key(&i.generic_type, cx)?,
                generic_arguments: self.type_keys(&i.generic_arguments, cx)?,
            },
            TypeReference::Pointer(target) => Descriptor::Pointer {
                target: self.type_key(target, cx)?,
            },
            TypeReference::ManagedPointer(target) => Descriptor::ManagedPointer {
                target: self.type_key(target, cx)?,
            },
            TypeReference::GenericTypeParameter(p) => Descriptor::GenericTypeParameter {
                defining_type: self.type_key(&p.defining_type, cx)?,
                index: p.index,
            },
            TypeReference::GenericMethodParameter(p) => match cx {
                // Inside a method signature a method parameter is positional, otherwise the
                // method key would depend on itself.
                Some(method) if p.index < method.generic_parameter_count => {
                    Descriptor::MethodParameterOrdinal { index: p.index }
                }
                Some(method) => {
                    return Err(malformed_error!(
                        "Method parameter !!{} out of range for {} generic parameters",
                        p.index,
                        method.generic_parameter_count
                    ));
                }
                None => {
                    let method = p
                        .defining_method
                        .upgrade()
                        .ok_or(Error::AbsentReference(EntityKind::Method))?;
                    Descriptor::GenericMethodParameter {
                        defining_method: self.method_key(&method)?,
                        index: p.index,
                    }
                }
            },
            TypeReference::FunctionPointer(signature) => {
                Descriptor::FunctionPointer(self.signature_descriptor(signature, cx)?)
            }
            TypeReference::Modified(m) => Descriptor::Modified {
                unmodified_type: self.type_key(&m.unmodified_type, cx)?,
                custom_modifiers: self.modifiers(&m.custom_modifiers, cx)?,
            },
        };

        self.intern(descriptor)
    }

    fn type_keys(&self, types: &[TypeRefRc], cx: Option<&MethodReference>) -> Result<Vec<u32>> {
        types.iter().map(|t| self.type_key(t, cx)).collect()
    }

    fn modifiers(
        &self,
        modifiers: &[CustomModifier],
        cx: Option<&MethodReference>,
    ) -> Result<Vec<ModifierDescriptor>> {
        modifiers
            .iter()
            .map(|m| Ok((m.is_optional, self.type_key(&m.modifier, cx)?)))
            .collect()
    }

    fn parameters(
        &self,
        parameters: &[ParameterTypeInformation],
        cx: Option<&MethodReference>,
    ) -> Result<Vec<ParameterDescriptor>> {
        parameters
            .iter()
            .map(|p| {
                Ok(ParameterDescriptor {
                    param_type: self.type_key(&p.param_type, cx)?,
                    is_by_reference: p.is_by_reference,
                    custom_modifiers: self.modifiers(&p.custom_modifiers, cx)?,
                })
            })
            .collect()
    }

    fn signature_descriptor(
        &self,
        signature: &MethodSignature,
        cx: Option<&MethodReference>,
    ) -> Result<SignatureDescriptor> {
        Ok(SignatureDescriptor {
            calling_convention: signature.calling_convention.bits(),
            parameters: self.parameters(&signature.parameters, cx)?,
            extra_argument_types: self.parameters(&signature.extra_argument_types, cx)?,
            return_value_custom_modifiers: self
                .modifiers(&signature.return_value_custom_modifiers, cx)?,
            return_value_is_by_ref: signature.return_value_is_by_ref,
            return_type: self.type_key(&signature.return_type, cx)?,
        })
    }

    fn matrix_descriptor(
        &self,
        element_type: &TypeReference,
        rank: u32,
        sizes: &[u64],
        lower_bounds: &[i32],
        cx: Option<&MethodReference>,
    ) -> Result<Descriptor> {
        if rank == 0 {
            return Err(malformed_error!("Matrix type must have a rank of at least 1"));
        }

        let rank_len = usize::try_from(rank).unwrap_or(usize::MAX);
        if sizes.len() > rank_len || lower_bounds.len() > rank_len {
            return Err(malformed_error!(
                "Matrix of rank {} has {} sizes and {} lower bounds",
                rank,
                sizes.len(),
                lower_bounds.len()
            ));
        }

        Ok(Descriptor::Matrix {
            element_type: self.type_key(element_type, cx)?,
            rank,
            sizes: sizes.to_vec(),
            lower_bounds: lower_bounds.to_vec(),
        })
    }

    fn containing_type_key(&self, containing_type: Option<&TypeRefRc>) -> Result<u32> {
        match containing_type {
            Some(t) => self.type_key(t, None),
            None => Err(Error::AbsentReference(EntityKind::Type)),
        }
    }
}

impl Default for KeyFactory {
    fn default() -> Self {
        Self::new(InternConfig::default())
    }
}

impl InternFactory for KeyFactory {
    fn intern_keys_are_reliably_unique(&self) -> bool {
        self.config.keys_are_reliably_unique()
    }

    fn assembly_key(&self, assembly: &AssemblyIdentity) -> Result<u32> {
        let v = &assembly.version;
        self.intern(Descriptor::Assembly {
            name: assembly.name.unique_key_ignoring_case(),
            culture: assembly.culture.to_lowercase(),
            version: [v.major, v.minor, v.build, v.revision],
            public_key_token: assembly.public_key_token.clone(),
            location: assembly.location.clone(),
        })
    }

    fn module_key(&self, module: &ModuleIdentity) -> Result<u32> {
        let assembly = match &module.containing_assembly {
            Some(assembly) => Some(self.assembly_key(assembly)?),
            None => None,
        };

        self.intern(Descriptor::Module {
            name: module.name.unique_key_ignoring_case(),
            location: module.location.clone(),
            assembly,
        })
    }

    fn namespace_key(&self, namespace: &NamespaceReference) -> Result<u32> {
        let descriptor = match namespace {
            NamespaceReference::Root { unit: Some(unit) } => Descriptor::RootNamespace {
                unit: self.unit_key(unit)?,
            },
            NamespaceReference::Root { unit: None } => {
                return Err(Error::AbsentReference(EntityKind::Unit))
            }
            NamespaceReference::Nested { containing, name } => Descriptor::NestedNamespace {
                containing: self.namespace_key(containing)?,
                name: name.unique_key(),
            },
        };

        self.intern(descriptor)
    }

    fn namespace_type_key(
        &self,
        namespace: &NamespaceReference,
        name: &Name,
        generic_parameter_count: u16,
    ) -> Result<u32> {
        self.intern(Descriptor::NamespaceType {
            namespace: self.namespace_key(namespace)?,
            name: name.unique_key(),
            generic_parameter_count,
        })
    }

    fn nested_type_key(
        &self,
        containing_type: &TypeReference,
        name: &Name,
        generic_parameter_count: u16,
    ) -> Result<u32> {
        self.intern(Descriptor::NestedType {
            containing_type: self.type_key(containing_type, None)?,
            name: name.unique_key(),
            generic_parameter_count,
        })
    }

    fn vector_type_key(&self, element_type: &TypeReference) -> Result<u32> {
        self.intern(Descriptor::Vector {
            element_type: self.type_key(element_type, None)?,
        })
    }

    fn matrix_type_key(
        &self,
        element_type: &TypeReference,
        rank: u32,
        sizes: &[u64],
        lower_bounds: &[i32],
    ) -> Result<u32> {
        let descriptor = self.matrix_descriptor(element_type, rank, sizes, lower_bounds, None)?;
        self.intern(descriptor)
    }

    fn generic_type_instance_key(
        &self,
        generic_type: &TypeReference,
        generic_arguments: &[TypeRefRc],
    ) -> Result<u32> {
        self.intern(Descriptor::GenericInstance {
            generic_type: self.type_key(generic_type, None)?,
            generic_arguments: self.type_keys(generic_arguments, None)?,
        })
    }

    fn pointer_type_key(&self, target_type: &TypeReference) -> Result<u32> {
        self.intern(Descriptor::Pointer {
            target: self.type_key(target_type, None)?,
        })
    }

    fn managed_pointer_type_key(&self, target_type: &TypeReference) -> Result<u32> {
        self.intern(Descriptor::ManagedPointer {
            target: self.type_key(target_type, None)?,
        })
    }

    fn generic_type_parameter_key(&self, defining_type: &TypeReference, index: u16) -> Result<u32> {
        self.intern(Descriptor::GenericTypeParameter {
            defining_type: self.type_key(defining_type, None)?,
            index,
        })
    }

    fn generic_method_parameter_key(
        &self,
        defining_method: &MethodReference,
        index: u16,
    ) -> Result<u32> {
        self.intern(Descriptor::GenericMethodParameter {
            defining_method: self.method_key(defining_method)?,
            index,
        })
    }

    fn function_pointer_type_key(&self, signature: &MethodSignature) -> Result<u32> {
        let descriptor = self.signature_descriptor(signature, None)?;
        self.intern(Descriptor::FunctionPointer(descriptor))
    }

    fn modified_type_key(
        &self,
        unmodified_type: &TypeReference,
        custom_modifiers: &[CustomModifier],
    ) -> Result<u32> {
        self.intern(Descriptor::Modified {
            unmodified_type: self.type_key(unmodified_type, None)?,
            custom_modifiers: self.modifiers(custom_modifiers, None)?,
        })
    }

    fn field_key(&self, field: &FieldReference) -> Result<u32> {
        self.intern(Descriptor::Field {
            containing_type: self.containing_type_key(field.containing_type.as_ref())?,
            name: field.name.unique_key(),
            field_type: self.type_key(&field.field_type, None)?,
            custom_modifiers: self.modifiers(&field.custom_modifiers, None)?,
        })
    }

    fn method_key(&self, method: &MethodReference) -> Result<u32> {
        self.intern(Descriptor::Method {
            containing_type: self.containing_type_key(method.containing_type.as_ref())?,
            name: method.name.unique_key(),
            generic_parameter_count: method.generic_parameter_count,
            signature: self.signature_descriptor(&method.signature, Some(method))?,
        })
    }

    fn type_reference_key(&self, type_ref: &TypeReference) -> Result<u32> {
        self.type_key(type_ref, None)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        metadata::{
            identity::{AssemblyVersion, UnitIdentity},
            typesystem::CallingConvention,
        },
        test::Fixture,
    };

    #[test]
    fn test_structurally_equal_types_share_key() -> Result<()> {
        let fx = Fixture::new();
        let factory = KeyFactory::default();

        let first = TypeReference::vector(&fx.int32);
        let second = TypeReference::vector(&fx.rebuilt_int32());

        assert!(!TypeReference::same_identity(&first, &second));
        assert_eq!(factory.type_reference_key(&first)?, factory.type_reference_key(&second)?);
        assert_eq!(
            factory.type_reference_key(&first)?,
            factory.vector_type_key(&fx.int32)?
        );
        Ok(())
    }

    #[test]
    fn test_shapes_are_distinguished() -> Result<()> {
        let fx = Fixture::new();
        let factory = KeyFactory::default();

        let vector = factory.vector_type_key(&fx.int32)?;
        let pointer = factory.pointer_type_key(&fx.int32)?;
        let managed = factory.managed_pointer_type_key(&fx.int32)?;
        let matrix = factory.matrix_type_key(&fx.int32, 1, &[], &[])?;

        assert_ne!(vector, pointer);
        assert_ne!(pointer, managed);
        assert_ne!(vector, matrix);
        assert_ne!(factory.type_reference_key(&fx.int32)?, vector);
        Ok(())
    }

    #[test]
    fn test_generic_argument_order_matters() -> Result<()> {
        let fx = Fixture::new();
        let factory = KeyFactory::default();

        let int_string = factory
            .generic_type_instance_key(&fx.dictionary, &[fx.int32.clone(), fx.string.clone()])?;
        let string_int = factory
            .generic_type_instance_key(&fx.dictionary, &[fx.string.clone(), fx.int32.clone()])?;
        assert_ne!(int_string, string_int);
        Ok(())
    }

    #[test]
    fn test_type_name_is_case_sensitive() -> Result<()> {
        let fx = Fixture::new();
        let factory = KeyFactory::default();

        let upper = TypeReference::namespace_type(&fx.system, fx.name("Widget"), 0);
        let lower = TypeReference::namespace_type(&fx.system, fx.name("widget"), 0);
        assert_ne!(factory.type_reference_key(&upper)?, factory.type_reference_key(&lower)?);

        let arity = TypeReference::namespace_type(&fx.system, fx.name("Widget"), 1);
        assert_ne!(factory.type_reference_key(&upper)?, factory.type_reference_key(&arity)?);
        Ok(())
    }

    #[test]
    fn test_assembly_key_components() -> Result<()> {
        let fx = Fixture::new();
        let factory = KeyFactory::default();

        let base = AssemblyIdentity::new(fx.name("Widgets"), AssemblyVersion::new(1, 0, 0, 0));
        let base_key = factory.assembly_key(&base)?;

        let other_version =
            AssemblyIdentity::new(fx.name("Widgets"), AssemblyVersion::new(2, 0, 0, 0));
        let other_culture = base.clone().with_culture("de-DE");
        let same_culture = base.clone().with_culture("DE-de");
        let signed = base.clone().with_public_key_token(vec![1, 2, 3, 4, 5, 6, 7, 8]);
        let elsewhere = base.clone().with_location("/opt/widgets.dll");

        assert_ne!(base_key, factory.assembly_key(&other_version)?);
        assert_ne!(base_key, factory.assembly_key(&other_culture)?);
        assert_eq!(factory.assembly_key(&other_culture)?, factory.assembly_key(&same_culture)?);
        assert_ne!(base_key, factory.assembly_key(&signed)?);
        assert_ne!(base_key, factory.assembly_key(&elsewhere)?);
        Ok(())
    }

    #[test]
    fn test_same_type_in_different_units_differs() -> Result<()> {
        let fx = Fixture::new();
        let factory = KeyFactory::default();

        let other_unit = NamespaceReference::root(ModuleIdentity::new(fx.name("Widgets.dll"), ""));
        let other_system = NamespaceReference::nested(&other_unit, fx.name("System"));
        let foreign = TypeReference::namespace_type(&other_system, fx.name("Int32"), 0);

        assert_ne!(factory.type_reference_key(&fx.int32)?, factory.type_reference_key(&foreign)?);
        assert_eq!(
            factory.namespace_type_key(&fx.system, &fx.name("Int32"), 0)?,
            factory.type_reference_key(&fx.int32)?
        );
        Ok(())
    }

    #[test]
    fn test_unit_key_dispatch() -> Result<()> {
        let fx = Fixture::new();
        let factory = KeyFactory::default();

        let module = ModuleIdentity::new(fx.name("Widgets.dll"), "/tmp/Widgets.dll");
        assert_eq!(
            factory.unit_key(&UnitIdentity::Module(module.clone()))?,
            factory.module_key(&module)?
        );
        assert_eq!(
            factory.unit_key(&UnitIdentity::Assembly(fx.corlib.clone()))?,
            factory.assembly_key(&fx.corlib)?
        );

        let in_assembly = module.clone().with_containing_assembly(fx.corlib.clone());
        assert_ne!(factory.module_key(&module)?, factory.module_key(&in_assembly)?);
        Ok(())
    }

    #[test]
    fn test_absent_references_fail() {
        let fx = Fixture::new();
        let factory = KeyFactory::default();

        let unresolved = NamespaceReference::unresolved_root();
        let lost = TypeReference::namespace_type(&unresolved, fx.name("Lost"), 0);
        assert!(matches!(
            factory.type_reference_key(&lost),
            Err(Error::AbsentReference(EntityKind::Unit))
        ));
        assert!(matches!(
            factory.vector_type_key(&lost),
            Err(Error::AbsentReference(EntityKind::Unit))
        ));

        let field = FieldReference::new(None, fx.name("orphan"), &fx.int32);
        assert!(matches!(
            factory.field_key(&field),
            Err(Error::AbsentReference(EntityKind::Type))
        ));

        let method = MethodReference::new(None, fx.name("Orphan"), MethodSignature::new(&fx.int32));
        assert!(matches!(
            factory.method_key(&method),
            Err(Error::AbsentReference(EntityKind::Type))
        ));
    }

    #[test]
    fn test_dropped_method_parameter_fails() {
        let fx = Fixture::new();
        let factory = KeyFactory::default();

        let method = MethodReference::new_generic(
            Some(fx.object.clone()),
            fx.name("M"),
            &[fx.name("T")],
            |p| MethodSignature::new(&p[0]),
        );
        let parameter = method.generic_parameters[0].clone();
        drop(method);

        assert!(matches!(
            factory.type_reference_key(&parameter),
            Err(Error::AbsentReference(EntityKind::Method))
        ));
    }

    #[test]
    fn test_malformed_matrix() {
        let fx = Fixture::new();
        let factory = KeyFactory::default();

        assert!(matches!(
            factory.matrix_type_key(&fx.int32, 0, &[], &[]),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            factory.matrix_type_key(&fx.int32, 1, &[2, 3], &[]),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            factory.matrix_type_key(&fx.int32, 2, &[], &[0, 0, 0]),
            Err(Error::Malformed { .. })
        ));

        let bad = TypeReference::matrix(&fx.int32, 0, vec![], vec![]);
        assert!(factory.type_reference_key(&bad).is_err());
    }

    #[test]
    fn test_matrix_bounds_distinguish() -> Result<()> {
        let fx = Fixture::new();
        let factory = KeyFactory::default();

        let plain = factory.matrix_type_key(&fx.int32, 2, &[], &[])?;
        let sized = factory.matrix_type_key(&fx.int32, 2, &[4], &[])?;
        let based = factory.matrix_type_key(&fx.int32, 2, &[4], &[1])?;
        let rank3 = factory.matrix_type_key(&fx.int32, 3, &[], &[])?;

        assert_ne!(plain, sized);
        assert_ne!(sized, based);
        assert_ne!(plain, rank3);
        Ok(())
    }

    #[test]
    fn test_generic_method_keys() -> Result<()> {
        let fx = Fixture::new();
        let factory = KeyFactory::default();

        let build = |fx: &Fixture| {
            MethodReference::new_generic(
                Some(fx.object.clone()),
                fx.name("Echo"),
                &[fx.name("T")],
                |p| MethodSignature::new(&p[0]).with_parameter(&TypeReference::vector(&p[0])),
            )
        };
        let first = build(&fx);
        let second = build(&fx);

        let first_key = factory.method_key(&first)?;
        assert_eq!(first_key, factory.method_key(&second)?);

        // Seen from outside, a method parameter is keyed through its method.
        let outside = factory.type_reference_key(&first.generic_parameters[0])?;
        assert_eq!(outside, factory.generic_method_parameter_key(&first, 0)?);
        assert_eq!(outside, factory.type_reference_key(&second.generic_parameters[0])?);

        let non_generic = MethodReference::new(
            Some(fx.object.clone()),
            fx.name("Echo"),
            MethodSignature::new(&fx.int32).with_parameter(&TypeReference::vector(&fx.int32)),
        );
        assert_ne!(first_key, factory.method_key(&non_generic)?);
        Ok(())
    }

    #[test]
    fn test_method_key_ignores_method_identity() -> Result<()> {
        let fx = Fixture::new();
        let factory = KeyFactory::default();

        let definition = MethodReference::new_generic(
            Some(fx.object.clone()),
            fx.name("Empty"),
            &[fx.name("T")],
            |p| MethodSignature::new(&TypeReference::vector(&p[0])),
        );
        // A reference built from the defining signature shares its parameter objects.
        let reference = Arc::new((*definition).clone());

        assert_eq!(factory.method_key(&definition)?, factory.method_key(&reference)?);
        Ok(())
    }

    #[test]
    fn test_foreign_method_parameter_in_signature_is_malformed() {
        let fx = Fixture::new();
        let factory = KeyFactory::default();

        let generic = MethodReference::new_generic(
            Some(fx.object.clone()),
            fx.name("M"),
            &[fx.name("T")],
            |p| MethodSignature::new(&p[0]),
        );
        let borrowed = MethodReference::new(
            Some(fx.object.clone()),
            fx.name("N"),
            MethodSignature::new(&generic.generic_parameters[0]),
        );

        assert!(matches!(factory.method_key(&borrowed), Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_method_signature_components() -> Result<()> {
        let fx = Fixture::new();
        let factory = KeyFactory::default();
        let method = |signature: MethodSignature| {
            MethodReference::new(Some(fx.object.clone()), fx.name("Run"), signature)
        };

        let plain = factory.method_key(&method(MethodSignature::new(&fx.int32)))?;
        let instance = factory.method_key(&method(
            MethodSignature::new(&fx.int32).with_calling_convention(CallingConvention::HAS_THIS),
        ))?;
        let by_ref =
            factory.method_key(&method(MethodSignature::new(&fx.int32).returning_by_ref()))?;
        let with_arg = factory.method_key(&method(
            MethodSignature::new(&fx.int32).with_parameter(&fx.string),
        ))?;
        let varargs = factory.method_key(&method(
            MethodSignature::new(&fx.int32)
                .with_calling_convention(CallingConvention::EXTRA_ARGUMENTS)
                .with_extra_argument(&fx.string),
        ))?;

        let keys = [plain, instance, by_ref, with_arg, varargs];
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                assert_ne!(a, b);
            }
        }
        Ok(())
    }

    #[test]
    fn test_function_pointer_and_modifiers() -> Result<()> {
        let fx = Fixture::new();
        let factory = KeyFactory::default();

        let signature = MethodSignature::new(&fx.int32).with_parameter(&fx.string);
        let fnptr = TypeReference::function_pointer(signature.clone());
        assert_eq!(
            factory.type_reference_key(&fnptr)?,
            factory.function_pointer_type_key(&signature)?
        );

        let required =
            factory.modified_type_key(&fx.int32, &[CustomModifier::required(&fx.object)])?;
        let optional =
            factory.modified_type_key(&fx.int32, &[CustomModifier::optional(&fx.object)])?;
        assert_ne!(required, optional);

        let field = FieldReference::new(Some(fx.object.clone()), fx.name("value"), &fx.int32);
        let volatile = FieldReference::with_modifiers(
            Some(fx.object.clone()),
            fx.name("value"),
            &fx.int32,
            vec![CustomModifier::required(&fx.object)],
        );
        assert_ne!(factory.field_key(&field)?, factory.field_key(&volatile)?);
        Ok(())
    }

    #[test]
    fn test_generic_type_parameters() -> Result<()> {
        let fx = Fixture::new();
        let factory = KeyFactory::default();

        let first = TypeReference::generic_type_parameter(&fx.list, 0, fx.name("T"));
        let renamed = TypeReference::generic_type_parameter(&fx.list, 0, fx.name("TItem"));
        let second = TypeReference::generic_type_parameter(&fx.list, 1, fx.name("T"));

        assert_eq!(factory.type_reference_key(&first)?, factory.type_reference_key(&renamed)?);
        assert_ne!(factory.type_reference_key(&first)?, factory.type_reference_key(&second)?);
        assert_eq!(
            factory.type_reference_key(&first)?,
            factory.generic_type_parameter_key(&fx.list, 0)?
        );
        Ok(())
    }

    #[test]
    fn test_factory_retains_no_entities() -> Result<()> {
        let fx = Fixture::new();
        let factory = KeyFactory::default();

        let instance = TypeReference::generic_instance(&fx.list, &[fx.int32.clone()]);
        let weak = Arc::downgrade(&instance);
        factory.type_reference_key(&instance)?;
        drop(instance);

        assert!(weak.upgrade().is_none());
        Ok(())
    }

    #[test]
    fn test_hashed_keys_are_stable_across_factories() -> Result<()> {
        let fx = Fixture::new();
        let first = KeyFactory::hashed();
        let second = KeyFactory::hashed();

        let instance = TypeReference::generic_instance(&fx.list, &[fx.int32.clone()]);
        assert_eq!(first.type_reference_key(&instance)?, second.type_reference_key(&instance)?);
        assert!(!first.intern_keys_are_reliably_unique());
        assert!(first.is_empty());
        Ok(())
    }

    #[test]
    fn test_sequential_keys_are_dense() -> Result<()> {
        let fx = Fixture::new();
        let factory = KeyFactory::sequential();
        assert!(factory.intern_keys_are_reliably_unique());
        assert_eq!(factory.scheme(), KeyScheme::Sequential);

        let key = factory.vector_type_key(&fx.int32)?;
        let count = factory.len();
        assert_eq!(factory.vector_type_key(&fx.int32)?, key);
        assert_eq!(factory.len(), count);
        Ok(())
    }

    #[test]
    fn test_concurrent_keying_agrees() {
        let fx = Fixture::new();
        let factory = KeyFactory::default();
        let instance =
            TypeReference::generic_instance(&fx.dictionary, &[fx.int32.clone(), fx.string.clone()]);

        let keys: Vec<u32> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| factory.type_reference_key(&instance).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(keys.windows(2).all(|w| w[0] == w[1]));
    }
}
