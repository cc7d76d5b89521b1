//! Shared fixtures for unit tests.

use crate::{
    metadata::{
        identity::{AssemblyIdentity, AssemblyVersion, ModuleIdentity},
        intern::InternFactory,
        names::{Name, NameTable},
        typesystem::{
            CustomModifier, FieldReference, MethodReference, MethodSignature, NamespaceRc,
            NamespaceReference, TypeRefRc, TypeReference,
        },
    },
    Result,
};

/// A small corlib: `System.Object`, a few primitives and two generic definitions.
pub struct Fixture {
    pub names: NameTable,
    pub corlib: AssemblyIdentity,
    pub system: NamespaceRc,
    pub object: TypeRefRc,
    pub int32: TypeRefRc,
    pub string: TypeRefRc,
    pub boolean: TypeRefRc,
    /// ``System.Collections.Generic.List`1``
    pub list: TypeRefRc,
    /// ``System.Collections.Generic.Dictionary`2``
    pub dictionary: TypeRefRc,
}

impl Fixture {
    pub fn new() -> Self {
        let names = NameTable::new();
        let version = AssemblyVersion::new(4, 0, 0, 0);
        let corlib = AssemblyIdentity::new(names.intern("mscorlib"), version)
            .with_public_key_token(vec![0xb7, 0x7a, 0x5c, 0x56, 0x19, 0x34, 0xe0, 0x89]);

        let root = NamespaceReference::root(corlib.clone());
        let system = NamespaceReference::nested(&root, names.intern("System"));
        let generic = NamespaceReference::nested(
            &NamespaceReference::nested(&system, names.intern("Collections")),
            names.intern("Generic"),
        );

        let object = TypeReference::namespace_type(&system, names.intern("Object"), 0);
        let int32 = TypeReference::namespace_type(&system, names.intern("Int32"), 0);
        let string = TypeReference::namespace_type(&system, names.intern("String"), 0);
        let boolean = TypeReference::namespace_type(&system, names.intern("Boolean"), 0);
        let list = TypeReference::namespace_type(&generic, names.intern("List`1"), 1);
        let dictionary = TypeReference::namespace_type(&generic, names.intern("Dictionary`2"), 2);

        Fixture {
            names,
            corlib,
            system,
            object,
            int32,
            string,
            boolean,
            list,
            dictionary,
        }
    }

    pub fn name(&self, value: &str) -> Name {
        self.names.intern(value)
    }

    /// `System.Int32` built again from scratch: structurally equal, not identical.
    pub fn rebuilt_int32(&self) -> TypeRefRc {
        let root = NamespaceReference::root(self.corlib.clone());
        let system = NamespaceReference::nested(&root, self.name("System"));
        TypeReference::namespace_type(&system, self.name("Int32"), 0)
    }
}

/// Wraps an engine and maps every generic instance to one key.
pub struct KeyOverride<F> {
    inner: F,
    instance_key: u32,
}

impl<F: InternFactory> KeyOverride<F> {
    pub fn instances_collide(inner: F) -> Self {
        KeyOverride {
            inner,
            instance_key: 0x00c0_ffee,
        }
    }
}

impl<F: InternFactory> InternFactory for KeyOverride<F> {
    fn intern_keys_are_reliably_unique(&self) -> bool {
        true
    }

    fn assembly_key(&self, assembly: &AssemblyIdentity) -> Result<u32> {
        self.inner.assembly_key(assembly)
    }

    fn module_key(&self, module: &ModuleIdentity) -> Result<u32> {
        self.inner.module_key(module)
    }

    fn namespace_key(&self, namespace: &NamespaceReference) -> Result<u32> {
        self.inner.namespace_key(namespace)
    }

    fn namespace_type_key(
        &self,
        namespace: &NamespaceReference,
        name: &Name,
        count: u16,
    ) -> Result<u32> {
        self.inner.namespace_type_key(namespace, name, count)
    }

    fn nested_type_key(
        &self,
        containing_type: &TypeReference,
        name: &Name,
        count: u16,
    ) -> Result<u32> {
        self.inner.nested_type_key(containing_type, name, count)
    }

    fn vector_type_key(&self, element_type: &TypeReference) -> Result<u32> {
        self.inner.vector_type_key(element_type)
    }

    fn matrix_type_key(
        &self,
        element_type: &TypeReference,
        rank: u32,
        sizes: &[u64],
        lower_bounds: &[i32],
    ) -> Result<u32> {
        self.inner.matrix_type_key(element_type, rank, sizes, lower_bounds)
    }

    fn generic_type_instance_key(&self, _: &TypeReference, _: &[TypeRefRc]) -> Result<u32> {
        Ok(self.instance_key)
    }

    fn pointer_type_key(&self, target_type: &TypeReference) -> Result<u32> {
        self.inner.pointer_type_key(target_type)
    }

    fn managed_pointer_type_key(&self, target_type: &TypeReference) -> Result<u32> {
        self.inner.managed_pointer_type_key(target_type)
    }

    fn generic_type_parameter_key(&self, defining_type: &TypeReference, index: u16) -> Result<u32> {
        self.inner.generic_type_parameter_key(defining_type, index)
    }

    fn generic_method_parameter_key(
        &self,
        defining_method: &MethodReference,
        index: u16,
    ) -> Result<u32> {
        self.inner.generic_method_parameter_key(defining_method, index)
    }

    fn function_pointer_type_key(&self, signature: &MethodSignature) -> Result<u32> {
        self.inner.function_pointer_type_key(signature)
    }

    fn modified_type_key(
        &self,
        unmodified_type: &TypeReference,
        modifiers: &[CustomModifier],
    ) -> Result<u32> {
        self.inner.modified_type_key(unmodified_type, modifiers)
    }

    fn field_key(&self, field: &FieldReference) -> Result<u32> {
        self.inner.field_key(field)
    }

    fn method_key(&self, method: &MethodReference) -> Result<u32> {
        self.inner.method_key(method)
    }

    fn type_reference_key(&self, type_ref: &TypeReference) -> Result<u32> {
        match type_ref {
            TypeReference::GenericInstance(_) => Ok(self.instance_key),
            _ => self.inner.type_reference_key(type_ref),
        }
    }
}
