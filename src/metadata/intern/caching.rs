//! Canonicalization cache for structural type instances.
//!
//! [`CachingInternFactory`] hash-conses generic type instances (and, by extension, vectors,
//! pointers and managed pointers) by interned key, so that every request for the same
//! structural instance returns one shared object.
//!
//! # Identity Hazard
//!
//! Two structurally different instances never share a key when keys are reliably unique,
//! but two *different objects* describing the same argument can. A cached instance is only
//! handed out if its components are the very objects the caller passed in; anything else is
//! treated as a miss and the fresh instance replaces the cached one (last write wins).
//! When keys are not reliably unique the cache is bypassed entirely.
//!
//! # Lifecycle
//!
//! [`CachingInternFactory::flush_cache`] swaps in an empty map, after which later requests
//! may return new objects for previously cached keys. [`CachingInternFactory::cleanup`]
//! releases the wrapped engine and the map; every later operation fails with
//! [`Error::FactoryReleased`].

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, RwLock,
};

use dashmap::{mapref::entry::Entry, DashMap};

use crate::{
    metadata::{
        diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics},
        identity::{AssemblyIdentity, ModuleIdentity},
        intern::{InternConfig, InternFactory, KeyFactory},
        names::Name,
        typesystem::{
            CustomModifier, FieldReference, MethodReference, MethodSignature,
            NamespaceReference, TypeRefRc, TypeReference,
        },
    },
    Error, Result,
};

/// Counters of the canonicalization cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStatistics {
    /// Requests answered with a cached instance
    pub hits: usize,
    /// Requests that constructed a new instance, including rejected hits
    pub misses: usize,
    /// Cached entries that were found but could not be reused
    pub rejected: usize,
    /// Requests served without the cache because keys are unreliable
    pub bypassed: usize,
}

/// Outcome of comparing a cached instance with a request.
enum Probe {
    Identical,
    Different,
    CountMismatch { cached: usize, requested: usize },
}

struct CacheState<F> {
    factory: F,
    instances: DashMap<u32, TypeRefRc>,
}

/// An [`InternFactory`] that also hands out canonical structural type instances.
///
/// All key derivation operations are delegated to the wrapped engine.
///
/// # Examples
///
/// ```rust
/// use cilintern::metadata::{
///     intern::CachingInternFactory,
///     names::NameTable,
///     typesystem::{NamespaceReference, TypeReference},
///     identity::{AssemblyIdentity, AssemblyVersion},
/// };
///
/// let names = NameTable::new();
/// let corlib = AssemblyIdentity::new(names.intern("mscorlib"), AssemblyVersion::new(4, 0, 0, 0));
/// let root = NamespaceReference::root(corlib);
/// let system = NamespaceReference::nested(&root, names.intern("System"));
/// let nullable = TypeReference::namespace_type(&system, names.intern("Nullable`1"), 1);
/// let int32 = TypeReference::namespace_type(&system, names.intern("Int32"), 0);
///
/// let factory = CachingInternFactory::new();
/// let first = factory.get_or_make_generic_type_instance(&nullable, &[int32.clone()])?;
/// let second = factory.get_or_make_generic_type_instance(&nullable, &[int32.clone()])?;
///
/// assert!(TypeReference::same_identity(&first, &second));
/// assert_eq!(factory.statistics().hits, 1);
/// # Ok::<(), cilintern::Error>(())
/// ```
pub struct CachingInternFactory<F: InternFactory = KeyFactory> {
    state: RwLock<Option<CacheState<F>>>,
    capacity: usize,
    diagnostics: Arc<Diagnostics>,
    hits: AtomicUsize,
    misses: AtomicUsize,
    rejected: AtomicUsize,
    bypassed: AtomicUsize,
}

impl CachingInternFactory<KeyFactory> {
    /// Cache over a sequential [`KeyFactory`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(InternConfig::default())
    }

    /// Cache over a [`KeyFactory`] built from `config`.
    #[must_use]
    pub fn with_config(config: InternConfig) -> Self {
        Self::build(KeyFactory::new(config), config.cache_capacity)
    }
}

impl Default for CachingInternFactory<KeyFactory> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: InternFactory> CachingInternFactory<F> {
    /// Cache over an existing engine.
    pub fn with_factory(factory: F) -> Self {
        Self::build(factory, 0)
    }

    fn build(factory: F, capacity: usize) -> Self {
        CachingInternFactory {
            state: RwLock::new(Some(CacheState {
                factory,
                instances: DashMap::with_capacity(capacity),
            })),
            capacity,
            diagnostics: Arc::new(Diagnostics::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            rejected: AtomicUsize::new(0),
            bypassed: AtomicUsize::new(0),
        }
    }

    /// Record diagnostics into a shared collector instead of a private one.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// The collector this cache records soft inconsistencies into.
    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        &self.diagnostics
    }

    /// The canonical instance of `generic_type<generic_arguments...>`.
    ///
    /// Returns the cached instance if one exists under the same key and its arguments are
    /// identical (by object identity, in order) to `generic_arguments`. Otherwise a new
    /// instance is built, cached and returned. If keys are not reliably unique a new
    /// instance is returned every time.
    ///
    /// # Errors
    ///
    /// [`Error::FactoryReleased`] after [`Self::cleanup`], or any error of key derivation.
    pub fn get_or_make_generic_type_instance(
        &self,
        generic_type: &TypeRefRc,
        generic_arguments: &[TypeRefRc],
    ) -> Result<TypeRefRc> {
        let make = || TypeReference::generic_instance(generic_type, generic_arguments);

        self.get_or_make(
            |factory| factory.generic_type_instance_key(generic_type, generic_arguments),
            |cached| match cached {
                TypeReference::GenericInstance(instance) => {
                    match instance.arguments_identical_to(generic_arguments) {
                        Some(true) => Probe::Identical,
                        Some(false) => Probe::Different,
                        None => Probe::CountMismatch {
                            cached: instance.generic_arguments.len(),
                            requested: generic_arguments.len(),
                        },
                    }
                }
                _ => Probe::Different,
            },
            make,
        )
    }

    /// The canonical instance of `element_type[]`.
    ///
    /// # Errors
    ///
    /// [`Error::FactoryReleased`] after [`Self::cleanup`], or any error of key derivation.
    pub fn get_or_make_vector_type(&self, element_type: &TypeRefRc) -> Result<TypeRefRc> {
        self.get_or_make(
            |factory| factory.vector_type_key(element_type),
            |cached| match cached {
                TypeReference::Vector(element) => same_target(element, element_type),
                _ => Probe::Different,
            },
            || TypeReference::vector(element_type),
        )
    }

    /// The canonical instance of `target_type*`.
    ///
    /// # Errors
    ///
    /// [`Error::FactoryReleased`] after [`Self::cleanup`], or any error of key derivation.
    pub fn get_or_make_pointer_type(&self, target_type: &TypeRefRc) -> Result<TypeRefRc> {
        self.get_or_make(
            |factory| factory.pointer_type_key(target_type),
            |cached| match cached {
                TypeReference::Pointer(target) => same_target(target, target_type),
                _ => Probe::Different,
            },
            || TypeReference::pointer(target_type),
        )
    }

    /// The canonical instance of `ref target_type`.
    ///
    /// # Errors
    ///
    /// [`Error::FactoryReleased`] after [`Self::cleanup`], or any error of key derivation.
    pub fn get_or_make_managed_pointer_type(&self, target_type: &TypeRefRc) -> Result<TypeRefRc> {
        self.get_or_make(
            |factory| factory.managed_pointer_type_key(target_type),
            |cached| match cached {
                TypeReference::ManagedPointer(target) => same_target(target, target_type),
                _ => Probe::Different,
            },
            || TypeReference::managed_pointer(target_type),
        )
    }

    fn get_or_make<K, P, M>(&self, key_of: K, probe: P, make: M) -> Result<TypeRefRc>
    where
        K: FnOnce(&F) -> Result<u32>,
        P: FnOnce(&TypeReference) -> Probe,
        M: FnOnce() -> TypeRefRc,
    {
        let guard = read_lock!(self.state)?;
        let state = guard.as_ref().ok_or(Error::FactoryReleased)?;

        if !state.factory.intern_keys_are_reliably_unique() {
            self.bypassed.fetch_add(1, Ordering::Relaxed);
            return Ok(make());
        }

        let key = key_of(&state.factory)?;

        let instance = match state.instances.entry(key) {
            Entry::Occupied(mut entry) => {
                match probe(&**entry.get()) {
                    Probe::Identical => {
                        self.hits.fetch_add(1, Ordering::Relaxed);
                        return Ok(entry.get().clone());
                    }
                    Probe::CountMismatch { cached, requested } => {
                        self.diagnostics.push(
                            Diagnostic::new(
                                DiagnosticSeverity::Warning,
                                DiagnosticCategory::Cache,
                                format!(
                                    "Cached instance has {} generic arguments, request has {}",
                                    cached, requested
                                ),
                            )
                            .with_key(key),
                        );
                    }
                    Probe::Different => {}
                }

                self.rejected.fetch_add(1, Ordering::Relaxed);
                self.misses.fetch_add(1, Ordering::Relaxed);

                let instance = make();
                entry.insert(instance.clone());
                instance
            }
            Entry::Vacant(entry) => {
                self.misses.fetch_add(1, Ordering::Relaxed);

                let instance = make();
                entry.insert(instance.clone());
                instance
            }
        };

        Ok(instance)
    }

    /// Drop every cached instance.
    ///
    /// Instances handed out earlier stay valid; later requests build new ones.
    ///
    /// # Errors
    ///
    /// [`Error::FactoryReleased`] after [`Self::cleanup`].
    pub fn flush_cache(&self) -> Result<()> {
        let mut guard = write_lock!(self.state)?;
        let state = guard.as_mut().ok_or(Error::FactoryReleased)?;

        let dropped =
            std::mem::replace(&mut state.instances, DashMap::with_capacity(self.capacity));
        if !dropped.is_empty() {
            self.diagnostics.info(
                DiagnosticCategory::Cache,
                format!("Flushed {} cached instances", dropped.len()),
            );
        }

        Ok(())
    }

    /// Release the wrapped engine and the cache.
    ///
    /// The factory is unusable afterwards. Calling this more than once has no further effect.
    pub fn cleanup(&self) {
        let released = match self.state.write() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(state) = released {
            self.diagnostics.info(
                DiagnosticCategory::Cache,
                format!(
                    "Released factory with {} cached instances",
                    state.instances.len()
                ),
            );
        }
    }

    /// `true` once [`Self::cleanup`] has run.
    pub fn is_released(&self) -> bool {
        self.state.read().map_or(true, |guard| guard.is_none())
    }

    /// Number of cached instances; 0 once released.
    pub fn cached_count(&self) -> usize {
        self.state
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|state| state.instances.len()))
            .unwrap_or(0)
    }

    /// A snapshot of the cache counters.
    pub fn statistics(&self) -> CacheStatistics {
        CacheStatistics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            bypassed: self.bypassed.load(Ordering::Relaxed),
        }
    }

    fn delegate<T>(&self, op: impl FnOnce(&F) -> Result<T>) -> Result<T> {
        let guard = read_lock!(self.state)?;
        let state = guard.as_ref().ok_or(Error::FactoryReleased)?;
        op(&state.factory)
    }
}

fn same_target(cached: &TypeRefRc, requested: &TypeRefRc) -> Probe {
    if TypeReference::same_identity(cached, requested) {
        Probe::Identical
    } else {
        Probe::Different
    }
}

impl<F: InternFactory> InternFactory for CachingInternFactory<F> {
    fn intern_keys_are_reliably_unique(&self) -> bool {
        self.delegate(|f| Ok(f.intern_keys_are_reliably_unique()))
            .unwrap_or(false)
    }

    fn assembly_key(&self, assembly: &AssemblyIdentity) -> Result<u32> {
        self.delegate(|f| f.assembly_key(assembly))
    }

    fn module_key(&self, module: &ModuleIdentity) -> Result<u32> {
        self.delegate(|f| f.module_key(module))
    }

    fn namespace_key(&self, namespace: &NamespaceReference) -> Result<u32> {
        self.delegate(|f| f.namespace_key(namespace))
    }

    fn namespace_type_key(
        &self,
        namespace: &NamespaceReference,
        name: &Name,
        generic_parameter_count: u16,
    ) -> Result<u32> {
        self.delegate(|f| f.namespace_type_key(namespace, name, generic_parameter_count))
    }

    fn nested_type_key(
        &self,
        containing_type: &TypeReference,
        name: &Name,
        generic_parameter_count: u16,
    ) -> Result<u32> {
        self.delegate(|f| f.nested_type_key(containing_type, name, generic_parameter_count))
    }

    fn vector_type_key(&self, element_type: &TypeReference) -> Result<u32> {
        self.delegate(|f| f.vector_type_key(element_type))
    }

    fn matrix_type_key(
        &self,
        element_type: &TypeReference,
        rank: u32,
        sizes: &[u64],
        lower_bounds: &[i32],
    ) -> Result<u32> {
        self.delegate(|f| f.matrix_type_key(element_type, rank, sizes, lower_bounds))
    }

    fn generic_type_instance_key(
        &self,
        generic_type: &TypeReference,
        generic_arguments: &[TypeRefRc],
    ) -> Result<u32> {
        self.delegate(|f| f.generic_type_instance_key(generic_type, generic_arguments))
    }

    fn pointer_type_key(&self, target_type: &TypeReference) -> Result<u32> {
        self.delegate(|f| f.pointer_type_key(target_type))
    }

    fn managed_pointer_type_key(&self, target_type: &TypeReference) -> Result<u32> {
        self.delegate(|f| f.managed_pointer_type_key(target_type))
    }

    fn generic_type_parameter_key(&self, defining_type: &TypeReference, index: u16) -> Result<u32> {
        self.delegate(|f| f.generic_type_parameter_key(defining_type, index))
    }

    fn generic_method_parameter_key(
        &self,
        defining_method: &MethodReference,
        index: u16,
    ) -> Result<u32> {
        self.delegate(|f| f.generic_method_parameter_key(defining_method, index))
    }

    fn function_pointer_type_key(&self, signature: &MethodSignature) -> Result<u32> {
        self.delegate(|f| f.function_pointer_type_key(signature))
    }

    fn modified_type_key(
        &self,
        unmodified_type: &TypeReference,
        custom_modifiers: &[CustomModifier],
    ) -> Result<u32> {
        self.delegate(|f| f.modified_type_key(unmodified_type, custom_modifiers))
    }

    fn field_key(&self, field: &FieldReference) -> Result<u32> {
        self.delegate(|f| f.field_key(field))
    }

    fn method_key(&self, method: &MethodReference) -> Result<u32> {
        self.delegate(|f| f.method_key(method))
    }

    fn type_reference_key(&self, type_ref: &TypeReference) -> Result<u32> {
        self.delegate(|f| f.type_reference_key(type_ref))
    }
}
