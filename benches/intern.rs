//! Benchmarks for key derivation and canonicalization.
//!
//! - Keying a fresh generic instance (sequential and hashed schemes)
//! - Canonical instance lookups on hit
//! - Member scope insertion and lookup

extern crate cilintern;

use std::{hint::black_box, sync::Arc};

use cilintern::prelude::*;
use criterion::{criterion_group, criterion_main, Criterion};

struct Types {
    names: NameTable,
    int32: TypeRefRc,
    string: TypeRefRc,
    dictionary: TypeRefRc,
}

fn types() -> Types {
    let names = NameTable::new();
    let corlib = AssemblyIdentity::new(names.intern("mscorlib"), AssemblyVersion::new(4, 0, 0, 0));
    let root = NamespaceReference::root(corlib);
    let system = NamespaceReference::nested(&root, names.intern("System"));

    Types {
        int32: TypeReference::namespace_type(&system, names.intern("Int32"), 0),
        string: TypeReference::namespace_type(&system, names.intern("String"), 0),
        dictionary: TypeReference::namespace_type(&system, names.intern("Dictionary`2"), 2),
        names,
    }
}

/// Key of `Dictionary<int, string[]>` under the sequential scheme.
fn bench_sequential_instance_key(c: &mut Criterion) {
    let t = types();
    let factory = KeyFactory::sequential();
    let arguments = [t.int32.clone(), TypeReference::vector(&t.string)];
    let instance = TypeReference::generic_instance(&t.dictionary, &arguments);

    c.bench_function("key_sequential_generic_instance", |b| {
        b.iter(|| black_box(factory.type_reference_key(black_box(&instance)).unwrap()));
    });
}

/// Same descriptor under the hashed scheme.
fn bench_hashed_instance_key(c: &mut Criterion) {
    let t = types();
    let factory = KeyFactory::hashed();
    let arguments = [t.int32.clone(), TypeReference::vector(&t.string)];
    let instance = TypeReference::generic_instance(&t.dictionary, &arguments);

    c.bench_function("key_hashed_generic_instance", |b| {
        b.iter(|| black_box(factory.type_reference_key(black_box(&instance)).unwrap()));
    });
}

fn bench_canonical_instance_hit(c: &mut Criterion) {
    let t = types();
    let factory = CachingInternFactory::new();
    let arguments = [t.int32.clone(), t.string.clone()];
    factory
        .get_or_make_generic_type_instance(&t.dictionary, &arguments)
        .unwrap();

    c.bench_function("cache_generic_instance_hit", |b| {
        b.iter(|| {
            black_box(
                factory
                    .get_or_make_generic_type_instance(&t.dictionary, black_box(&arguments))
                    .unwrap(),
            )
        });
    });
}

/// 64 overloads of one name, then lookups.
fn bench_scope_overloads(c: &mut Criterion) {
    let t = types();
    let name = t.names.intern("Add");
    let methods: Vec<MethodRefRc> = (0..64)
        .map(|_| MethodReference::new(None, name.clone(), MethodSignature::new(&t.int32)))
        .collect();

    c.bench_function("scope_add_overloads", |b| {
        b.iter(|| {
            let mut scope: NameScope<u32, MethodReference> = NameScope::new();
            for method in &methods {
                scope.add(name.unique_key(), Arc::clone(method));
            }
            black_box(scope)
        });
    });

    let mut scope = Scope::new();
    for method in &methods {
        scope.add_member(method.clone());
    }
    c.bench_function("scope_lookup_ignoring_case", |b| {
        b.iter(|| black_box(scope.members_named(black_box(&name), true).count()));
    });
}

criterion_group!(
    benches,
    bench_sequential_instance_key,
    bench_hashed_instance_key,
    bench_canonical_instance_hit,
    bench_scope_overloads
);
criterion_main!(benches);
