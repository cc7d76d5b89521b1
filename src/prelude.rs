//! # cilintern Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! of the cilintern library. Import it to get quick access to key derivation,
//! canonicalization and member lookup.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cilintern operations
pub use crate::Error;

/// The result type used throughout cilintern
pub use crate::Result;

/// Configuration of key schemes and cache sizing
pub use crate::metadata::intern::{InternConfig, KeyScheme};

// ================================================================================================
// Key Derivation and Canonicalization
// ================================================================================================

/// Key derivation trait, engine and canonicalization cache
pub use crate::metadata::intern::{CacheStatistics, CachingInternFactory, InternFactory, KeyFactory};

// ================================================================================================
// Names and Identities
// ================================================================================================

/// The name pool
pub use crate::metadata::names::{Name, NameTable};

/// Assembly and module identities
pub use crate::metadata::identity::{
    AssemblyIdentity, AssemblyVersion, ModuleIdentity, UnitIdentity,
};

// ================================================================================================
// Type System
// ================================================================================================

/// Type expressions and their components
pub use crate::metadata::typesystem::{
    CallingConvention, CustomModifier, MethodSignature, NamespaceRc, NamespaceReference,
    ParameterTypeInformation, TypeKind, TypeRefRc, TypeReference,
};

/// Member references
pub use crate::metadata::typesystem::{
    FieldRefRc, FieldReference, MethodRefRc, MethodReference, NamedEntity,
};

// ================================================================================================
// Scopes and Diagnostics
// ================================================================================================

/// Member lookup structures
pub use crate::metadata::scope::{NameScope, Scope, Values};

/// Soft-failure reporting
pub use crate::metadata::diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics,
};

/// Entity labels used in errors
pub use crate::metadata::EntityKind;
