// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
#![allow(clippy::too_many_arguments)]
#![deny(unsafe_code)]

//! # cilintern
//!
//! Identity and canonicalization core for in-memory .NET metadata object graphs.
//!
//! Readers, decompilers and emitters build type and member references independently and
//! redundantly, so the same logical type is routinely represented by many distinct objects.
//! `cilintern` gives every logical entity a deterministic 32-bit *interned key*, hands out a
//! single shared instance for expensive composite types (generic instantiations), and
//! provides the space-optimized name to member index that every scope uses for lookups.
//!
//! ## Features
//!
//! - **🔑 Interned keys** - Deterministic keys for assemblies, modules, members and every type expression shape
//! - **♻️ Canonical instances** - Hash-consing of generic type instances with identity re-validation
//! - **📇 Member scopes** - Name to overload-set multimap with exact-size storage
//! - **🧵 Thread safe** - Lock-free key tables and canonical-instance maps
//!
//! ## Quick Start
//!
//! ```rust
//! use cilintern::prelude::*;
//!
//! let names = NameTable::new();
//! let factory = CachingInternFactory::new();
//!
//! let corlib = NamespaceReference::root(UnitIdentity::Assembly(AssemblyIdentity::new(
//!     names.intern("mscorlib"),
//!     AssemblyVersion::new(4, 0, 0, 0),
//! )));
//! let system = NamespaceReference::nested(&corlib, names.intern("System"));
//!
//! let int32 = TypeReference::namespace_type(&system, names.intern("Int32"), 0);
//! let list = TypeReference::namespace_type(&system, names.intern("List`1"), 1);
//!
//! let first = factory.get_or_make_generic_type_instance(&list, &[int32.clone()])?;
//! let second = factory.get_or_make_generic_type_instance(&list, &[int32.clone()])?;
//! assert!(TypeReference::same_identity(&first, &second));
//!
//! let key = factory.type_reference_key(&first)?;
//! assert_eq!(key, factory.generic_type_instance_key(&list, &[int32])?);
//! # Ok::<(), cilintern::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata::names`] - Name pool handing out case-sensitive and case-insensitive keys
//! - [`metadata::identity`] - Assembly and module identities
//! - [`metadata::typesystem`] - Closed model of type expressions, namespaces and member references
//! - [`metadata::intern`] - Key derivation engine and the canonicalization cache
//! - [`metadata::scope`] - Member lookup multimap and named-member scopes
//! - [`metadata::diagnostics`] - Collector for soft inconsistencies
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, Error>`](Result). Errors signal caller
//! mistakes (malformed descriptors, absent references, released factories); the identity
//! hazard of colliding keys is absorbed by the cache and never surfaces as an error.
#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// ```rust
/// use cilintern::prelude::*;
///
/// let names = NameTable::new();
/// let factory = KeyFactory::default();
/// let version = AssemblyVersion::new(4, 0, 0, 0);
/// let assembly = AssemblyIdentity::new(names.intern("mscorlib"), version);
/// let key = factory.assembly_key(&assembly)?;
/// assert_eq!(key, factory.assembly_key(&assembly.clone())?);
/// # Ok::<(), cilintern::Error>(())
/// ```
pub mod prelude;

/// Identity, canonicalization and scope infrastructure for .NET metadata entities
///
/// # Key Components
///
/// - [`metadata::intern::InternFactory`] - Key derivation contract, one operation per descriptor shape
/// - [`metadata::intern::KeyFactory`] - Sequential or hashed key derivation engine
/// - [`metadata::intern::CachingInternFactory`] - Canonical generic type instances
/// - [`metadata::scope::NameScope`] - Name to member(s) multimap
/// - [`metadata::scope::Scope`] - Case-sensitive and case-insensitive member lookup
pub mod metadata;

/// `cilintern` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `cilintern` Error type
///
/// The main error type for all operations in this crate.
pub use error::Error;

/// Key derivation configuration
///
/// See [`metadata::intern::InternConfig`] for the available presets.
pub use metadata::intern::InternConfig;
