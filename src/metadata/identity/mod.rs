//! Value identities of assemblies and modules.
//!
//! # Key Components
//!
//! - [`AssemblyIdentity`] - name, culture, version, public key token and location
//! - [`AssemblyVersion`] - four-part version number
//! - [`ModuleIdentity`] - name, location and containing assembly
//! - [`UnitIdentity`] - either of the above, as owner of a root namespace

pub use assembly::{AssemblyIdentity, AssemblyVersion};
pub use module::{ModuleIdentity, UnitIdentity};

mod assembly;
mod module;
