//! Module and unit identities.
//!
//! A module is keyed by its name and location, plus the identity of the assembly that
//! contains it (if known). [`UnitIdentity`] unifies assemblies and modules as the two kinds
//! of unit a root namespace can belong to.

use std::fmt;

use crate::metadata::{identity::AssemblyIdentity, names::Name};

/// Value description of a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleIdentity {
    /// Module name (e.g. "Widgets.dll").
    pub name: Name,

    /// Where the module was loaded from; empty if unknown.
    pub location: String,

    /// The assembly this module belongs to, `None` for stand-alone modules.
    pub containing_assembly: Option<AssemblyIdentity>,
}

impl ModuleIdentity {
    /// Create a stand-alone module identity.
    #[must_use]
    pub fn new(name: Name, location: impl Into<String>) -> Self {
        Self {
            name,
            location: location.into(),
            containing_assembly: None,
        }
    }

    /// Set the containing assembly.
    #[must_use]
    pub fn with_containing_assembly(mut self, assembly: AssemblyIdentity) -> Self {
        self.containing_assembly = Some(assembly);
        self
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.containing_assembly {
            Some(assembly) => write!(f, "{} ({})", self.name, assembly.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// The unit (assembly or module) that owns a root namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnitIdentity {
    /// An assembly
    Assembly(AssemblyIdentity),
    /// A module
    Module(ModuleIdentity),
}

impl UnitIdentity {
    /// Name of the unit.
    #[must_use]
    pub fn name(&self) -> &Name {
        match self {
            UnitIdentity::Assembly(assembly) => &assembly.name,
            UnitIdentity::Module(module) => &module.name,
        }
    }
}

impl From<AssemblyIdentity> for UnitIdentity {
    fn from(identity: AssemblyIdentity) -> Self {
        UnitIdentity::Assembly(identity)
    }
}

impl From<ModuleIdentity> for UnitIdentity {
    fn from(identity: ModuleIdentity) -> Self {
        UnitIdentity::Module(identity)
    }
}
