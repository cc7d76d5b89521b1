//! Assembly identities.
//!
//! An [`AssemblyIdentity`] is the value-level description of an assembly that the key
//! derivation engine turns into an interned key: simple name, culture, four-part version,
//! public key token and location. It holds no reference to a loaded assembly, so keys derived
//! from it stay meaningful after the assembly object is gone.
//!
//! # Display Names
//!
//! Identities round-trip through the familiar display-name syntax:
//!
//! ```rust
//! use cilintern::metadata::{identity::AssemblyIdentity, names::NameTable};
//!
//! let names = NameTable::new();
//! let identity = AssemblyIdentity::parse(
//!     "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
//!     &names,
//! )?;
//!
//! assert_eq!(identity.name.as_str(), "mscorlib");
//! assert!(identity.is_strong_named());
//! assert!(identity.is_culture_neutral());
//! assert_eq!(
//!     identity.display_name(),
//!     "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089"
//! );
//! # Ok::<(), cilintern::Error>(())
//! ```

use std::{fmt, fmt::Write as _, str::FromStr};

use sha1::{Digest, Sha1};

use crate::{
    metadata::names::{Name, NameTable},
    Error, Result,
};

/// Value description of an assembly.
///
/// # Equality Semantics
///
/// The derived equality compares every component, including the location. The key
/// derivation engine is more lenient on the name: it keys it by
/// [`Name::unique_key_ignoring_case`], matching how the runtime binds assembly names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssemblyIdentity {
    /// Simple assembly name (e.g. "mscorlib", "System.Core").
    pub name: Name,

    /// Culture of a satellite assembly; empty for culture-neutral assemblies.
    pub culture: String,

    /// Four-part version number.
    pub version: AssemblyVersion,

    /// The 8-byte public key token, empty if the assembly is not strong named.
    pub public_key_token: Vec<u8>,

    /// Where the assembly was (or will be) loaded from; empty if unknown.
    pub location: String,
}

/// Four-part assembly version (major.minor.build.revision).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AssemblyVersion {
    /// Major version number
    pub major: u16,

    /// Minor version number
    pub minor: u16,

    /// Build number
    pub build: u16,

    /// Revision number
    pub revision: u16,
}

impl AssemblyIdentity {
    /// Create a culture-neutral, non strong-named identity without location.
    #[must_use]
    pub fn new(name: Name, version: AssemblyVersion) -> Self {
        Self {
            name,
            culture: String::new(),
            version,
            public_key_token: Vec::new(),
            location: String::new(),
        }
    }

    /// Set the culture (`"neutral"` is normalized to the empty culture).
    #[must_use]
    pub fn with_culture(mut self, culture: impl Into<String>) -> Self {
        let culture = culture.into();
        self.culture = if culture.eq_ignore_ascii_case("neutral") {
            String::new()
        } else {
            culture
        };
        self
    }

    /// Set the public key token.
    #[must_use]
    pub fn with_public_key_token(mut self, token: impl Into<Vec<u8>>) -> Self {
        self.public_key_token = token.into();
        self
    }

    /// Set the public key token by deriving it from a full public key.
    #[must_use]
    pub fn with_public_key(self, public_key: &[u8]) -> Self {
        self.with_public_key_token(Self::public_key_token_from_key(public_key))
    }

    /// Set the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Compute the public key token of a public key.
    ///
    /// The token is the last 8 bytes of the SHA-1 hash of the key, in reverse order.
    #[must_use]
    pub fn public_key_token_from_key(public_key: &[u8]) -> Vec<u8> {
        if public_key.is_empty() {
            return Vec::new();
        }

        let mut hasher = Sha1::new();
        hasher.update(public_key);
        let hash = hasher.finalize();

        hash[hash.len() - 8..].iter().rev().copied().collect()
    }

    /// Parse an assembly display name.
    ///
    /// Accepts `Name[, Version=a.b.c.d][, Culture=xx][, PublicKeyToken=hex16|null]`; unknown
    /// components are ignored. The simple name is interned into `names`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] for an empty name, an invalid version or a token that is
    /// not exactly 16 hex digits.
    pub fn parse(display_name: &str, names: &NameTable) -> Result<Self> {
        let mut parts = display_name.split(',').map(str::trim);

        let simple_name = parts.next().unwrap_or_default();
        if simple_name.is_empty() {
            return Err(malformed_error!("Assembly name cannot be empty"));
        }

        let mut identity = Self::new(names.intern(simple_name), AssemblyVersion::default());

        for part in parts {
            if let Some(value) = part.strip_prefix("Version=") {
                identity.version = AssemblyVersion::parse(value)?;
            } else if let Some(value) = part.strip_prefix("Culture=") {
                identity = identity.with_culture(value);
            } else if let Some(value) = part.strip_prefix("PublicKeyToken=") {
                if value != "null" && !value.is_empty() {
                    identity.public_key_token = parse_token(value)?;
                }
            }
        }

        Ok(identity)
    }

    /// Format the identity as a display name.
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut result = String::with_capacity(self.name.as_str().len() + 80);

        result.push_str(self.name.as_str());
        let _ = write!(result, ", Version={}", self.version);

        let culture = if self.culture.is_empty() {
            "neutral"
        } else {
            &self.culture
        };
        let _ = write!(result, ", Culture={}", culture);

        result.push_str(", PublicKeyToken=");
        if self.public_key_token.is_empty() {
            result.push_str("null");
        } else {
            for byte in &self.public_key_token {
                let _ = write!(result, "{:02x}", byte);
            }
        }

        result
    }

    /// `true` if the identity carries a public key token.
    #[must_use]
    pub fn is_strong_named(&self) -> bool {
        !self.public_key_token.is_empty()
    }

    /// `true` if the identity has no culture.
    #[must_use]
    pub fn is_culture_neutral(&self) -> bool {
        self.culture.is_empty()
    }
}

fn parse_token(value: &str) -> Result<Vec<u8>> {
    if value.len() != 16 || !value.is_ascii() {
        return Err(malformed_error!(
            "PublicKeyToken must be exactly 16 hex characters, got '{}'",
            value
        ));
    }

    (0..value.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&value[i..i + 2], 16)
                .map_err(|_| malformed_error!("Invalid hex in PublicKeyToken '{}'", value))
        })
        .collect()
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

impl AssemblyVersion {
    /// Create a version from its four components.
    #[must_use]
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parse a dotted version with one to four components; missing components are zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] for more than four components or a component that is
    /// not a 16-bit unsigned integer.
    pub fn parse(version_str: &str) -> Result<Self> {
        let parts: Vec<&str> = version_str.split('.').collect();

        if parts.is_empty() || parts.len() > 4 {
            return Err(malformed_error!("Invalid version format: {}", version_str));
        }

        let mut components = [0u16; 4];

        for (i, part) in parts.iter().enumerate() {
            components[i] = part
                .parse::<u16>()
                .map_err(|_| malformed_error!("Invalid version component: {}", part))?;
        }

        Ok(Self::new(
            components[0],
            components[1],
            components[2],
            components[3],
        ))
    }
}

impl FromStr for AssemblyVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}
