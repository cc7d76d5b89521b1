//! Order-sensitive hashing of interned key descriptors.
//!
//! [`InternKeyHash`] backs the hashed key scheme of the key factory: a descriptor's tag,
//! sub-keys and scalar fields are mixed in sequence and the result is folded to 32 bits.
//! Folding makes collisions possible, so keys from the hashed scheme are never treated as
//! reliably unique.
//!
//! # Hash Design
//!
//! Each component is mixed with an FNV-1a step followed by a finalizer round, so that
//! swapping two components changes the result and equal components never cancel out (as
//! they would with XOR combination).
//!
//! Composite components are first reduced with a plain FNV-1a pass over their bytes, with
//! integers written little-endian, so hashed keys do not depend on the platform or on the
//! standard library's default hasher.
//!
//! # Examples
//!
//! ```rust
//! use cilintern::metadata::typesystem::InternKeyHash;
//!
//! let forward = InternKeyHash::new().add_key(1).add_key(2).finalize_u32();
//! let reverse = InternKeyHash::new().add_key(2).add_key(1).finalize_u32();
//! assert_ne!(forward, reverse);
//! ```

use std::hash::{Hash, Hasher};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// Byte-level FNV-1a used to reduce a single component.
struct ComponentHasher(u64);

impl Hasher for ComponentHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 ^= u64::from(byte);
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }

    fn write_u16(&mut self, i: u16) {
        self.write(&i.to_le_bytes());
    }

    fn write_u32(&mut self, i: u32) {
        self.write(&i.to_le_bytes());
    }

    fn write_u64(&mut self, i: u64) {
        self.write(&i.to_le_bytes());
    }

    fn write_usize(&mut self, i: usize) {
        self.write_u64(u64::try_from(i).unwrap_or(u64::MAX));
    }
}

/// Sequential hash builder over descriptor components.
pub struct InternKeyHash {
    state: u64,
}

impl InternKeyHash {
    /// Create a hash builder seeded with the FNV-1a offset basis.
    #[must_use]
    pub fn new() -> Self {
        InternKeyHash {
            state: FNV_OFFSET_BASIS,
        }
    }

    fn mix(&mut self, value: u64) {
        self.state ^= value;
        self.state = self.state.wrapping_mul(FNV_PRIME);

        self.state ^= self.state >> 33;
        self.state = self.state.wrapping_mul(0xff51_afd7_ed55_8ccd_u64);
        self.state ^= self.state >> 33;
    }

    /// Mix any hashable component into the state.
    #[must_use]
    pub fn add_component<T: Hash + ?Sized>(mut self, component: &T) -> Self {
        let mut hasher = ComponentHasher(FNV_OFFSET_BASIS);
        component.hash(&mut hasher);
        self.mix(hasher.finish());
        self
    }

    /// Mix a previously derived interned key into the state.
    #[must_use]
    pub fn add_key(mut self, key: u32) -> Self {
        self.mix(u64::from(key));
        self
    }

    /// The full 64-bit hash.
    #[must_use]
    pub fn finalize(self) -> u64 {
        self.state
    }

    /// The hash folded to 32 bits.
    ///
    /// Never returns 0, which interned keys reserve.
    #[must_use]
    pub fn finalize_u32(self) -> u32 {
        let state = self.state;
        #[allow(clippy::cast_possible_truncation)]
        let folded = (state ^ (state >> 32)) as u32;
        if folded == 0 {
            1
        } else {
            folded
        }
    }
}

impl Default for InternKeyHash {
    fn default() -> Self {
        Self::new()
    }
}
