//! Configuration of the key derivation engine and the canonicalization cache.

/// How interned keys are produced from descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyScheme {
    /// Every distinct descriptor is assigned the next integer from a counter.
    ///
    /// Keys are collision free for the lifetime of the factory, but only meaningful within
    /// that factory.
    #[default]
    Sequential,

    /// Keys are a hash of the descriptor content, folded to 32 bits.
    ///
    /// Keys are stable across factories and runs, but two different descriptors may
    /// collide. Caches must not trust them.
    Hashed,
}

/// Configuration for [`KeyFactory`](super::KeyFactory) and
/// [`CachingInternFactory`](super::CachingInternFactory).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternConfig {
    /// Key scheme of the engine
    pub scheme: KeyScheme,

    /// Capacity the key tables and the canonical-instance map are preallocated with.
    /// The maps still grow past it.
    pub cache_capacity: usize,
}

impl Default for InternConfig {
    fn default() -> Self {
        Self {
            scheme: KeyScheme::Sequential,
            cache_capacity: 0,
        }
    }
}

impl InternConfig {
    /// Collision free, factory-local keys. Canonicalization is active.
    #[must_use]
    pub fn sequential() -> Self {
        Self::default()
    }

    /// Content-hashed keys. Canonicalization is bypassed since keys may collide.
    #[must_use]
    pub fn hashed() -> Self {
        Self {
            scheme: KeyScheme::Hashed,
            ..Self::default()
        }
    }

    /// Preallocate room for `capacity` entries.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// `true` if the configured scheme never maps two descriptors to one key.
    #[must_use]
    pub fn keys_are_reliably_unique(&self) -> bool {
        matches!(self.scheme, KeyScheme::Sequential)
    }
}
