use thiserror::Error;

use crate::metadata::EntityKind;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Key derivation, canonicalization and scope lookups are total over well-formed input, so
/// the variants here describe caller errors: a malformed structural descriptor, an absent
/// placeholder handed in where a real entity is required, or an operation on a factory that
/// has already been released.
///
/// # Error Categories
///
/// ## Descriptor Errors
/// - [`Error::Malformed`] - Structurally invalid descriptor (e.g. a matrix with rank 0)
/// - [`Error::AbsentReference`] - A required sub-reference is missing
///
/// ## Lifecycle Errors
/// - [`Error::FactoryReleased`] - The caching factory was used after `cleanup()`
/// - [`Error::KeySpaceExhausted`] - The sequential key scheme ran out of keys
/// - [`Error::LockError`] - Thread synchronization failure
///
/// # Examples
///
/// ```rust
/// use cilintern::{Error, metadata::intern::CachingInternFactory};
///
/// let factory = CachingInternFactory::new();
/// factory.cleanup();
///
/// match factory.flush_cache() {
///     Err(Error::FactoryReleased) => println!("factory is no longer usable"),
///     Err(e) => eprintln!("Other error: {}", e),
///     Ok(()) => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A structural descriptor is malformed and cannot be keyed.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An absent placeholder was supplied where a real entity is required.
    ///
    /// Descriptors carry unresolved references as `None` (or, for generic method
    /// parameters, a dropped defining method). Such references have no structural
    /// identity and can never be keyed.
    #[error("Absent {0} reference can not be interned")]
    AbsentReference(EntityKind),

    /// The caching factory has been released through `cleanup()`.
    ///
    /// A released factory is single-use: every subsequent operation fails with
    /// this error instead of silently returning degraded results.
    #[error("The intern factory has been released")]
    FactoryReleased,

    /// The sequential key scheme has handed out every available key.
    #[error("The interned key space has been exhausted")]
    KeySpaceExhausted,

    /// Failed to lock target
    #[error("Failed to lock target")]
    LockError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::AbsentReference(EntityKind::Method).to_string(),
            "Absent Method reference can not be interned"
        );

        let malformed = malformed_error!("Matrix rank {} is invalid", 0);
        assert!(matches!(&malformed, Error::Malformed { line, .. } if *line > 0));
        assert!(malformed.to_string().ends_with(": Matrix rank 0 is invalid"));
    }
}
