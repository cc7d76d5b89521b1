//! Diagnostics collection for soft inconsistencies.
//!
//! Interning never fails on well-formed input, but a few conditions are worth surfacing to
//! the host without aborting the operation: a canonical instance whose argument count does
//! not match its key, or cache entries being dropped by a flush. These are recorded here
//! and the operation continues with a safe fallback.
//!
//! The collector is append-only and lock-free (`boxcar::Vec`), so it can be shared between
//! threads through an `Arc` and written from any of them.
//!
//! # Example
//!
//! ```rust
//! use cilintern::metadata::diagnostics::{Diagnostics, DiagnosticCategory};
//!
//! let diagnostics = Diagnostics::new();
//! diagnostics.warning(DiagnosticCategory::Cache, "argument count mismatch on cache hit");
//!
//! assert!(diagnostics.has_warnings());
//! assert!(!diagnostics.has_errors());
//! ```

use std::fmt;

/// Severity level of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Informational message, nothing went wrong.
    Info,
    /// A recoverable inconsistency; a fallback was used.
    Warning,
    /// A caller error that was reported instead of propagated.
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Info => write!(f, "INFO"),
            DiagnosticSeverity::Warning => write!(f, "WARN"),
            DiagnosticSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// The component a diagnostic originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    /// Name pool
    Name,
    /// Key derivation
    Intern,
    /// Canonicalization cache
    Cache,
    /// Member scopes
    Scope,
    /// Anything else
    General,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Name => write!(f, "Name"),
            DiagnosticCategory::Intern => write!(f, "Intern"),
            DiagnosticCategory::Cache => write!(f, "Cache"),
            DiagnosticCategory::Scope => write!(f, "Scope"),
            DiagnosticCategory::General => write!(f, "General"),
        }
    }
}

/// A single diagnostic entry.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// How serious the entry is
    pub severity: DiagnosticSeverity,
    /// Where it came from
    pub category: DiagnosticCategory,
    /// Human readable description
    pub message: String,
    /// The interned key involved, if any
    pub key: Option<u32>,
}

impl Diagnostic {
    /// Create a new diagnostic entry without an associated key.
    pub fn new(
        severity: DiagnosticSeverity,
        category: DiagnosticCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            key: None,
        }
    }

    /// Attach the interned key the entry is about.
    #[must_use]
    pub fn with_key(mut self, key: u32) -> Self {
        self.key = Some(key);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category, self.message)?;

        if let Some(key) = self.key {
            write!(f, " (key: 0x{:08x})", key)?;
        }

        Ok(())
    }
}

/// Append-only, thread-safe collection of [`Diagnostic`] entries.
#[derive(Debug)]
pub struct Diagnostics {
    entries: boxcar::Vec<Diagnostic>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: boxcar::Vec::new(),
        }
    }

    /// Record an informational entry.
    pub fn info(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagnosticSeverity::Info, category, message));
    }

    /// Record a warning.
    pub fn warning(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Warning,
            category,
            message,
        ));
    }

    /// Record an error.
    pub fn error(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Error,
            category,
            message,
        ));
    }

    /// Record a prepared entry.
    pub fn push(&self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// `true` if anything has been recorded.
    pub fn has_any(&self) -> bool {
        self.entries.count() > 0
    }

    /// `true` if at least one error has been recorded.
    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, d)| d.severity == DiagnosticSeverity::Error)
    }

    /// `true` if at least one warning has been recorded.
    pub fn has_warnings(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, d)| d.severity == DiagnosticSeverity::Warning)
    }

    /// Total number of entries.
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Number of errors.
    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == DiagnosticSeverity::Error)
            .count()
    }

    /// Number of warnings.
    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == DiagnosticSeverity::Warning)
            .count()
    }

    /// Iterate over all entries in recording order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().map(|(_, d)| d)
    }

    /// Entries of a single category.
    pub fn by_category(&self, category: DiagnosticCategory) -> Vec<&Diagnostic> {
        self.iter().filter(|d| d.category == category).collect()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in self.iter() {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}
