//! Error category classification.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Missing rendering resources or an invalid configuration.
    /// Fatal to the call until the embedder fixes its setup.
    Configuration,

    /// Annotation store misuse (overlapping ranges, unknown chips).
    /// Indicates a caller bug; the store is left unchanged.
    Store,

    /// Directory lookup failures. The affected chips stay provisional.
    Lookup,
}

impl ErrorCategory {
    /// True when the field keeps working normally after the error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ErrorCategory::Store | ErrorCategory::Lookup)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Store => "store",
            ErrorCategory::Lookup => "lookup",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Configuration => {
                "Supply chip resources or enable the no-chips fallback, then retry."
            }
            ErrorCategory::Store => "Re-read the chip list; the edit was not applied.",
            ErrorCategory::Lookup => "Chips stay unresolved; resolution is retried on the next focus.",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
