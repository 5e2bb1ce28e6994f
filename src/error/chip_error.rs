//! Unified error type for the recipient field.

use thiserror::Error;

use super::category::ErrorCategory;
use super::configuration::ConfigurationError;
use super::store::StoreError;
use crate::traits::LookupError;

/// Every error a field operation can return.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChipError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl ChipError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChipError::Configuration(_) => ErrorCategory::Configuration,
            ChipError::Store(_) => ErrorCategory::Store,
            ChipError::Lookup(_) => ErrorCategory::Lookup,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ChipError::Configuration(err) => err.error_code(),
            ChipError::Store(err) => err.error_code(),
            ChipError::Lookup(LookupError::Unavailable(_)) => "LOOKUP_UNAVAILABLE",
            ChipError::Lookup(LookupError::Cancelled) => "LOOKUP_CANCELLED",
            ChipError::Lookup(LookupError::Other(_)) => "LOOKUP_FAILED",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            ChipError::Configuration(err) => err.user_message(),
            ChipError::Store(_) => "The recipient list changed; try again.".to_string(),
            ChipError::Lookup(_) => "Contacts could not be looked up.".to_string(),
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.category().is_recoverable()
    }
}

/// Type alias for results of field operations.
pub type ChipResult<T> = Result<T, ChipError>;
