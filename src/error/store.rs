//! Annotation store errors.

use thiserror::Error;

use crate::models::ChipId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Range [{start}, {end}) overlaps an existing annotation")]
    Overlap { start: usize, end: usize },

    #[error("Range [{start}, {end}) is empty or out of bounds")]
    InvalidRange { start: usize, end: usize },

    #[error("Unknown chip {0}")]
    UnknownChip(ChipId),

    #[error("Store invariant violated: {0}")]
    Corrupted(&'static str),
}

impl StoreError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::Overlap { .. } => "STORE_OVERLAP",
            StoreError::InvalidRange { .. } => "STORE_INVALID_RANGE",
            StoreError::UnknownChip(_) => "STORE_UNKNOWN_CHIP",
            StoreError::Corrupted(_) => "STORE_CORRUPTED",
        }
    }
}
