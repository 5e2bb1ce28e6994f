//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```ignore
//! use recipient_chips::prelude::*;
//! ```
//!
//! This will import:
//! - The field itself and its stats (RecipientField, FieldStats)
//! - Configuration (FieldConfig)
//! - Model types (RecipientEntry, ChipAnnotation, ChipId, TextRange)
//! - Events and errors
//! - Collaborator traits and their stock adapters

// Field
pub use crate::widgets::{FieldStats, Painted, PaintedChip, RecipientField};

// Configuration
pub use crate::config::FieldConfig;

// Model types
pub use crate::models::{ChipAnnotation, ChipId, ContactId, OverflowSummary, RecipientEntry, TextRange};

// Events and errors
pub use crate::error::{ChipError, ChipResult, ErrorCategory, SoftCondition};
pub use crate::events::{ChangeReason, ChipEvent};

// Collaborators
pub use crate::adapters::{EmailValidator, Rfc822Tokenizer, StaticDirectory};
pub use crate::traits::{ChipResources, DirectoryLookup, RenderSurface, Tokenizer, Validator};
