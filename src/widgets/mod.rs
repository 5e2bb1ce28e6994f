//! Editable field widgets.

pub mod recipient_field;

pub use recipient_field::{FieldStats, Painted, PaintedChip, RecipientField};
