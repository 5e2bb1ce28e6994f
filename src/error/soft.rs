//! Conditions absorbed into field state instead of being returned.

use std::fmt;

/// A condition the field recovers from on its own.
///
/// These are logged and counted in
/// [`FieldStats`](crate::widgets::recipient_field::FieldStats), never
/// returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoftCondition {
    /// A typed token could neither be validated nor repaired; it is kept
    /// as an invalid, editable chip.
    AmbiguousToken,
    /// A resolution arrived for a chip that is gone or already resolved.
    StaleResolution,
    /// A folded chip's text could not be found again on expand.
    OverflowRestoreMiss,
}

impl SoftCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoftCondition::AmbiguousToken => "ambiguous_token",
            SoftCondition::StaleResolution => "stale_resolution",
            SoftCondition::OverflowRestoreMiss => "overflow_restore_miss",
        }
    }
}

impl fmt::Display for SoftCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
