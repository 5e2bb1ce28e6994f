//! Events raised to the embedding application.

use serde::Serialize;

use crate::models::{ChipId, RecipientEntry};

/// Why the chip list changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeReason {
    /// A token was committed, or a paste was chip-ified.
    Added,
    /// A chip was deleted by an edit or programmatically.
    Removed,
    /// Overflowing chips were folded into the summary.
    Collapsed,
    /// The summary was expanded back into chips.
    Expanded,
    /// A chip was upgraded in place by a directory lookup or an alternate.
    Resolved,
    /// The text was emptied.
    Cleared,
}

/// Notification sent through [`RecipientField::subscribe`](crate::widgets::RecipientField::subscribe).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChipEvent {
    /// The ordered recipient list changed. `entries` lists live chips
    /// followed by folded ones.
    ChipsChanged {
        reason: ChangeReason,
        entries: Vec<RecipientEntry>,
    },
    /// Alternates requested for a chip have arrived.
    AlternatesLoaded {
        chip: ChipId,
        entries: Vec<RecipientEntry>,
    },
}

impl ChipEvent {
    pub fn entries(&self) -> &[RecipientEntry] {
        match self {
            ChipEvent::ChipsChanged { entries, .. } | ChipEvent::AlternatesLoaded { entries, .. } => entries,
        }
    }
}
