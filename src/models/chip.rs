//! Chip annotations and the overflow summary.
//!
//! Annotations never own text. They describe a half-open `[start, end)`
//! character range of the field's buffer and the entry rendered over it.

use serde::Serialize;

use super::entry::RecipientEntry;

/// Stable identity of a chip across edits, collapse and resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ChipId(pub(crate) u64);

impl ChipId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ChipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chip#{}", self.0)
    }
}

/// Half-open character range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// `start <= offset < end`.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Strict overlap; ranges that only touch do not overlap.
    pub fn overlaps(&self, other: &TextRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Span query semantics: a point query matches ranges touching it, a
    /// non-empty query matches ranges sharing at least one character.
    pub fn intersects_query(&self, query_start: usize, query_end: usize) -> bool {
        if self.start > query_end || self.end < query_start {
            return false;
        }
        if !self.is_empty() && query_start != query_end {
            return self.start != query_end && self.end != query_start;
        }
        true
    }

    /// Move this range through an edit that replaced `removed` characters at
    /// `at` with `inserted` characters.
    ///
    /// Boundaries follow exclusive-exclusive semantics: text inserted at
    /// either boundary lands outside the range.
    pub fn shift(&self, at: usize, removed: usize, inserted: usize) -> TextRange {
        let edit_end = at + removed;
        let start = if self.start < at {
            self.start
        } else if self.start >= edit_end {
            self.start - removed + inserted
        } else {
            at + inserted
        };
        let end = if self.end <= at {
            self.end
        } else if self.end >= edit_end {
            self.end - removed + inserted
        } else {
            at
        };
        TextRange { start, end }
    }
}

/// A recipient chip anchored to a range of the buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChipAnnotation {
    pub(crate) id: ChipId,
    pub(crate) range: TextRange,
    pub(crate) entry: RecipientEntry,
    pub(crate) selected: bool,
    pub(crate) original_text: String,
    pub(crate) visible: bool,
}

impl ChipAnnotation {
    pub(crate) fn new(id: ChipId, range: TextRange, entry: RecipientEntry) -> Self {
        Self {
            id,
            range,
            entry,
            selected: false,
            original_text: String::new(),
            visible: true,
        }
    }

    pub(crate) fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn id(&self) -> ChipId {
        self.id
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn entry(&self) -> &RecipientEntry {
        &self.entry
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_provisional(&self) -> bool {
        self.entry.is_provisional()
    }

    /// Text used to find this chip again after the buffer changed. Falls back
    /// to the entry's address when nothing was recorded.
    pub fn original_text(&self) -> &str {
        if self.original_text.is_empty() {
            self.entry.address()
        } else {
            &self.original_text
        }
    }

    pub(crate) fn set_original_text(&mut self, text: &str) {
        self.original_text = text.trim().to_string();
    }
}

/// The "+N more" annotation standing in for folded chips.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverflowSummary {
    pub(crate) range: TextRange,
    pub(crate) count: usize,
    pub(crate) label: String,
    /// Folded chips in their original order, with pre-collapse ranges.
    pub(crate) removed: Vec<ChipAnnotation>,
}

impl OverflowSummary {
    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn removed_chips(&self) -> &[ChipAnnotation] {
        &self.removed
    }

    pub(crate) fn contains_chip(&self, id: ChipId) -> bool {
        self.removed.iter().any(|chip| chip.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_insert_before_moves_range() {
        let range = TextRange::new(5, 10);
        assert_eq!(range.shift(2, 0, 3), TextRange::new(8, 13));
    }

    #[test]
    fn test_shift_insert_at_boundaries_does_not_extend() {
        let range = TextRange::new(5, 10);
        assert_eq!(range.shift(5, 0, 2), TextRange::new(7, 12));
        assert_eq!(range.shift(10, 0, 2), TextRange::new(5, 10));
    }

    #[test]
    fn test_shift_insert_inside_extends() {
        let range = TextRange::new(5, 10);
        assert_eq!(range.shift(7, 0, 2), TextRange::new(5, 12));
    }

    #[test]
    fn test_shift_delete_covering_range_collapses() {
        let range = TextRange::new(5, 10);
        assert!(range.shift(4, 8, 0).is_empty());
        assert!(range.shift(5, 5, 3).is_empty());
    }

    #[test]
    fn test_shift_delete_after_keeps_range() {
        let range = TextRange::new(5, 10);
        assert_eq!(range.shift(10, 1, 0), TextRange::new(5, 10));
        assert_eq!(range.shift(11, 4, 0), TextRange::new(5, 10));
    }

    #[test]
    fn test_intersects_query_point_touches() {
        let range = TextRange::new(5, 10);
        assert!(range.intersects_query(10, 10));
        assert!(range.intersects_query(5, 5));
        assert!(!range.intersects_query(11, 11));
    }

    #[test]
    fn test_intersects_query_range_needs_shared_char() {
        let range = TextRange::new(5, 10);
        assert!(!range.intersects_query(10, 14));
        assert!(!range.intersects_query(0, 5));
        assert!(range.intersects_query(9, 14));
    }

    #[test]
    fn test_original_text_falls_back_to_address() {
        let entry = RecipientEntry::fake("a@example.com", true);
        let mut chip = ChipAnnotation::new(ChipId(1), TextRange::new(0, 14), entry);
        assert_eq!(chip.original_text(), "a@example.com");
        chip.set_original_text("  <a@example.com>, ");
        assert_eq!(chip.original_text(), "<a@example.com>,");
    }
}
