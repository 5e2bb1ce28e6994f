//! Annotation store.
//!
//! An arena of [`ChipAnnotation`] records keyed by [`ChipId`], plus an
//! ordered index by start offset. The store never touches text on its own;
//! callers edit the [`TextBuffer`] and then report the edit through
//! [`AnnotationStore::apply_edit`] so every boundary shifts consistently.
//!
//! Invariants, checked by [`AnnotationStore::check_invariants`]:
//! - ranges are non-empty, non-overlapping and ordered by start
//! - at most one chip is selected
//! - the overflow summary, if any, overlaps no chip

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::error::StoreError;
use crate::models::{ChipAnnotation, ChipId, OverflowSummary, TextRange};
use crate::text::TextBuffer;

#[derive(Debug, Default)]
pub struct AnnotationStore {
    chips: HashMap<ChipId, ChipAnnotation>,
    by_start: BTreeMap<usize, ChipId>,
    overflow: Option<OverflowSummary>,
    next_id: u64,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a fresh identity.
    pub fn allocate_id(&mut self) -> ChipId {
        self.next_id += 1;
        ChipId(self.next_id)
    }

    pub fn len(&self) -> usize {
        self.chips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    pub fn get(&self, id: ChipId) -> Option<&ChipAnnotation> {
        self.chips.get(&id)
    }

    pub fn contains(&self, id: ChipId) -> bool {
        self.chips.contains_key(&id)
    }

    /// All chips ordered by start.
    pub fn list(&self) -> Vec<&ChipAnnotation> {
        self.by_start.values().filter_map(|id| self.chips.get(id)).collect()
    }

    /// Chip identities ordered by start.
    pub fn ids(&self) -> Vec<ChipId> {
        self.by_start.values().copied().collect()
    }

    pub fn first(&self) -> Option<&ChipAnnotation> {
        self.by_start.values().next().and_then(|id| self.chips.get(id))
    }

    pub fn last(&self) -> Option<&ChipAnnotation> {
        self.by_start.values().next_back().and_then(|id| self.chips.get(id))
    }

    /// Chips whose range contains `offset`.
    pub fn at(&self, offset: usize) -> Vec<&ChipAnnotation> {
        self.by_start
            .range(..=offset)
            .next_back()
            .and_then(|(_, id)| self.chips.get(id))
            .filter(|chip| chip.range.contains(offset))
            .into_iter()
            .collect()
    }

    /// Chips matching a span query over `[start, end]`.
    ///
    /// A point query (`start == end`) also matches chips ending or starting
    /// exactly there.
    pub fn spans(&self, start: usize, end: usize) -> Vec<&ChipAnnotation> {
        self.by_start
            .range(..=end)
            .filter_map(|(_, id)| self.chips.get(id))
            .filter(|chip| chip.range.intersects_query(start, end))
            .collect()
    }

    /// Insert an annotation, failing on empty or overlapping ranges.
    ///
    /// Inserting a selected chip clears any other selection.
    pub fn insert(&mut self, chip: ChipAnnotation) -> Result<ChipId, StoreError> {
        let range = chip.range;
        if range.is_empty() {
            return Err(StoreError::InvalidRange {
                start: range.start,
                end: range.end,
            });
        }
        if self.overlaps_any(&range) {
            return Err(StoreError::Overlap {
                start: range.start,
                end: range.end,
            });
        }

        if chip.selected {
            self.clear_selection();
        }

        let id = chip.id;
        self.next_id = self.next_id.max(id.0);
        self.by_start.insert(range.start, id);
        self.chips.insert(id, chip);
        trace!("Inserted {} at [{}, {})", id, range.start, range.end);
        Ok(id)
    }

    fn overlaps_any(&self, range: &TextRange) -> bool {
        let chip_overlap = self
            .by_start
            .range(..range.end)
            .next_back()
            .and_then(|(_, id)| self.chips.get(id))
            .is_some_and(|chip| chip.range.overlaps(range));
        let summary_overlap = self
            .overflow
            .as_ref()
            .is_some_and(|summary| summary.range.overlaps(range));
        chip_overlap || summary_overlap
    }

    /// Detach a chip without touching the text.
    pub fn remove(&mut self, id: ChipId) -> Result<ChipAnnotation, StoreError> {
        let chip = self.chips.remove(&id).ok_or(StoreError::UnknownChip(id))?;
        self.by_start.remove(&chip.range.start);
        Ok(chip)
    }

    /// Detach a chip and delete the characters it covers.
    pub fn remove_and_delete_text(
        &mut self,
        id: ChipId,
        buffer: &mut TextBuffer,
    ) -> Result<ChipAnnotation, StoreError> {
        let chip = self.remove(id)?;
        let removed = buffer.replace(chip.range.start, chip.range.end, "");
        self.apply_edit(chip.range.start, removed, 0);
        Ok(chip)
    }

    pub fn selected(&self) -> Option<&ChipAnnotation> {
        self.chips.values().find(|chip| chip.selected)
    }

    /// Select `id`, unselecting every other chip.
    pub fn set_selected(&mut self, id: ChipId) -> Result<(), StoreError> {
        if !self.chips.contains_key(&id) {
            return Err(StoreError::UnknownChip(id));
        }
        for chip in self.chips.values_mut() {
            chip.selected = chip.id == id;
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        for chip in self.chips.values_mut() {
            chip.selected = false;
        }
    }

    pub(crate) fn set_visible(&mut self, id: ChipId, visible: bool) -> Result<(), StoreError> {
        let chip = self.chips.get_mut(&id).ok_or(StoreError::UnknownChip(id))?;
        chip.visible = visible;
        Ok(())
    }

    /// Shift every annotation through an edit that replaced `removed`
    /// characters at `at` with `inserted` characters.
    ///
    /// Chips whose range collapses are dropped and returned. A summary whose
    /// range collapses is dropped together with its folded chips.
    pub fn apply_edit(&mut self, at: usize, removed: usize, inserted: usize) -> Vec<ChipAnnotation> {
        if removed == 0 && inserted == 0 {
            return Vec::new();
        }

        let mut dropped = Vec::new();
        let ids: Vec<ChipId> = self.chips.keys().copied().collect();
        for id in ids {
            let Some(chip) = self.chips.get_mut(&id) else {
                continue;
            };
            let shifted = chip.range.shift(at, removed, inserted);
            if shifted.is_empty() {
                if let Some(chip) = self.chips.remove(&id) {
                    debug!("Edit at {} removed {} ({})", at, id, chip.entry.address());
                    dropped.push(chip);
                }
            } else {
                chip.range = shifted;
            }
        }
        dropped.sort_by_key(|chip| chip.range.start);

        self.by_start = self
            .chips
            .values()
            .map(|chip| (chip.range.start, chip.id))
            .collect();

        if let Some(summary) = self.overflow.as_mut() {
            let shifted = summary.range.shift(at, removed, inserted);
            if shifted.is_empty() {
                debug!("Edit at {} removed the overflow summary", at);
                self.overflow = None;
            } else {
                summary.range = shifted;
            }
        }

        dropped
    }

    pub fn overflow(&self) -> Option<&OverflowSummary> {
        self.overflow.as_ref()
    }

    /// Install the summary annotation. Only one may exist at a time.
    pub fn set_overflow(&mut self, summary: OverflowSummary) -> Result<(), StoreError> {
        let range = summary.range;
        let blocked = self.overflow.is_some()
            || range.is_empty()
            || self.list().iter().any(|chip| chip.range.overlaps(&range));
        if blocked {
            return Err(StoreError::Overlap {
                start: range.start,
                end: range.end,
            });
        }
        self.overflow = Some(summary);
        Ok(())
    }

    pub fn take_overflow(&mut self) -> Option<OverflowSummary> {
        self.overflow.take()
    }

    /// Drop every chip and the summary.
    pub fn clear(&mut self) -> Vec<ChipAnnotation> {
        self.by_start.clear();
        self.overflow = None;
        let mut removed: Vec<ChipAnnotation> = self.chips.drain().map(|(_, chip)| chip).collect();
        removed.sort_by_key(|chip| chip.range.start);
        removed
    }

    pub fn check_invariants(&self) -> Result<(), StoreError> {
        let chips = self.list();
        if chips.len() != self.chips.len() {
            return Err(StoreError::Corrupted("index out of step with arena"));
        }
        for chip in &chips {
            if chip.range.is_empty() {
                return Err(StoreError::InvalidRange {
                    start: chip.range.start,
                    end: chip.range.end,
                });
            }
        }
        for pair in chips.windows(2) {
            if pair[0].range.end > pair[1].range.start {
                return Err(StoreError::Overlap {
                    start: pair[1].range.start,
                    end: pair[1].range.end,
                });
            }
        }
        if let Some(summary) = &self.overflow {
            if let Some(chip) = chips.iter().find(|chip| chip.range.overlaps(&summary.range)) {
                return Err(StoreError::Overlap {
                    start: chip.range.start,
                    end: chip.range.end,
                });
            }
        }
        let selected = chips.iter().filter(|chip| chip.selected).count();
        if selected > 1 {
            return Err(StoreError::Corrupted("more than one chip selected"));
        }
        Ok(())
    }
}
