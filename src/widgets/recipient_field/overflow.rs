//! Focus and size handling: collapsing overflowing chips into the "+N more"
//! summary, expanding them back, and chip-ifying bulk pastes once the field
//! has a width.

use tracing::{debug, info, warn};

use super::commit::is_commit_char;
use super::RecipientField;
use crate::error::{ChipResult, SoftCondition};
use crate::events::ChangeReason;
use crate::models::{ChipAnnotation, ChipId, OverflowSummary, TextRange};

impl RecipientField {
    /// Focus gained expands the field, focus lost collapses it.
    pub fn on_focus_changed(&mut self, focused: bool) -> ChipResult<()> {
        self.focused = focused;
        if focused {
            self.expand();
        } else {
            self.shrink()?;
        }
        self.flush_changes();
        Ok(())
    }

    /// The field was laid out with a new size.
    pub fn on_size_changed(&mut self, width: u32, height: u32) -> ChipResult<()> {
        self.width = width;
        self.height = height;
        if width != 0 && height != 0 && !self.pending_chips.is_empty() {
            self.handle_pending_chips()?;
        }
        if self.shrink_deferred && width > 0 {
            self.shrink_deferred = false;
            if !self.focused {
                debug!("Running shrink deferred until the field was sized");
                self.shrink()?;
            }
        }
        self.flush_changes();
        Ok(())
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn shrink(&mut self) -> ChipResult<()> {
        let selected_resolved = self.store.selected().is_some_and(|chip| !chip.is_provisional());
        if selected_resolved {
            self.store.clear_selection();
        } else {
            if self.width == 0 {
                self.shrink_deferred = true;
                return Ok(());
            }
            if !self.pending_chips.is_empty() {
                self.handle_pending_chips()?;
            } else {
                let end = self.cursor;
                let start = self.token_start(end);
                if self.store.spans(start, end).is_empty() {
                    let mut token_end = self.token_end(start);
                    if self.buffer.char_at(token_end) == Some(',') {
                        token_end = self.move_past_terminators(token_end);
                    }
                    if token_end != self.cursor {
                        self.handle_edit(start, token_end)?;
                    } else {
                        self.commit_chip(start, end)?;
                    }
                }
                self.editing_chip = None;
            }
        }
        self.create_more_chip()
    }

    /// Restore folded chips and look up every chip that is still
    /// provisional.
    fn expand(&mut self) {
        self.remove_more_chip();
        self.cursor = self.buffer.len();
        let provisional = self.store.list().iter().any(|chip| chip.is_provisional());
        if provisional || !self.temporary.is_empty() {
            self.start_batch_resolution();
        }
        self.temporary.clear();
    }

    /// Fold every chip past the limit into the summary.
    pub(super) fn create_more_chip(&mut self) -> ChipResult<()> {
        if self.config.no_chips {
            return self.create_more_chip_plain_text();
        }
        if !self.config.should_shrink {
            return Ok(());
        }
        if self.store.overflow().is_some() {
            self.remove_more_chip();
        }

        let ids = self.store.ids();
        let limit = self.config.chip_limit;
        if ids.len() <= limit {
            return Ok(());
        }

        let mut removed: Vec<ChipAnnotation> = Vec::with_capacity(ids.len() - limit);
        for id in &ids[limit..] {
            let mut chip = self.store.remove(*id)?;
            chip.selected = false;
            if !self.temporary.contains(id) {
                let text = self.buffer.slice(chip.range.start, chip.range.end);
                chip.set_original_text(&text);
            }
            removed.push(chip);
        }

        let replace_start = removed.first().map_or(0, |chip| chip.range.start);
        let replace_end = removed
            .last()
            .map_or(0, |chip| chip.range.end)
            .max(self.buffer.len());
        let count = removed.len();
        let summary = OverflowSummary {
            range: TextRange::new(replace_start.min(replace_end), replace_start.max(replace_end)),
            count,
            label: self.config.more_label(count),
            removed,
        };
        self.store.set_overflow(summary)?;
        self.stats.collapses += 1;
        self.mark_changed(ChangeReason::Collapsed);
        info!("Collapsed {} chips into the summary", count);
        Ok(())
    }

    fn create_more_chip_plain_text(&mut self) -> ChipResult<()> {
        if self.store.overflow().is_some() {
            self.remove_more_chip();
        }

        let limit = self.config.chip_limit;
        let mut end = 0;
        for _ in 0..limit {
            end = self.move_past_terminators(self.token_end(end));
        }
        let tokens = self.count_tokens();
        let len = self.buffer.len();
        if tokens <= limit || end >= len {
            return Ok(());
        }

        let count = tokens - limit;
        self.store.set_overflow(OverflowSummary {
            range: TextRange::new(end, len),
            count,
            label: self.config.more_label(count),
            removed: Vec::new(),
        })?;
        self.stats.collapses += 1;
        self.mark_changed(ChangeReason::Collapsed);
        info!("Collapsed {} plain-text addresses into the summary", count);
        Ok(())
    }

    fn count_tokens(&self) -> usize {
        let len = self.buffer.len();
        let mut count = 0;
        let mut start = 0;
        while start < len {
            let next = self.move_past_terminators(self.token_end(start));
            count += 1;
            if next <= start {
                break;
            }
            start = next;
        }
        count
    }

    /// Restore the folded chips.
    ///
    /// Each chip's text is searched for from the end of the previously
    /// restored chip onwards, never earlier. A chip whose text cannot be
    /// found is dropped.
    pub(super) fn remove_more_chip(&mut self) {
        let Some(summary) = self.store.take_overflow() else {
            return;
        };

        let mut search_from = self.store.last().map_or(0, |chip| chip.range.end);
        let mut restored = 0;
        for mut chip in summary.removed {
            let token = chip.original_text().to_string();
            let Some(start) = self.buffer.find_from(&token, search_from) else {
                debug!("Could not find {:?} again, dropping {}", token, chip.id);
                self.forget_chip(chip.id);
                continue;
            };

            let mut end = (start + token.chars().count()).min(self.buffer.len());
            // pasted chips keep their token without the separator
            if self.buffer.char_at(end).is_some_and(is_commit_char) {
                end += 1;
            }
            chip.range = TextRange::new(start, end);
            chip.selected = false;
            let id = chip.id;
            match self.store.insert(chip) {
                Ok(_) => {
                    search_from = end;
                    restored += 1;
                }
                Err(err) => {
                    warn!("Could not restore {}: {}", id, err);
                    self.forget_chip(id);
                }
            }
        }

        self.stats.expands += 1;
        self.mark_changed(ChangeReason::Expanded);
        info!("Expanded summary, restored {} of {} chips", restored, summary.count);

        let deferred: Vec<_> = self.deferred.drain().collect();
        for (id, entry) in deferred {
            if let Err(err) = self.apply_resolution(id, entry) {
                warn!("Deferred resolution for {} failed: {}", id, err);
            }
        }
    }

    fn forget_chip(&mut self, id: ChipId) {
        self.record(SoftCondition::OverflowRestoreMiss);
        self.drop_chip_state(id);
    }

    /// Queue addresses to be chip-ified once the field has a width.
    ///
    /// Every token of `text` is appended as raw terminated text. Nothing is
    /// committed through the commit engine; the tokens become provisional
    /// chips in one pass.
    pub fn paste_recipients(&mut self, text: &str) -> ChipResult<()> {
        let chars: Vec<char> = text.chars().collect();
        let mut start = 0;
        while start < chars.len() {
            let end = self.tokenizer.find_token_end(text, start).max(start);
            let raw: String = chars[start..end.min(chars.len())].iter().collect();
            let raw = raw.trim();
            if !raw.is_empty() {
                let terminated = self.tokenizer.terminate_token(raw);
                let len = self.buffer.len();
                self.replace_text(len, len, &terminated);
                self.pending_chips.push(terminated);
            }
            start = end + 1;
        }
        self.cursor = self.buffer.len();

        if self.width > 0 {
            self.handle_pending_chips()?;
        }
        self.flush_changes();
        Ok(())
    }

    pub(super) fn handle_pending_chips(&mut self) -> ChipResult<()> {
        if self.width == 0 || self.pending_chips.is_empty() {
            return Ok(());
        }

        let limit = self.config.chip_limit;
        if self.pending_chips.len() <= self.config.max_chips_parsed {
            self.ensure_chip_resources()?;
            let pending = std::mem::take(&mut self.pending_chips);
            let mut search_from = 0;
            for (index, current) in pending.iter().enumerate() {
                let Some(token_start) = self.buffer.find_from(current, search_from) else {
                    continue;
                };
                // Leave the trailing space between tokens.
                let mut token_end = token_start + current.chars().count() - 1;
                if token_end + 2 < self.buffer.len() && self.buffer.char_at(token_end) == Some(',') {
                    token_end += 1;
                }
                let visible = index < limit || !self.config.should_shrink;
                self.create_replacement_chip(token_start, token_end, visible)?;
                search_from = token_end;
            }
            self.sanitize_end();
        } else {
            warn!(
                "{} pending recipients exceed the parse limit, falling back to plain text",
                self.pending_chips.len()
            );
            self.pending_chips.clear();
            self.config.no_chips = true;
        }

        let temporary = self.temporary.len();
        if temporary > 0 && temporary <= self.config.max_lookups {
            if self.focused || temporary < limit {
                self.start_batch_resolution();
                self.temporary.clear();
            } else {
                let head: Vec<ChipId> = self.temporary.drain(..limit.min(temporary)).collect();
                self.start_individual_resolution(&head);
                self.create_more_chip()?;
            }
        } else {
            if temporary > 0 {
                debug!("{} pending recipients exceed the lookup limit, skipping lookups", temporary);
            }
            self.temporary.clear();
            if self.focused {
                self.show_hidden_chips();
            } else {
                self.create_more_chip()?;
            }
        }
        Ok(())
    }

    /// Make chips hidden during a paste visible again.
    pub(super) fn show_hidden_chips(&mut self) {
        for id in self.store.ids() {
            if self.store.get(id).is_some_and(|chip| !chip.is_visible()) {
                let _ = self.store.set_visible(id, true);
            }
        }
    }

    fn create_replacement_chip(&mut self, start: usize, end: usize, visible: bool) -> ChipResult<()> {
        if start >= end || self.already_has_chip(start, end) {
            return Ok(());
        }
        let raw = self.buffer.slice(start, end);
        let trimmed = raw.trim();
        let token = trimmed.strip_suffix(',').unwrap_or(trimmed).to_string();
        if token.is_empty() {
            return Ok(());
        }

        let entry = self.create_tokenized_entry(&token);
        let id = self.store.allocate_id();
        let mut chip = ChipAnnotation::new(id, TextRange::new(start, end), entry);
        if !visible {
            chip = chip.hidden();
        }
        chip.set_original_text(&token);
        self.store.insert(chip)?;
        self.temporary.push(id);
        self.mark_changed(ChangeReason::Added);
        Ok(())
    }
}
