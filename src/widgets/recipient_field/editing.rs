//! Edit entry points and the text-changed hooks.
//!
//! Typing, deleting and programmatic replacement all go through
//! [`RecipientField::edit`], so the commit decision exists exactly once.

use tracing::{debug, info};

use super::commit::is_commit_char;
use super::RecipientField;
use crate::error::ChipResult;
use crate::events::ChangeReason;

impl RecipientField {
    /// Type `text` at the cursor.
    pub fn insert_text(&mut self, text: &str) -> ChipResult<()> {
        let mut text = text;
        // The separator after a chip already carries its space.
        if text.starts_with(' ') && self.follows_chip_separator() {
            text = &text[1..];
        }
        if text.is_empty() {
            return Ok(());
        }
        let cursor = self.cursor;
        self.edit(cursor, cursor, text)
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) -> ChipResult<()> {
        if self.cursor == 0 {
            return Ok(());
        }
        let cursor = self.cursor;
        self.edit(cursor - 1, cursor, "")
    }

    pub fn delete_range(&mut self, start: usize, end: usize) -> ChipResult<()> {
        self.edit(start, end, "")
    }

    pub fn replace_range(&mut self, start: usize, end: usize, text: &str) -> ChipResult<()> {
        self.edit(start, end, text)
    }

    /// Replace the whole text.
    pub fn set_text(&mut self, text: &str) -> ChipResult<()> {
        let len = self.buffer.len();
        self.edit(0, len, text)
    }

    pub fn clear(&mut self) -> ChipResult<()> {
        self.set_text("")
    }

    fn follows_chip_separator(&self) -> bool {
        let Some(before) = self.cursor.checked_sub(1) else {
            return false;
        };
        self.buffer.char_at(before) == Some(' ')
            && self.store.last().is_some_and(|chip| chip.range().end == before)
    }

    /// Apply one edit and run the commit engine over it.
    pub(super) fn edit(&mut self, start: usize, end: usize, text: &str) -> ChipResult<()> {
        let len = self.buffer.len();
        let start = start.min(len);
        let end = end.clamp(start, len);
        let inserted = text.chars().count();

        let removed = self.replace_text(start, end, text);
        self.cursor = start + inserted;

        if !self.on_text_changed(removed, inserted)? {
            self.after_text_changed(start, start + inserted)?;
        }
        self.flush_changes();
        Ok(())
    }

    /// Returns true when the edit was fully handled here.
    fn on_text_changed(&mut self, removed: usize, inserted: usize) -> ChipResult<bool> {
        if removed == inserted + 1 {
            let cursor = self.cursor;
            let Some(chip) = self.store.spans(cursor, cursor).first().map(|chip| chip.id()) else {
                return Ok(false);
            };
            // Deleting the space after a chip deletes the chip.
            let token_start = self.token_start(cursor);
            let token_end = (self.token_end(token_start) + 1).min(self.buffer.len());
            self.replace_text(token_start, token_end, "");
            if self.store.contains(chip) {
                self.store.remove(chip)?;
                self.drop_chip_state(chip);
                self.mark_changed(ChangeReason::Removed);
            }
            self.stats.separator_deletions += 1;
            info!("Deleted {} through its separator", chip);
        } else if inserted > removed && self.editing_chip.is_some() && self.last_char_is_commit_char() {
            debug!("Committing edited chip text");
            self.editing_chip = None;
            self.commit_by_character()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// `[start, end)` is the text the edit inserted.
    fn after_text_changed(&mut self, start: usize, end: usize) -> ChipResult<()> {
        if self.buffer.is_empty() {
            let had_chips = !self.store.is_empty() || self.store.overflow().is_some();
            self.store.clear();
            self.temporary.clear();
            self.deferred.clear();
            self.alternates.clear();
            self.editing_chip = None;
            if had_chips || self.pending_change.is_some() {
                self.mark_changed(ChangeReason::Cleared);
            }
            return Ok(());
        }

        if self.chips_pending() {
            return Ok(());
        }

        if self.store.selected().is_some() {
            self.cursor = self.buffer.len();
            self.store.clear_selection();
        } else if self.editing_chip.is_some() {
            return Ok(());
        }

        if end > start + 1 && self.buffer.slice(start, end).contains(is_commit_char) {
            self.commit_inserted_tokens(start, end)?;
        }

        if self.buffer.len() > 1 {
            if self.last_char_is_commit_char() {
                return self.commit_by_character();
            }
            if self.char_before_cursor() == Some(' ') {
                let start = self.token_start(self.cursor);
                let token = self.buffer.slice(start, self.token_end(start));
                let valid = self
                    .validator
                    .as_ref()
                    .is_some_and(|validator| validator.is_valid(&token));
                if !token.is_empty() && valid {
                    self.commit_by_character()?;
                }
            }
        }
        Ok(())
    }

    /// Pending paste work or a collapsed summary blocks the commit engine.
    fn chips_pending(&self) -> bool {
        !self.pending_chips.is_empty()
            || self
                .store
                .overflow()
                .is_some_and(|summary| !summary.removed_chips().is_empty())
    }

    fn char_before_cursor(&self) -> Option<char> {
        self.buffer.char_at(self.cursor.saturating_sub(1))
    }

    fn last_char_is_commit_char(&self) -> bool {
        self.char_before_cursor().is_some_and(is_commit_char)
    }
}
