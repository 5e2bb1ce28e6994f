//! Commit engine: deciding when raw text becomes a chip.

use tracing::{debug, info};

use super::RecipientField;
use crate::adapters::rfc822;
use crate::error::{ChipResult, SoftCondition};
use crate::events::ChangeReason;
use crate::models::{AddressToken, ChipAnnotation, ChipId, ContactId, RecipientEntry, TextRange};

/// Characters that finish a token.
pub(super) fn is_commit_char(c: char) -> bool {
    c == ',' || c == ';'
}

/// True when `text` holds a non-empty token followed by a separator.
fn holds_terminated_token(text: &str) -> bool {
    let mut parts: Vec<&str> = text.split(is_commit_char).collect();
    parts.pop();
    parts.iter().any(|part| !part.trim().is_empty())
}

impl RecipientField {
    /// Commit the text before the cursor as if the user had typed a
    /// separator. Returns true when the text was turned into a chip.
    pub fn commit_pending_text(&mut self) -> ChipResult<bool> {
        let committed = self.commit_default()?;
        self.flush_changes();
        Ok(committed)
    }

    /// Replace the token before the cursor with a chip for `entry`, bypassing
    /// tokenization.
    pub fn submit_suggestion(&mut self, entry: RecipientEntry) -> ChipResult<Option<ChipId>> {
        let id = self.submit_entry(entry)?;
        self.flush_changes();
        Ok(id)
    }

    pub(super) fn submit_entry(&mut self, entry: RecipientEntry) -> ChipResult<Option<ChipId>> {
        let entry = self.create_validated_entry(entry);
        let end = self.cursor;
        let start = self.token_start(end);
        let id = self.replace_with_chip(start, end, entry)?;
        self.suggestions.clear();
        self.sanitize_between();
        Ok(id)
    }

    pub(super) fn commit_by_character(&mut self) -> ChipResult<()> {
        let end = self.cursor;
        let start = self.token_start(end);
        if self.should_create_chip(start, end) {
            self.commit_chip(start, end)?;
        }
        self.cursor = self.buffer.len();
        Ok(())
    }

    /// Chip every terminated token inside `[start, end)`, left to right.
    ///
    /// Leaves the cursor at the end of what remains of the range.
    pub(super) fn commit_inserted_tokens(&mut self, start: usize, end: usize) -> ChipResult<()> {
        let mut scan = start;
        let mut end = end.min(self.buffer.len());
        while scan < end {
            let separator = self.token_end(scan);
            if separator >= end || !self.buffer.char_at(separator).is_some_and(is_commit_char) {
                break;
            }
            let mut cursor = separator + 1;
            if cursor < end && self.buffer.char_at(cursor) == Some(' ') {
                cursor += 1;
            }

            // commits only rewrite text before the cursor
            let tail = self.buffer.len() - cursor;
            let end_tail = self.buffer.len() - end;
            self.cursor = cursor;
            let token_start = self.token_start(cursor);
            if self.should_create_chip(token_start, cursor) {
                self.commit_chip(token_start, cursor)?;
            }
            scan = self.buffer.len() - tail;
            end = self.buffer.len() - end_tail;
        }
        self.cursor = end;
        Ok(())
    }

    /// Commit when the cursor sits at the natural end of its token, otherwise
    /// re-commit the whole token as one unit.
    pub(super) fn commit_default(&mut self) -> ChipResult<bool> {
        let end = self.cursor;
        let start = self.token_start(end);
        if !self.should_create_chip(start, end) {
            return Ok(false);
        }

        let token_end = self.move_past_terminators(self.token_end(start));
        if token_end != self.cursor {
            self.handle_edit(start, token_end)?;
            return Ok(true);
        }
        self.commit_chip(start, end)
    }

    pub(super) fn should_create_chip(&self, start: usize, end: usize) -> bool {
        !self.config.no_chips
            && self.focused
            && end.saturating_sub(start) >= self.config.filter_threshold
            && !self.already_has_chip(start, end)
    }

    pub(super) fn already_has_chip(&self, start: usize, end: usize) -> bool {
        self.config.no_chips || !self.store.spans(start, end).is_empty()
    }

    pub(super) fn move_past_terminators(&self, token_end: usize) -> usize {
        let mut end = token_end;
        if end >= self.buffer.len() {
            return end;
        }
        if self.buffer.char_at(end).is_some_and(is_commit_char) {
            end += 1;
        }
        if self.buffer.char_at(end) == Some(' ') {
            end += 1;
        }
        end
    }

    pub(super) fn commit_chip(&mut self, start: usize, end: usize) -> ChipResult<bool> {
        let enough_to_filter = end.saturating_sub(start) >= self.config.filter_threshold;
        if !self.suggestions.is_empty() && enough_to_filter && end == self.cursor {
            let entry = self.suggestions[0].clone();
            self.submit_entry(entry)?;
            return Ok(true);
        }

        let mut token_end = self.token_end(start);
        if self.buffer.char_at(token_end + 1).is_some_and(is_commit_char) {
            token_end += 1;
        }
        let text = self.buffer.slice(start, token_end);
        let token = text.trim();
        if token.is_empty() {
            return Ok(false);
        }

        let entry = self.create_tokenized_entry(token);
        self.replace_with_chip(start, end, entry)?;
        if end == self.cursor {
            self.suggestions.clear();
        }
        self.sanitize_between();
        self.stats.commits += 1;
        info!("Committed token at [{}, {})", start, end);
        Ok(true)
    }

    /// The cursor is in the middle of a token: chip the whole token.
    pub(super) fn handle_edit(&mut self, start: usize, end: usize) -> ChipResult<()> {
        self.cursor = end.min(self.buffer.len());
        let text = self.buffer.slice(start, end);
        if !text.is_empty() {
            let entry = RecipientEntry::fake(&text, self.is_valid(&text));
            let cursor = self.cursor;
            self.replace_with_chip(start, cursor, entry)?;
            self.stats.edit_commits += 1;
            debug!("Re-committed edited token at [{}, {})", start, end);
        }
        self.suggestions.clear();
        Ok(())
    }

    /// Turn a typed token into an entry without ever dropping the text.
    pub(super) fn create_tokenized_entry(&mut self, token: &str) -> RecipientEntry {
        let tokens = self.tokenizer.tokenize(token);
        let mut is_valid = self.is_valid(token);

        if is_valid {
            if let Some(first) = tokens.first() {
                if let Some(name) = first.name() {
                    return RecipientEntry::generated(name, &first.address, true);
                }
                if !first.address.is_empty() {
                    return RecipientEntry::fake(&first.address, true);
                }
            }
        }

        let mut validated = None;
        if let Some(validator) = self.validator.as_ref().filter(|_| !is_valid) {
            let fixed = validator.fix_text(token);
            if !fixed.is_empty() {
                if fixed.contains(token) {
                    let address = self
                        .tokenizer
                        .tokenize(&fixed)
                        .into_iter()
                        .next()
                        .map(|first| first.address)
                        .filter(|address| !address.is_empty());
                    if let Some(address) = address {
                        validated = Some(address);
                        is_valid = true;
                    }
                } else {
                    is_valid = false;
                }
            }
        }

        if !is_valid {
            debug!("Keeping unvalidated token {:?} as an editable chip", token);
            self.record(SoftCondition::AmbiguousToken);
        }
        RecipientEntry::fake(validated.as_deref().unwrap_or(token), is_valid)
    }

    /// Normalize entries that did not come from typed text.
    pub(super) fn create_validated_entry(&self, item: RecipientEntry) -> RecipientEntry {
        match item.contact_id() {
            ContactId::Generated => RecipientEntry::generated(
                item.display_name().unwrap_or_default(),
                item.address(),
                item.is_valid(),
            ),
            ContactId::Invalid if !item.has_distinct_name() || !self.is_valid(item.address()) => {
                RecipientEntry::fake(item.address(), item.is_valid())
            }
            _ => item,
        }
    }

    /// Text written into the buffer for a chip: the RFC 822 form of the
    /// entry, terminated by the tokenizer's separator.
    pub(super) fn create_address_text(&self, entry: &RecipientEntry) -> String {
        let name = entry.display_name().filter(|_| entry.has_distinct_name());
        let address = rfc822::first_address(entry.address()).unwrap_or_else(|| entry.address().to_string());
        let token = AddressToken::new(name, &address).to_string();
        let trimmed = token.trim();

        match trimmed.find(',') {
            _ if trimmed.is_empty() => String::new(),
            Some(index) if index + 1 >= trimmed.len() => trimmed.to_string(),
            _ => self.tokenizer.terminate_token(trimmed),
        }
    }

    /// Replace `[start, end)` with the chip text for `entry` and anchor a new
    /// chip over everything but the trailing space.
    pub(super) fn replace_with_chip(
        &mut self,
        start: usize,
        end: usize,
        entry: RecipientEntry,
    ) -> ChipResult<Option<ChipId>> {
        self.ensure_chip_resources()?;
        let display = self.create_address_text(&entry);
        if display.is_empty() {
            return Ok(None);
        }

        let start = start.min(self.buffer.len());
        self.replace_text(start, end, &display);
        if self.config.no_chips {
            return Ok(None);
        }

        let chip_len = display.chars().count() - 1;
        if chip_len == 0 {
            return Ok(None);
        }
        let id = self.store.allocate_id();
        let mut chip = ChipAnnotation::new(id, TextRange::new(start, start + chip_len), entry);
        chip.set_original_text(&display);
        self.store.insert(chip)?;
        self.mark_changed(ChangeReason::Added);
        Ok(Some(id))
    }

    /// Delete stray text between the last two chips.
    pub(super) fn sanitize_between(&mut self) {
        if !self.pending_chips.is_empty() {
            return;
        }
        let chips = self.store.list();
        let Some(last) = chips.last() else {
            return;
        };
        let end = last.range().start;
        let mut start_looking = 0;
        if chips.len() > 1 {
            start_looking = chips[chips.len() - 2].range().end;
            if start_looking >= self.buffer.len() {
                return;
            }
            if self.buffer.char_at(start_looking) == Some(' ') {
                start_looking += 1;
            }
        }
        if start_looking < end {
            let stray = self.buffer.slice(start_looking, end);
            if holds_terminated_token(&stray) {
                debug!("Keeping unchipped tokens at [{}, {})", start_looking, end);
                return;
            }
            debug!("Removing stray text at [{}, {})", start_looking, end);
            self.replace_text(start_looking, end, "");
        }
    }

    /// Delete everything after the last chip, or after the summary.
    pub(super) fn sanitize_end(&mut self) {
        if !self.pending_chips.is_empty() {
            return;
        }
        let Some(last) = self.store.last() else {
            return;
        };
        let end = self
            .store
            .overflow()
            .map_or(last.range().end, |summary| summary.range().end);
        let len = self.buffer.len();
        if len > end + 1 {
            debug!("Removing {} characters after the last chip", len - end - 1);
            self.replace_text(end + 1, len, "");
        }
    }
}
