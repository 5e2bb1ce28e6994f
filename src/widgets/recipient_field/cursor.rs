//! Cursor placement and chip selection.

use tracing::debug;

use super::RecipientField;
use crate::error::{ChipResult, StoreError};
use crate::events::ChangeReason;
use crate::models::{ChipId, RecipientEntry};

impl RecipientField {
    /// Move the cursor. Positions inside the chip area snap to just after the
    /// last chip's separator.
    pub fn set_cursor(&mut self, offset: usize) {
        let len = self.buffer.len();
        let mut offset = offset.min(len);
        if let Some(last) = self.store.last() {
            let last_end = last.range().end;
            if offset < last_end {
                offset = (last_end + 1).min(len);
            }
        }
        self.cursor = offset;
    }

    /// The chip drawn at `offset`, if any.
    pub fn chip_at(&self, offset: usize) -> Option<ChipId> {
        self.store.at(offset).first().map(|chip| chip.id())
    }

    /// Select a chip.
    ///
    /// A resolved chip is highlighted in place. A provisional chip is turned
    /// back into editable text at the end of the field; typing a separator
    /// or committing turns it into a chip again.
    pub fn select_chip(&mut self, id: ChipId) -> ChipResult<()> {
        let chip = self.store.get(id).ok_or(StoreError::UnknownChip(id))?;

        if chip.is_provisional() {
            let range = chip.range();
            let address = chip.entry().address().to_string();
            self.store.remove(id)?;
            self.drop_chip_state(id);

            let mut end = range.end;
            if self.buffer.char_at(end) == Some(' ') {
                end += 1;
            }
            self.replace_text(range.start, end, "");
            let len = self.buffer.len();
            self.replace_text(len, len, &address);

            let is_valid = self.is_valid(&address);
            self.editing_chip = Some(RecipientEntry::fake(&address, is_valid));
            self.mark_changed(ChangeReason::Removed);
            debug!("Editing provisional {} as text", id);
        } else {
            self.store.set_selected(id)?;
        }

        self.cursor = self.buffer.len();
        self.flush_changes();
        Ok(())
    }

    pub fn selected_chip(&self) -> Option<ChipId> {
        self.store.selected().map(|chip| chip.id())
    }

    /// Drop the current selection. A chip that was being edited as text is
    /// committed again from the end of the field.
    pub fn clear_selected_chip(&mut self) -> ChipResult<()> {
        if self.store.selected().is_some() {
            self.store.clear_selection();
        } else if self.editing_chip.take().is_some() {
            self.cursor = self.buffer.len();
            self.commit_default()?;
        }
        self.cursor = self.buffer.len();
        self.flush_changes();
        Ok(())
    }

    /// Delete a chip together with its separating space.
    pub fn remove_chip(&mut self, id: ChipId) -> ChipResult<()> {
        let chip = self.store.remove(id)?;
        let range = chip.range();
        let mut end = range.end;
        if self.buffer.char_at(end) == Some(' ') {
            end += 1;
        }
        self.replace_text(range.start, end, "");
        self.drop_chip_state(id);
        self.mark_changed(ChangeReason::Removed);
        self.flush_changes();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{test_field, type_text};
    use super::*;
    use crate::models::TextRange;

    fn resolved_field() -> (RecipientField, ChipId) {
        let mut field = test_field();
        field.insert_text("bo").unwrap();
        let bob = RecipientEntry::resolved(Some("Bob"), "bob@example.com", 42, true);
        let id = field.submit_suggestion(bob).unwrap().unwrap();
        (field, id)
    }

    #[test]
    fn test_set_cursor_snaps_past_last_chip() {
        let mut field = test_field();
        type_text(&mut field, "alice@example.com, bo");
        field.set_cursor(3);
        assert_eq!(field.cursor(), 21);
        field.set_cursor(22);
        assert_eq!(field.cursor(), 22);
        field.set_cursor(100);
        assert_eq!(field.cursor(), field.text().chars().count());
    }

    #[test]
    fn test_select_resolved_chip_highlights_it() {
        let (mut field, id) = resolved_field();
        field.select_chip(id).unwrap();
        assert_eq!(field.selected_chip(), Some(id));

        field.clear_selected_chip().unwrap();
        assert_eq!(field.selected_chip(), None);
        assert_eq!(field.chips().len(), 1);
    }

    #[test]
    fn test_typing_clears_resolved_selection() {
        let (mut field, id) = resolved_field();
        field.select_chip(id).unwrap();
        field.insert_text("x").unwrap();
        assert_eq!(field.selected_chip(), None);
    }

    #[test]
    fn test_select_provisional_chip_edits_text() {
        let mut field = test_field();
        type_text(&mut field, "alice@example.com, carol@example.com,");
        let carol = field.chips()[1].id();

        field.select_chip(carol).unwrap();
        assert_eq!(field.chips().len(), 1);
        assert_eq!(field.text(), "<alice@example.com>, carol@example.com");
        assert!(field.editing_entry().is_some());

        type_text(&mut field, ",");
        assert!(field.editing_entry().is_none());
        assert_eq!(field.chips().len(), 2);
        assert_eq!(field.chips()[1].entry().address(), "carol@example.com");
    }

    #[test]
    fn test_clear_selection_recommits_edited_text() {
        let mut field = test_field();
        type_text(&mut field, "alice@example.com,");
        let alice = field.chips()[0].id();

        field.select_chip(alice).unwrap();
        assert!(field.chips().is_empty());
        field.clear_selected_chip().unwrap();

        assert_eq!(field.chips().len(), 1);
        assert_eq!(field.text(), "<alice@example.com>, ");
    }

    #[test]
    fn test_remove_chip_deletes_text_and_space() {
        let mut field = test_field();
        type_text(&mut field, "alice@example.com, bob@example.com,");
        let alice = field.chips()[0].id();

        field.remove_chip(alice).unwrap();
        assert_eq!(field.text(), "<bob@example.com>, ");
        assert_eq!(field.chips()[0].range(), TextRange::new(0, 18));
        assert!(field.remove_chip(alice).is_err());
    }
}
