//! Recipient field: chips layered over a delimited address text.
//!
//! [`RecipientField`] owns the text buffer and the annotation store and is
//! the single owning thread for both. Every text change, whether typed,
//! pasted or programmatic, goes through one edit path that runs the commit
//! engine. Background resolution results arrive as messages and are applied
//! by [`RecipientField::process_messages`] or [`RecipientField::settle`].
//!
//! The implementation is split by concern:
//! - `editing` - edit entry points and the text-changed hooks
//! - `commit` - token to chip conversion
//! - `cursor` - cursor clamping and chip selection
//! - `overflow` - focus/size handling, collapse and expand, bulk paste
//! - `resolution` - applying directory results in place
//! - `paint` - the render path

mod commit;
mod cursor;
mod editing;
mod overflow;
mod paint;
mod resolution;

pub use paint::{Painted, PaintedChip};

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::config::FieldConfig;
use crate::error::{ChipResult, ConfigurationError, SoftCondition};
use crate::events::{ChangeReason, ChipEvent};
use crate::models::{ChipAnnotation, ChipId, OverflowSummary, RecipientEntry};
use crate::resolution::{FieldMessage, ResolutionScheduler};
use crate::store::AnnotationStore;
use crate::text::TextBuffer;
use crate::traits::{ChipResources, DirectoryLookup, TextStorage, Tokenizer, Validator};

/// Counters for everything the field absorbs instead of reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldStats {
    /// Tokens turned into chips at their natural end
    pub commits: u64,
    /// Tokens re-committed as a whole after a mid-token edit
    pub edit_commits: u64,
    /// Chips deleted by deleting their separating space
    pub separator_deletions: u64,
    pub collapses: u64,
    pub expands: u64,
    /// Chips upgraded in place by a lookup or an alternate
    pub resolutions_applied: u64,
    pub ambiguous_tokens: u64,
    pub stale_resolutions: u64,
    pub restore_misses: u64,
    /// Messages from cancelled or superseded jobs
    pub dropped_messages: u64,
    pub lookup_failures: u64,
    /// Chips whose rendering exceeded the width budget
    pub oversized_chips: u64,
}

impl FieldStats {
    pub fn record(&mut self, condition: SoftCondition) {
        match condition {
            SoftCondition::AmbiguousToken => self.ambiguous_tokens += 1,
            SoftCondition::StaleResolution => self.stale_resolutions += 1,
            SoftCondition::OverflowRestoreMiss => self.restore_misses += 1,
        }
    }

    pub fn count(&self, condition: SoftCondition) -> u64 {
        match condition {
            SoftCondition::AmbiguousToken => self.ambiguous_tokens,
            SoftCondition::StaleResolution => self.stale_resolutions,
            SoftCondition::OverflowRestoreMiss => self.restore_misses,
        }
    }
}

/// A text field that converts typed addresses into chips.
///
/// # Example
///
/// ```ignore
/// use recipient_chips::prelude::*;
///
/// let mut field = RecipientField::new(Rfc822Tokenizer::new(), FieldConfig::default())?
///     .with_validator(EmailValidator::new())
///     .with_chip_resources(ChipResources::default());
/// field.on_focus_changed(true)?;
/// field.insert_text("alice@example.com,")?;
/// assert_eq!(field.chips().len(), 1);
/// ```
pub struct RecipientField {
    pub(super) buffer: TextBuffer,
    pub(super) store: AnnotationStore,
    pub(super) cursor: usize,
    pub(super) focused: bool,
    pub(super) width: u32,
    pub(super) height: u32,
    pub(super) config: FieldConfig,
    pub(super) tokenizer: Box<dyn Tokenizer>,
    pub(super) validator: Option<Box<dyn Validator>>,
    pub(super) resources: Option<ChipResources>,
    pub(super) scheduler: ResolutionScheduler,
    pub(super) message_rx: UnboundedReceiver<FieldMessage>,
    /// Raw pasted tokens waiting for the field to be sized
    pub(super) pending_chips: Vec<String>,
    /// Provisional chips created by a paste and not yet resolved
    pub(super) temporary: Vec<ChipId>,
    /// Resolutions for folded chips, applied after expand
    pub(super) deferred: HashMap<ChipId, RecipientEntry>,
    /// A provisional chip turned back into editable text by selection
    pub(super) editing_chip: Option<RecipientEntry>,
    pub(super) shrink_deferred: bool,
    pub(super) suggestions: Vec<RecipientEntry>,
    pub(super) alternates: HashMap<ChipId, Vec<RecipientEntry>>,
    pub(super) subscribers: Vec<UnboundedSender<ChipEvent>>,
    pub(super) pending_change: Option<ChangeReason>,
    pub(super) stats: FieldStats,
}

impl RecipientField {
    /// Create a field with the given tokenizer and configuration.
    pub fn new(tokenizer: impl Tokenizer + 'static, config: FieldConfig) -> ChipResult<Self> {
        config.validate()?;
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        let scheduler = ResolutionScheduler::new(message_tx, config.max_lookups);

        Ok(Self {
            buffer: TextBuffer::new(),
            store: AnnotationStore::new(),
            cursor: 0,
            focused: false,
            width: 0,
            height: 0,
            config,
            tokenizer: Box::new(tokenizer),
            validator: None,
            resources: None,
            scheduler,
            message_rx,
            pending_chips: Vec::new(),
            temporary: Vec::new(),
            deferred: HashMap::new(),
            editing_chip: None,
            shrink_deferred: false,
            suggestions: Vec::new(),
            alternates: HashMap::new(),
            subscribers: Vec::new(),
            pending_change: None,
            stats: FieldStats::default(),
        })
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn with_directory(mut self, directory: Arc<dyn DirectoryLookup>) -> Self {
        self.scheduler.set_directory(directory);
        self
    }

    pub fn with_chip_resources(mut self, resources: ChipResources) -> Self {
        self.resources = Some(resources);
        self
    }

    /// Edit caller-owned storage instead of an internal string. Existing
    /// storage content becomes the initial text, without chips.
    pub fn with_text_storage(mut self, storage: Box<dyn TextStorage>) -> Self {
        self.buffer = TextBuffer::with_storage(storage);
        self.cursor = self.buffer.len();
        self
    }

    pub fn set_chip_resources(&mut self, resources: ChipResources) {
        self.resources = Some(resources);
    }

    /// Apply a new configuration. Takes effect for the next operation.
    pub fn reconfigure(&mut self, config: FieldConfig) -> ChipResult<()> {
        config.validate()?;
        if config.no_chips && !self.config.no_chips {
            warn!("Switching recipient field to plain-text mode");
        }
        self.scheduler.set_max_lookups(config.max_lookups);
        self.config = config;
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn text(&self) -> &str {
        self.buffer.as_str()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn stats(&self) -> FieldStats {
        self.stats
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    /// Live chips ordered by position.
    pub fn chips(&self) -> Vec<&ChipAnnotation> {
        self.store.list()
    }

    pub fn overflow(&self) -> Option<&OverflowSummary> {
        self.store.overflow()
    }

    /// Every recipient in order: live chips first, then folded ones.
    pub fn recipients(&self) -> Vec<RecipientEntry> {
        let live = self.store.list().into_iter().map(|chip| chip.entry().clone());
        let folded = self
            .store
            .overflow()
            .into_iter()
            .flat_map(|summary| summary.removed_chips().iter().map(|chip| chip.entry().clone()));
        live.chain(folded).collect()
    }

    /// Alternates loaded for a chip by [`request_alternates`](Self::request_alternates).
    pub fn alternates_for(&self, chip: ChipId) -> Option<&[RecipientEntry]> {
        self.alternates.get(&chip).map(Vec::as_slice)
    }

    /// Text of the chip being edited after a provisional chip was selected.
    pub fn editing_entry(&self) -> Option<&RecipientEntry> {
        self.editing_chip.as_ref()
    }

    pub fn has_pending_chips(&self) -> bool {
        !self.pending_chips.is_empty()
    }

    /// Entries shown by the suggestion popup; the first one wins a commit.
    pub fn set_suggestions(&mut self, suggestions: Vec<RecipientEntry>) {
        self.suggestions = suggestions;
    }

    // =========================================================================
    // Change notification
    // =========================================================================

    /// Receive an event every time the ordered chip list changes.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ChipEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub(super) fn mark_changed(&mut self, reason: ChangeReason) {
        self.pending_change = Some(reason);
    }

    pub(super) fn emit(&mut self, event: ChipEvent) {
        self.subscribers.retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    /// Send at most one change event for the operation that just finished.
    pub(super) fn flush_changes(&mut self) {
        if let Some(reason) = self.pending_change.take() {
            debug!("Chip list changed: {:?}", reason);
            let entries = self.recipients();
            self.emit(ChipEvent::ChipsChanged { reason, entries });
        }
    }

    // =========================================================================
    // Shared helpers
    // =========================================================================

    pub(super) fn record(&mut self, condition: SoftCondition) {
        self.stats.record(condition);
    }

    pub(super) fn ensure_chip_resources(&self) -> ChipResult<()> {
        if self.config.no_chips || self.resources.is_some() {
            Ok(())
        } else {
            Err(ConfigurationError::MissingChipResources.into())
        }
    }

    pub(super) fn is_valid(&self, text: &str) -> bool {
        self.validator
            .as_ref()
            .map_or(true, |validator| validator.is_valid(text))
    }

    pub(super) fn token_start(&self, cursor: usize) -> usize {
        self.tokenizer.find_token_start(self.buffer.as_str(), cursor)
    }

    pub(super) fn token_end(&self, offset: usize) -> usize {
        self.tokenizer.find_token_end(self.buffer.as_str(), offset)
    }

    /// Replace `[start, end)` and shift every annotation and the cursor.
    ///
    /// Returns the number of characters removed.
    pub(super) fn replace_text(&mut self, start: usize, end: usize, text: &str) -> usize {
        let len = self.buffer.len();
        let start = start.min(len);
        let end = end.clamp(start, len);
        let inserted = text.chars().count();

        let removed = self.buffer.replace(start, end, text);
        let dropped = self.store.apply_edit(start, removed, inserted);
        if !dropped.is_empty() {
            for chip in &dropped {
                self.drop_chip_state(chip.id());
            }
            self.mark_changed(ChangeReason::Removed);
        }

        if self.cursor >= end {
            self.cursor = self.cursor - removed + inserted;
        } else if self.cursor > start {
            self.cursor = start + inserted;
        }
        removed
    }
}

impl RecipientField {
    /// Forget everything kept on the side for a deleted chip.
    pub(super) fn drop_chip_state(&mut self, id: ChipId) {
        self.temporary.retain(|temporary| *temporary != id);
        self.deferred.remove(&id);
        self.alternates.remove(&id);
    }
}

impl std::fmt::Debug for RecipientField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipientField")
            .field("text", &self.buffer.as_str())
            .field("cursor", &self.cursor)
            .field("focused", &self.focused)
            .field("chips", &self.store.len())
            .field("overflow", &self.store.overflow().map(OverflowSummary::count))
            .finish()
    }
}
