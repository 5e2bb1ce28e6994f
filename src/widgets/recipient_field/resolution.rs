//! Applying directory results on the owning thread.
//!
//! Background jobs only ever see [`LookupTarget`] snapshots. Their results
//! come back as [`FieldMessage`]s and are re-checked against the store by
//! chip identity before anything is replaced.

use std::time::Duration;

use tracing::{debug, info, trace, warn};

use super::RecipientField;
use crate::error::{ChipResult, SoftCondition, StoreError};
use crate::events::{ChangeReason, ChipEvent};
use crate::models::{is_better, ChipAnnotation, ChipId, RecipientEntry, TextRange};
use crate::resolution::{FieldMessage, JobId, LookupTarget};
use crate::traits::LookupError;

/// How long [`RecipientField::settle`] waits for a message before checking
/// whether jobs are still running.
const SETTLE_POLL: Duration = Duration::from_millis(10);

fn target(chip: &ChipAnnotation) -> LookupTarget {
    LookupTarget {
        chip: chip.id(),
        address: chip.entry().address().to_string(),
    }
}

impl RecipientField {
    /// Look up every provisional chip, live and folded.
    ///
    /// Cancels an in-flight individual job and supersedes an in-flight batch.
    /// Returns `None` when there is nothing to resolve, no directory, or no
    /// async runtime.
    pub fn start_batch_resolution(&mut self) -> Option<JobId> {
        self.show_hidden_chips();

        let mut targets: Vec<LookupTarget> = self
            .store
            .list()
            .into_iter()
            .filter(|chip| chip.is_provisional())
            .map(target)
            .collect();
        if let Some(summary) = self.store.overflow() {
            targets.extend(
                summary
                    .removed_chips()
                    .iter()
                    .filter(|chip| chip.is_provisional())
                    .map(target),
            );
        }
        self.scheduler.start_batch(targets)
    }

    pub(super) fn start_individual_resolution(&mut self, ids: &[ChipId]) -> Option<JobId> {
        let targets = ids
            .iter()
            .filter_map(|id| self.store.get(*id))
            .filter(|chip| chip.is_provisional())
            .map(target)
            .collect();
        self.scheduler.start_individual(targets)
    }

    /// Ask the directory for entries sharing the chip's display name. The
    /// result arrives as [`ChipEvent::AlternatesLoaded`].
    pub fn request_alternates(&mut self, chip: ChipId) -> ChipResult<JobId> {
        let annotation = self.store.get(chip).ok_or(StoreError::UnknownChip(chip))?;
        let name = annotation
            .entry()
            .display_name()
            .unwrap_or(annotation.entry().address())
            .to_string();

        if !self.scheduler.has_directory() {
            return Err(LookupError::Unavailable("no directory configured".to_string()).into());
        }
        self.scheduler
            .start_alternates(chip, name)
            .ok_or_else(|| LookupError::Unavailable("no async runtime".to_string()).into())
    }

    /// Replace a chip with one of its alternates.
    pub fn choose_alternate(&mut self, chip: ChipId, entry: RecipientEntry) -> ChipResult<()> {
        if !self.store.contains(chip) {
            return Err(StoreError::UnknownChip(chip).into());
        }
        let entry = self.create_validated_entry(entry);
        self.replace_chip_in_place(chip, entry)?;
        self.alternates.remove(&chip);
        self.stats.resolutions_applied += 1;
        self.mark_changed(ChangeReason::Resolved);
        self.flush_changes();
        Ok(())
    }

    /// Apply every message already queued. Returns how many were handled.
    pub fn process_messages(&mut self) -> ChipResult<usize> {
        let mut handled = 0;
        while let Ok(message) = self.message_rx.try_recv() {
            self.handle_message(message)?;
            handled += 1;
        }
        self.flush_changes();
        Ok(handled)
    }

    /// Wait for the next message from a background job.
    pub async fn next_message(&mut self) -> Option<FieldMessage> {
        self.message_rx.recv().await
    }

    /// Apply results until no job is running any more.
    pub async fn settle(&mut self) -> ChipResult<()> {
        loop {
            self.process_messages()?;
            if !self.scheduler.has_running_jobs() {
                // a job may have posted right before it finished
                self.process_messages()?;
                return Ok(());
            }
            match tokio::time::timeout(SETTLE_POLL, self.message_rx.recv()).await {
                Ok(Some(message)) => {
                    self.handle_message(message)?;
                    self.flush_changes();
                }
                Ok(None) => return Ok(()),
                Err(_) => {}
            }
        }
    }

    /// True while a resolution job is registered.
    pub fn resolution_in_flight(&self) -> bool {
        self.scheduler.in_flight()
    }

    /// Apply one message. Messages from cancelled or superseded jobs are
    /// dropped.
    pub fn handle_message(&mut self, message: FieldMessage) -> ChipResult<()> {
        let job = message.job();
        if !self.scheduler.is_current(job) {
            debug!("Dropping message from stale {}", job);
            self.stats.dropped_messages += 1;
            return Ok(());
        }
        if message.is_final() {
            self.scheduler.finish(job);
        }

        match message {
            FieldMessage::BatchResolved {
                replacements,
                unmatched,
                ..
            } => {
                info!(
                    "{} resolved {} chips, {} without a match",
                    job,
                    replacements.len(),
                    unmatched.len()
                );
                self.apply_batch(replacements);
            }
            FieldMessage::ChipResolved { chip, entry, .. } => {
                self.apply_resolution(chip, entry)?;
            }
            FieldMessage::AlternatesLoaded { chip, entries, .. } => {
                if self.store.contains(chip) {
                    self.alternates.insert(chip, entries.clone());
                    self.emit(ChipEvent::AlternatesLoaded { chip, entries });
                } else {
                    debug!("Alternates for removed {} dropped", chip);
                    self.record(SoftCondition::StaleResolution);
                }
            }
            FieldMessage::LookupFailed { error, .. } => {
                warn!("{} failed: {}", job, error);
                self.stats.lookup_failures += 1;
            }
            FieldMessage::JobFinished { .. } => {}
        }
        Ok(())
    }

    /// Apply every replacement of a batch. A failing chip is logged and
    /// skipped.
    pub(super) fn apply_batch(&mut self, replacements: Vec<(ChipId, RecipientEntry)>) {
        for (chip, entry) in replacements {
            if let Err(err) = self.apply_resolution(chip, entry) {
                warn!("Could not apply resolution for {}: {}", chip, err);
            }
        }
    }

    /// Upgrade a provisional chip if `entry` is better than what it shows.
    pub(super) fn apply_resolution(&mut self, chip: ChipId, entry: RecipientEntry) -> ChipResult<()> {
        let entry = self.create_validated_entry(entry);

        if self.store.overflow().is_some_and(|summary| summary.contains_chip(chip)) {
            debug!("{} is folded, deferring its resolution", chip);
            self.deferred.insert(chip, entry);
            return Ok(());
        }

        let Some(current) = self.store.get(chip) else {
            debug!("Resolution for removed {} dropped", chip);
            self.record(SoftCondition::StaleResolution);
            return Ok(());
        };
        if !current.is_provisional() {
            debug!("Resolution for already resolved {} dropped", chip);
            self.record(SoftCondition::StaleResolution);
            return Ok(());
        }
        if !is_better(current.entry(), &entry) {
            trace!("Keeping current entry of {}", chip);
            return Ok(());
        }

        self.replace_chip_in_place(chip, entry)?;
        self.temporary.retain(|id| *id != chip);
        self.stats.resolutions_applied += 1;
        self.mark_changed(ChangeReason::Resolved);
        Ok(())
    }

    /// Rewrite a chip's text for `entry`, keeping its identity and exactly
    /// one space after it.
    pub(super) fn replace_chip_in_place(&mut self, chip: ChipId, entry: RecipientEntry) -> ChipResult<()> {
        self.ensure_chip_resources()?;
        let display = format!("{} ", self.create_address_text(&entry).trim());
        let chip_len = display.chars().count() - 1;
        if chip_len == 0 {
            warn!("Entry for {} renders no text, keeping the chip", chip);
            return Ok(());
        }

        let previous = self.store.remove(chip)?;
        let start = previous.range().start;
        let mut end = previous.range().end;
        while self.buffer.char_at(end) == Some(' ') {
            end += 1;
        }
        self.replace_text(start, end, &display);

        let mut replacement = ChipAnnotation::new(chip, TextRange::new(start, start + chip_len), entry);
        replacement.set_original_text(&display);
        self.store.insert(replacement)?;
        debug!("Replaced {} in place at [{}, {})", chip, start, start + chip_len);
        Ok(())
    }
}
