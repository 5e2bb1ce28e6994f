//! Render path: turning visible chips into drawables.

use tracing::debug;

use super::RecipientField;
use crate::error::ChipResult;
use crate::models::{ChipId, TextRange};
use crate::traits::{RenderRequest, RenderSurface, Rendered};

/// One chip as drawn, anchored to its text range.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintedChip<D> {
    pub chip: ChipId,
    pub range: TextRange,
    pub rendered: Rendered<D>,
}

/// Everything drawn for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Painted<D> {
    pub chips: Vec<PaintedChip<D>>,
    pub summary: Option<(TextRange, Rendered<D>)>,
}

impl RecipientField {
    /// Width available to a single chip.
    pub fn chip_width_budget(&self) -> u32 {
        self.width.saturating_sub(2 * self.config.chip_padding)
    }

    /// Render every visible chip and the summary through `surface`.
    pub fn paint<S: RenderSurface>(&mut self, surface: &S) -> ChipResult<Painted<S::Drawable>> {
        self.ensure_chip_resources()?;
        let budget = self.chip_width_budget();

        let mut chips = Vec::new();
        let mut oversized = 0;
        for chip in self.store.list() {
            if !chip.is_visible() {
                continue;
            }
            let entry = chip.entry();
            let photo = entry
                .photo()
                .filter(|_| !entry.is_provisional() && entry.has_distinct_name());
            let request = RenderRequest {
                entry,
                display_text: entry.chip_label(),
                is_valid: entry.is_valid(),
                photo,
                width_budget: budget,
                selected: chip.is_selected(),
                background: self
                    .resources
                    .as_ref()
                    .map(|resources| resources.background_for(entry, chip.is_selected())),
            };

            let rendered = surface.render_chip(&request);
            if budget > 0 && rendered.bounds.width > budget {
                debug!("{} is {} wide, budget is {}", chip.id(), rendered.bounds.width, budget);
                oversized += 1;
            }
            chips.push(PaintedChip {
                chip: chip.id(),
                range: chip.range(),
                rendered,
            });
        }
        self.stats.oversized_chips += oversized;

        let summary = self
            .store
            .overflow()
            .map(|summary| (summary.range(), surface.render_summary(summary.label())));

        Ok(Painted { chips, summary })
    }
}
