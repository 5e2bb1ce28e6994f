//! Rendering surface seam.
//!
//! Pixel drawing is out of scope for the engine; it only decides what gets
//! drawn and with which width budget.

use bytes::Bytes;

use crate::models::RecipientEntry;

/// Pixel bounds of a rendered drawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChipBounds {
    pub width: u32,
    pub height: u32,
}

/// Everything a surface needs to draw one chip.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub entry: &'a RecipientEntry,
    pub display_text: &'a str,
    pub is_valid: bool,
    /// Only resolved contacts with a display name get their photo drawn.
    pub photo: Option<&'a Bytes>,
    pub width_budget: u32,
    pub selected: bool,
    /// Background asset picked from the field's [`ChipResources`].
    pub background: Option<&'a Bytes>,
}

/// A drawable produced by a [`RenderSurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered<D> {
    pub drawable: D,
    pub bounds: ChipBounds,
}

/// Draws chips and the overflow label.
pub trait RenderSurface {
    type Drawable;

    fn render_chip(&self, request: &RenderRequest<'_>) -> Rendered<Self::Drawable>;

    fn render_summary(&self, label: &str) -> Rendered<Self::Drawable>;
}

/// Assets the embedding application supplies before chips can be built.
///
/// The engine treats them as opaque; their absence is a configuration error
/// unless the field runs in no-chips mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChipResources {
    pub background: Bytes,
    pub selected_background: Bytes,
    pub invalid_background: Bytes,
    pub delete_icon: Bytes,
}

impl ChipResources {
    /// Pick the background asset for an entry.
    pub fn background_for(&self, entry: &RecipientEntry, selected: bool) -> &Bytes {
        if selected {
            &self.selected_background
        } else if entry.is_valid() {
            &self.background
        } else {
            &self.invalid_background
        }
    }
}
