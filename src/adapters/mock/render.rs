//! Mock render surface.
//!
//! Produces a text drawable instead of pixels. One column of text is one
//! pixel of width, measured with `unicode-width`.

use std::sync::{Arc, Mutex, PoisonError};

use unicode_width::UnicodeWidthStr;

use crate::traits::{ChipBounds, RenderRequest, RenderSurface, Rendered};

/// A chip drawn by [`MockRenderSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRender {
    pub label: String,
    pub width_budget: u32,
    pub selected: bool,
    pub has_photo: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MockRenderSurface {
    height: u32,
    renders: Arc<Mutex<Vec<RecordedRender>>>,
}

impl MockRenderSurface {
    pub fn new() -> Self {
        Self {
            height: 1,
            renders: Arc::default(),
        }
    }

    pub fn get_renders(&self) -> Vec<RecordedRender> {
        self.renders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RenderSurface for MockRenderSurface {
    type Drawable = String;

    fn render_chip(&self, request: &RenderRequest<'_>) -> Rendered<String> {
        let label = request.entry.chip_label();
        let drawable = if request.selected {
            format!("[{label} x]")
        } else if request.is_valid {
            format!("[{label}]")
        } else {
            format!("[!{label}]")
        };

        self.renders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRender {
                label: label.to_string(),
                width_budget: request.width_budget,
                selected: request.selected,
                has_photo: request.photo.is_some(),
            });

        Rendered {
            bounds: ChipBounds {
                width: drawable.width() as u32,
                height: self.height,
            },
            drawable,
        }
    }

    fn render_summary(&self, label: &str) -> Rendered<String> {
        Rendered {
            bounds: ChipBounds {
                width: label.width() as u32,
                height: self.height,
            },
            drawable: label.to_string(),
        }
    }
}
