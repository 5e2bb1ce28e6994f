//! Mock implementations for testing.
//!
//! # Available Mocks
//!
//! - [`MockDirectory`] - directory lookup with gating and request recording
//! - [`MockRenderSurface`] - text-based render surface

pub mod directory;
pub mod render;

pub use directory::{MockDirectory, RecordedLookup};
pub use render::{MockRenderSurface, RecordedRender};
