//! Text storage seam.
//!
//! The engine never owns character storage; it edits it through this trait
//! and keeps its own offsets in step.

use std::fmt;
use std::ops::Range;

/// Mutable character storage behind a field.
pub trait TextStorage: Send + fmt::Debug {
    fn as_str(&self) -> &str;

    /// Replace the given byte range.
    fn replace_range(&mut self, range: Range<usize>, replacement: &str);
}

impl TextStorage for String {
    fn as_str(&self) -> &str {
        self.as_str()
    }

    fn replace_range(&mut self, range: Range<usize>, replacement: &str) {
        String::replace_range(self, range, replacement);
    }
}
