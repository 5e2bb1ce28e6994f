//! Character-offset view over a [`TextStorage`].
//!
//! Every offset the engine hands out is a character offset; this is the one
//! place where they are mapped to byte offsets of the underlying storage.

use std::fmt;

use crate::traits::TextStorage;

pub struct TextBuffer {
    storage: Box<dyn TextStorage>,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::with_storage(Box::new(String::new()))
    }

    pub fn with_storage(storage: Box<dyn TextStorage>) -> Self {
        Self { storage }
    }

    pub fn as_str(&self) -> &str {
        self.storage.as_str()
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.as_str().chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.as_str().chars().nth(offset)
    }

    pub fn last_char(&self) -> Option<char> {
        self.as_str().chars().next_back()
    }

    /// Characters in `[start, end)`, clamped to the buffer.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.max(start);
        self.as_str().chars().skip(start).take(end - start).collect()
    }

    /// First occurrence of `needle` at or after character offset `from`.
    pub fn find_from(&self, needle: &str, from: usize) -> Option<usize> {
        if needle.is_empty() {
            return None;
        }
        let text = self.as_str();
        let byte_from = self.byte_offset(from);
        text[byte_from..]
            .find(needle)
            .map(|byte| from + text[byte_from..byte_from + byte].chars().count())
    }

    /// Replace characters `[start, end)` with `text`, returning the number of
    /// characters removed. Offsets past the end are clamped.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) -> usize {
        let len = self.len();
        let start = start.min(len);
        let end = end.clamp(start, len);
        let range = self.byte_offset(start)..self.byte_offset(end);
        self.storage.replace_range(range, text);
        end - start
    }

    pub fn set(&mut self, text: &str) {
        let end = self.as_str().len();
        self.storage.replace_range(0..end, text);
    }

    fn byte_offset(&self, offset: usize) -> usize {
        let text = self.as_str();
        text.char_indices()
            .nth(offset)
            .map(|(byte, _)| byte)
            .unwrap_or(text.len())
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TextBuffer").field(&self.as_str()).finish()
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_uses_char_offsets() {
        let mut buffer = TextBuffer::new();
        buffer.set("José, b");
        let removed = buffer.replace(4, 5, ";");
        assert_eq!(removed, 1);
        assert_eq!(buffer.as_str(), "José; b");
        assert_eq!(buffer.len(), 7);
    }

    #[test]
    fn test_replace_clamps() {
        let mut buffer = TextBuffer::new();
        buffer.set("abc");
        assert_eq!(buffer.replace(2, 10, "Z"), 1);
        assert_eq!(buffer.as_str(), "abZ");
        assert_eq!(buffer.replace(10, 12, "!"), 0);
        assert_eq!(buffer.as_str(), "abZ!");
    }

    #[test]
    fn test_find_from_advances() {
        let mut buffer = TextBuffer::new();
        buffer.set("é a, a, b");
        assert_eq!(buffer.find_from("a", 0), Some(2));
        assert_eq!(buffer.find_from("a", 3), Some(5));
        assert_eq!(buffer.find_from("a", 6), None);
        assert_eq!(buffer.find_from("", 0), None);
    }

    #[test]
    fn test_slice_and_char_at() {
        let mut buffer = TextBuffer::new();
        buffer.set("héllo");
        assert_eq!(buffer.slice(1, 3), "él");
        assert_eq!(buffer.char_at(1), Some('é'));
        assert_eq!(buffer.last_char(), Some('o'));
        assert_eq!(buffer.slice(3, 1), "");
    }
}
