//! Recipient entries.
//!
//! A [`RecipientEntry`] is the immutable value behind every chip. Entries are
//! either provisional (typed by the user and not yet matched to a directory
//! contact) or resolved (carrying a real directory contact id).

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::adapters::rfc822;

/// Identity of the contact an entry was built from.
///
/// The two sentinel variants mark provisional entries; only
/// [`ContactId::Directory`] identifies a resolved contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactId {
    /// Typed by the user and not resolved.
    Invalid,
    /// Typed with a display name supplied, still provisional.
    Generated,
    /// A directory contact.
    Directory(u64),
}

/// Raw value of the "typed, unresolved" sentinel.
pub const INVALID_CONTACT: i64 = -1;

/// Raw value of the "typed with a display name" sentinel.
pub const GENERATED_CONTACT: i64 = -2;

impl ContactId {
    /// True for the two sentinel variants.
    pub fn is_provisional(self) -> bool {
        !matches!(self, ContactId::Directory(_))
    }

    /// Numeric form, using `-1`/`-2` for the sentinels.
    pub fn raw(self) -> i64 {
        match self {
            ContactId::Invalid => INVALID_CONTACT,
            ContactId::Generated => GENERATED_CONTACT,
            ContactId::Directory(id) => id as i64,
        }
    }
}

/// A resolved or provisional recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientEntry {
    display_name: Option<String>,
    address: String,
    contact_id: ContactId,
    is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    photo: Option<Bytes>,
}

impl RecipientEntry {
    /// Build an entry from an address the user typed.
    ///
    /// The address is run through the RFC 822 tokenizer so `Name <addr>`
    /// input keeps only `addr`; the display name always equals the address.
    pub fn fake(address: &str, is_valid: bool) -> Self {
        let tokenized = rfc822::first_address(address).unwrap_or_else(|| address.to_string());
        Self {
            display_name: Some(tokenized.clone()),
            address: tokenized,
            contact_id: ContactId::Invalid,
            is_valid,
            photo: None,
        }
    }

    /// Build a provisional entry that carries a display name of its own.
    pub fn generated(display_name: &str, address: &str, is_valid: bool) -> Self {
        Self {
            display_name: Some(display_name.to_string()),
            address: address.to_string(),
            contact_id: ContactId::Generated,
            is_valid,
            photo: None,
        }
    }

    /// Build an entry for a directory contact.
    pub fn resolved(display_name: Option<&str>, address: &str, contact_id: u64, is_valid: bool) -> Self {
        Self {
            display_name: display_name.map(str::to_string),
            address: address.to_string(),
            contact_id: ContactId::Directory(contact_id),
            is_valid,
            photo: None,
        }
    }

    /// Attach photo bytes.
    pub fn with_photo(mut self, photo: impl Into<Bytes>) -> Self {
        self.photo = Some(photo.into());
        self
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn contact_id(&self) -> ContactId {
        self.contact_id
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn photo(&self) -> Option<&Bytes> {
        self.photo.as_ref()
    }

    /// True while the entry has not been matched to a directory contact.
    pub fn is_provisional(&self) -> bool {
        self.contact_id.is_provisional()
    }

    /// True when the display name is present and differs from the address.
    pub fn has_distinct_name(&self) -> bool {
        matches!(self.display_name.as_deref(), Some(name) if !name.is_empty() && name != self.address)
    }

    fn has_name(&self) -> bool {
        self.display_name.as_deref().is_some_and(|name| !name.is_empty())
    }

    fn name_equals_address(&self) -> bool {
        self.display_name.as_deref() == Some(self.address.as_str())
    }

    /// Key used to match entries during resolution: the first tokenized
    /// address, lower-cased.
    pub fn normalized_address(&self) -> String {
        normalize_address(&self.address)
    }

    /// Text shown inside a rendered chip: the distinct display name when
    /// there is one, the address otherwise.
    pub fn chip_label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if self.has_distinct_name() => name,
            _ => &self.address,
        }
    }
}

/// Normalize a raw address string for directory matching.
pub fn normalize_address(address: &str) -> String {
    let lowered = address.to_lowercase();
    rfc822::first_address(&lowered).unwrap_or(lowered)
}

/// Pick the entry with more complete display information.
///
/// Both entries are assumed to describe the same address. A missing side
/// yields the other one; when nothing distinguishes them the second entry
/// wins, so callers pass the freshly looked-up entry second.
pub fn better_entry<'a>(
    first: Option<&'a RecipientEntry>,
    second: Option<&'a RecipientEntry>,
) -> Option<&'a RecipientEntry> {
    let (first, second) = match (first, second) {
        (None, other) => return other,
        (other, None) => return other,
        (Some(first), Some(second)) => (first, second),
    };

    if first.has_name() != second.has_name() {
        return Some(if first.has_name() { first } else { second });
    }

    if first.name_equals_address() != second.name_equals_address() {
        return Some(if second.name_equals_address() { first } else { second });
    }

    if first.photo.is_some() != second.photo.is_some() {
        return Some(if first.photo.is_some() { first } else { second });
    }

    Some(second)
}

/// True when `candidate` should replace `current`.
pub fn is_better(current: &RecipientEntry, candidate: &RecipientEntry) -> bool {
    better_entry(Some(current), Some(candidate)).is_some_and(|winner| std::ptr::eq(winner, candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named_with_photo() -> RecipientEntry {
        RecipientEntry::resolved(Some("Bob Smith"), "bob@example.com", 42, true)
            .with_photo(vec![1u8, 2, 3])
    }

    #[test]
    fn test_fake_entry_uses_address_as_name() {
        let entry = RecipientEntry::fake("Bob <bob@example.com>", true);
        assert_eq!(entry.address(), "bob@example.com");
        assert_eq!(entry.display_name(), Some("bob@example.com"));
        assert_eq!(entry.contact_id(), ContactId::Invalid);
        assert!(entry.is_provisional());
    }

    #[test]
    fn test_generated_entry_keeps_distinct_name() {
        let entry = RecipientEntry::generated("Bob", "bob@example.com", true);
        assert_eq!(entry.display_name(), Some("Bob"));
        assert_eq!(entry.contact_id().raw(), GENERATED_CONTACT);
        assert!(entry.has_distinct_name());
    }

    #[test]
    fn test_resolved_entry_is_not_provisional() {
        let entry = named_with_photo();
        assert_eq!(entry.contact_id(), ContactId::Directory(42));
        assert_eq!(entry.contact_id().raw(), 42);
        assert!(!entry.is_provisional());
        assert_eq!(entry.chip_label(), "Bob Smith");
    }

    #[test]
    fn test_normalized_address_lowercases_and_tokenizes() {
        let entry = RecipientEntry::generated("Bob", "Bob Smith <BOB@Example.COM>", true);
        assert_eq!(entry.normalized_address(), "bob@example.com");
    }

    #[test]
    fn test_better_entry_prefers_name_and_photo() {
        let rich = named_with_photo();
        let bare = RecipientEntry::fake("bob@example.com", true);
        assert_eq!(better_entry(Some(&rich), Some(&bare)), Some(&rich));
        assert_eq!(better_entry(Some(&bare), Some(&rich)), Some(&rich));
    }

    #[test]
    fn test_better_entry_handles_missing_side() {
        let entry = named_with_photo();
        assert_eq!(better_entry(None, Some(&entry)), Some(&entry));
        assert_eq!(better_entry(Some(&entry), None), Some(&entry));
        assert_eq!(better_entry(None, None), None);
    }

    #[test]
    fn test_better_entry_prefers_name_distinct_from_address() {
        let fake = RecipientEntry::fake("bob@example.com", true);
        let named = RecipientEntry::generated("Bob", "bob@example.com", true);
        assert!(is_better(&fake, &named));
        assert!(!is_better(&named, &fake));
    }

    #[test]
    fn test_better_entry_defaults_to_second() {
        let first = RecipientEntry::resolved(Some("Bob"), "bob@example.com", 1, true);
        let second = RecipientEntry::resolved(Some("Bobby"), "bob@example.com", 2, true);
        assert!(is_better(&first, &second));
        assert!(is_better(&second, &first));
    }

    #[test]
    fn test_photo_breaks_tie() {
        let plain = RecipientEntry::resolved(Some("Bob"), "bob@example.com", 1, true);
        let photo = plain.clone().with_photo(vec![9u8]);
        assert!(is_better(&plain, &photo));
        assert!(!is_better(&photo, &plain));
    }
}
