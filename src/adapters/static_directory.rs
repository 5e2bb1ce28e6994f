//! Directory backed by a fixed contact list.
//!
//! Used by the demo binary; contacts are loaded from JSON:
//!
//! ```json
//! [{ "name": "Bob Smith", "address": "bob@example.com", "id": 42 }]
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::models::{better_entry, normalize_address, RecipientEntry};
use crate::traits::{DirectoryLookup, LookupError};

#[derive(Debug, Clone, Deserialize)]
struct ContactRecord {
    #[serde(default)]
    name: Option<String>,
    address: String,
    id: u64,
}

#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    contacts: Vec<RecipientEntry>,
}

impl StaticDirectory {
    pub fn new(contacts: Vec<RecipientEntry>) -> Self {
        Self { contacts }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let records: Vec<ContactRecord> = serde_json::from_str(json)?;
        let contacts = records
            .into_iter()
            .map(|record| RecipientEntry::resolved(record.name.as_deref(), &record.address, record.id, true))
            .collect();
        Ok(Self { contacts })
    }

    pub fn load(path: &Path) -> Result<Self, LookupError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| LookupError::Unavailable(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json).map_err(|e| LookupError::Other(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

#[async_trait]
impl DirectoryLookup for StaticDirectory {
    async fn match_addresses(
        &self,
        addresses: &HashSet<String>,
    ) -> Result<HashMap<String, RecipientEntry>, LookupError> {
        let mut matches: HashMap<String, RecipientEntry> = HashMap::new();
        for contact in &self.contacts {
            let key = contact.normalized_address();
            if !addresses.contains(&key) {
                continue;
            }
            let best = better_entry(matches.get(&key), Some(contact)).cloned();
            if let Some(best) = best {
                matches.insert(key, best);
            }
        }
        debug!("Static directory matched {} of {} addresses", matches.len(), addresses.len());
        Ok(matches)
    }

    async fn alternates(&self, display_name: &str) -> Result<Vec<RecipientEntry>, LookupError> {
        let wanted = normalize_address(display_name);
        Ok(self
            .contacts
            .iter()
            .filter(|contact| {
                contact
                    .display_name()
                    .is_some_and(|name| name.eq_ignore_ascii_case(display_name))
                    || contact.normalized_address() == wanted
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTACTS: &str = r#"[
        { "name": "Bob Smith", "address": "bob@example.com", "id": 42 },
        { "name": "Bob Smith", "address": "bob@work.example.com", "id": 43 },
        { "address": "carol@example.com", "id": 7 }
    ]"#;

    #[tokio::test]
    async fn test_match_addresses() {
        let directory = StaticDirectory::from_json_str(CONTACTS).unwrap();
        assert_eq!(directory.len(), 3);

        let keys: HashSet<String> = ["bob@example.com".to_string(), "dave@example.com".to_string()].into();
        let matches = directory.match_addresses(&keys).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches["bob@example.com"].display_name(), Some("Bob Smith"));
    }

    #[tokio::test]
    async fn test_alternates_share_display_name() {
        let directory = StaticDirectory::from_json_str(CONTACTS).unwrap();
        let alternates = directory.alternates("bob smith").await.unwrap();
        assert_eq!(alternates.len(), 2);
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(StaticDirectory::from_json_str("{").is_err());
    }
}
