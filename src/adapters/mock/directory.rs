//! Mock directory for testing.
//!
//! Answers lookups from an in-memory table, records every request, and can
//! hold answers back behind a gate so tests control when a background job
//! completes.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::models::{normalize_address, RecipientEntry};
use crate::traits::{DirectoryLookup, LookupError};

/// A recorded lookup for verification in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedLookup {
    /// Reverse lookup over normalized addresses, sorted.
    Addresses(Vec<String>),
    /// Alternates lookup for a display name.
    Alternates(String),
}

/// Mock directory lookup.
///
/// # Example
///
/// ```ignore
/// use recipient_chips::adapters::mock::MockDirectory;
/// use recipient_chips::models::RecipientEntry;
///
/// let directory = MockDirectory::new();
/// directory.add_entry(RecipientEntry::resolved(Some("Bob"), "bob@example.com", 42, true));
///
/// // Hold answers until the test says so
/// let directory = directory.gated();
/// // ... start a resolution ...
/// directory.release(1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockDirectory {
    entries: Arc<Mutex<HashMap<String, RecipientEntry>>>,
    alternates: Arc<Mutex<HashMap<String, Vec<RecipientEntry>>>>,
    requests: Arc<Mutex<Vec<RecordedLookup>>>,
    failure: Arc<Mutex<Option<LookupError>>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every lookup waits for a [`release`](Self::release) before answering.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let `count` held lookups answer.
    pub fn release(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    /// Register an entry under its normalized address.
    pub fn add_entry(&self, entry: RecipientEntry) {
        let key = entry.normalized_address();
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry);
    }

    /// Register the alternates returned for a display name.
    pub fn add_alternates(&self, display_name: &str, entries: Vec<RecipientEntry>) {
        self.alternates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(display_name.to_string(), entries);
    }

    /// Make every following lookup fail.
    pub fn fail_with(&self, error: LookupError) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Get all recorded lookups.
    pub fn get_requests(&self) -> Vec<RecordedLookup> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, request: RecordedLookup) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
    }

    async fn wait_for_gate(&self) -> Result<(), LookupError> {
        if let Some(gate) = &self.gate {
            let permit = gate.acquire().await.map_err(|_| LookupError::Cancelled)?;
            permit.forget();
        }
        match self
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DirectoryLookup for MockDirectory {
    async fn match_addresses(
        &self,
        addresses: &HashSet<String>,
    ) -> Result<HashMap<String, RecipientEntry>, LookupError> {
        let mut sorted: Vec<String> = addresses.iter().cloned().collect();
        sorted.sort();
        self.record(RecordedLookup::Addresses(sorted));

        self.wait_for_gate().await?;

        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(addresses
            .iter()
            .filter_map(|address| {
                entries
                    .get(&normalize_address(address))
                    .map(|entry| (address.clone(), entry.clone()))
            })
            .collect())
    }

    async fn alternates(&self, display_name: &str) -> Result<Vec<RecipientEntry>, LookupError> {
        self.record(RecordedLookup::Alternates(display_name.to_string()));

        self.wait_for_gate().await?;

        Ok(self
            .alternates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(display_name)
            .cloned()
            .unwrap_or_default())
    }
}
