//! Directory lookup trait abstraction.
//!
//! The directory resolves normalized addresses (and, for the alternates
//! flow, display names) to structured entries. Implementations may block on
//! I/O; they are always awaited from a background task, never from the
//! owning thread.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::models::{normalize_address, RecipientEntry};

/// Directory lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The backing directory could not be reached.
    #[error("Directory unavailable: {0}")]
    Unavailable(String),
    /// The lookup was abandoned.
    #[error("Lookup cancelled")]
    Cancelled,
    /// Any other failure reported by the directory.
    #[error("Lookup failed: {0}")]
    Other(String),
}

/// Outcome of a reverse lookup over a set of normalized addresses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupResult {
    /// Normalized address to the best entry the directory knows.
    pub matches: HashMap<String, RecipientEntry>,
    /// Requested keys the directory had nothing for.
    pub unmatched: HashSet<String>,
}

/// Trait for directory lookups.
///
/// # Example
///
/// ```ignore
/// use recipient_chips::traits::{DirectoryLookup, LookupError};
///
/// async fn resolve<D: DirectoryLookup>(directory: &D) -> Result<(), LookupError> {
///     let keys = ["bob@example.com".to_string()].into_iter().collect();
///     let found = directory.match_addresses(&keys).await?;
///     println!("{} matches", found.len());
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    /// Resolve a deduplicated set of normalized addresses.
    ///
    /// Keys absent from the returned map are reported as unmatched.
    async fn match_addresses(
        &self,
        addresses: &HashSet<String>,
    ) -> Result<HashMap<String, RecipientEntry>, LookupError>;

    /// Entries sharing a display name, used to offer alternates for a chip.
    async fn alternates(&self, display_name: &str) -> Result<Vec<RecipientEntry>, LookupError>;
}

/// Normalize, deduplicate and cap `addresses`, then run the reverse lookup.
///
/// At most `max_lookups` input addresses are considered.
pub async fn lookup_addresses(
    directory: &dyn DirectoryLookup,
    addresses: &[String],
    max_lookups: usize,
) -> Result<LookupResult, LookupError> {
    let keys: HashSet<String> = addresses
        .iter()
        .take(max_lookups)
        .map(|address| normalize_address(address))
        .collect();

    debug!("Doing reverse lookup for {} addresses", keys.len());

    let matches = directory.match_addresses(&keys).await?;
    let unmatched = keys
        .into_iter()
        .filter(|key| !matches.contains_key(key))
        .collect();

    Ok(LookupResult { matches, unmatched })
}
