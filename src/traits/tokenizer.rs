//! Tokenizer and validator seams.
//!
//! Both are supplied by the embedding application. They must be
//! deterministic and free of side effects; the commit engine calls them
//! repeatedly while reconciling text and chips. All offsets are character
//! offsets.

use crate::models::AddressToken;

/// Splits delimited address text into tokens.
pub trait Tokenizer: Send + Sync {
    /// Start of the token that ends at `cursor`.
    fn find_token_start(&self, text: &str, cursor: usize) -> usize;

    /// End of the token starting at `offset` (the separator position, or the
    /// text length).
    fn find_token_end(&self, text: &str, offset: usize) -> usize;

    /// Append the canonical separator to a finished token.
    fn terminate_token(&self, text: &str) -> String;

    /// Split `text` into `(name, address)` tokens.
    fn tokenize(&self, text: &str) -> Vec<AddressToken>;
}

/// Decides whether an address is acceptable and repairs it when possible.
pub trait Validator: Send + Sync {
    fn is_valid(&self, address: &str) -> bool;

    /// Best-effort repair of `text`. An empty result means no repair was
    /// possible, which is also the default.
    fn fix_text(&self, _text: &str) -> String {
        String::new()
    }
}

impl<F> Validator for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_valid(&self, address: &str) -> bool {
        self(address)
    }
}
