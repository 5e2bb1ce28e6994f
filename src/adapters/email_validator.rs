//! Regex based mail address validator.

use once_cell::sync::Lazy;
use regex::Regex;

use super::rfc822::{self, TOKEN_SEPARATOR};
use crate::traits::Validator;

static EMAIL_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9+._%\-]{1,256}@[a-zA-Z0-9][a-zA-Z0-9\-]{0,64}(\.[a-zA-Z0-9][a-zA-Z0-9\-]{0,25})+$",
    )
    .expect("Invalid email address regex pattern")
});

/// Characters that can never appear in the local part or the domain.
static ILLEGAL_CHARACTERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\s()<>@,;:\\"\[\]]"#).expect("Invalid illegal-character regex pattern"));

fn remove_illegal_characters(text: &str) -> String {
    ILLEGAL_CHARACTERS.replace_all(text, "").into_owned()
}

/// Accepts exactly one token whose address is well formed.
///
/// [`Validator::fix_text`] strips illegal characters and appends the default
/// domain to bare local parts.
#[derive(Debug, Clone, Default)]
pub struct EmailValidator {
    domain: Option<String>,
    remove_invalid: bool,
}

impl EmailValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Domain appended to addresses that lack one.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Drop tokens that are still invalid instead of keeping them.
    pub fn with_remove_invalid(mut self, remove: bool) -> Self {
        self.remove_invalid = remove;
        self
    }

    fn fix_address(&self, address: &str) -> Option<String> {
        match address.find('@') {
            None => match &self.domain {
                Some(domain) => Some(format!("{}@{}", remove_illegal_characters(address), domain)),
                None => Some(address.to_string()),
            },
            Some(at) => {
                let local = remove_illegal_characters(&address[..at]);
                if local.is_empty() {
                    return None;
                }
                let domain = remove_illegal_characters(&address[at + 1..]);
                if !domain.is_empty() {
                    Some(format!("{local}@{domain}"))
                } else {
                    self.domain.as_ref().map(|fallback| format!("{local}@{fallback}"))
                }
            }
        }
    }
}

impl Validator for EmailValidator {
    fn is_valid(&self, address: &str) -> bool {
        let tokens = rfc822::tokenize(address);
        tokens.len() == 1 && EMAIL_ADDRESS.is_match(&tokens[0].address)
    }

    fn fix_text(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        let tokens = rfc822::tokenize(text);
        let count = tokens.len();
        let mut fixed = String::new();

        for (index, mut token) in tokens.into_iter().enumerate() {
            if self.remove_invalid && !self.is_valid(&token.address) {
                continue;
            }
            let Some(address) = self.fix_address(&token.address) else {
                continue;
            };
            token.address = address;
            fixed.push_str(&token.to_string());
            if index + 1 < count {
                fixed.push_str(TOKEN_SEPARATOR);
            }
        }

        fixed
    }
}
