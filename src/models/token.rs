//! Address tokens produced by a [`Tokenizer`](crate::traits::Tokenizer).

use std::fmt;

/// One `(name, address, comment)` triple split out of delimited input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressToken {
    pub name: Option<String>,
    pub address: String,
    pub comment: Option<String>,
}

impl AddressToken {
    pub fn new(name: Option<&str>, address: &str) -> Self {
        Self {
            name: name.map(str::to_string),
            address: address.to_string(),
            comment: None,
        }
    }

    /// The name, if present and not empty.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Quote a display name unless it only holds ASCII letters, digits and spaces.
pub fn quote_name_if_necessary(name: &str) -> String {
    let plain = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == ' ');
    if plain {
        return name.to_string();
    }
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        if c == '\\' || c == '"' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

impl fmt::Display for AddressToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name() {
            write!(f, "{} ", quote_name_if_necessary(name))?;
        }
        if let Some(comment) = self.comment.as_deref().filter(|c| !c.is_empty()) {
            write!(f, "({}) ", comment.replace('(', "\\(").replace(')', "\\)"))?;
        }
        if !self.address.is_empty() {
            write!(f, "<{}>", self.address)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_plain_name() {
        let token = AddressToken::new(Some("Bob Smith"), "bob@example.com");
        assert_eq!(token.to_string(), "Bob Smith <bob@example.com>");
    }

    #[test]
    fn test_display_quotes_punctuated_name() {
        let token = AddressToken::new(Some("Smith, Bob"), "bob@example.com");
        assert_eq!(token.to_string(), "\"Smith, Bob\" <bob@example.com>");
    }

    #[test]
    fn test_display_address_only() {
        let token = AddressToken::new(None, "bob@example.com");
        assert_eq!(token.to_string(), "<bob@example.com>");
    }

    #[test]
    fn test_empty_name_is_ignored() {
        let token = AddressToken::new(Some(""), "bob@example.com");
        assert_eq!(token.name(), None);
    }
}
