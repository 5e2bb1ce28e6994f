//! RFC 822 style address tokenizer.
//!
//! Splits `"Name" <addr> (comment), other@example.com; ...` input into
//! [`AddressToken`]s. Offsets are character offsets.

use crate::models::AddressToken;
use crate::traits::Tokenizer;

/// Separator appended by [`Tokenizer::terminate_token`].
pub const TOKEN_SEPARATOR: &str = ", ";

/// Tokenizer for comma/semicolon separated mail addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rfc822Tokenizer;

impl Rfc822Tokenizer {
    pub fn new() -> Self {
        Self
    }
}

fn is_separator(c: char) -> bool {
    c == ',' || c == ';'
}

/// Collapse the space markers collected while scanning a name: leading,
/// trailing and repeated markers are dropped, the rest become single spaces.
fn crunch(name: &mut Vec<char>) {
    let mut i = 0;
    while i < name.len() {
        if name[i] != '\0' {
            i += 1;
            continue;
        }
        let last = name.len() - 1;
        let droppable = i == 0
            || i == last
            || matches!(name[i - 1], ' ' | '\0')
            || matches!(name[i + 1], ' ' | '\0');
        if droppable {
            name.remove(i);
        } else {
            name[i] = ' ';
            i += 1;
        }
    }
}

fn flush(name: &mut Vec<char>, address: &mut String, comment: &mut String, out: &mut Vec<AddressToken>) {
    crunch(name);
    let crunched: String = name.iter().collect();
    let comment_text = (!comment.is_empty()).then(|| comment.clone());

    if !address.is_empty() {
        out.push(AddressToken {
            name: Some(crunched),
            address: address.clone(),
            comment: comment_text,
        });
    } else if !crunched.is_empty() {
        out.push(AddressToken {
            name: None,
            address: crunched,
            comment: comment_text,
        });
    }

    name.clear();
    address.clear();
    comment.clear();
}

/// Tokenize `text` into address tokens.
pub fn tokenize(text: &str) -> Vec<AddressToken> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut out = Vec::new();
    let mut name: Vec<char> = Vec::new();
    let mut address = String::new();
    let mut comment = String::new();

    let mut i = 0;
    while i < len {
        let c = chars[i];
        match c {
            ',' | ';' => {
                i += 1;
                while i < len && chars[i] == ' ' {
                    i += 1;
                }
                flush(&mut name, &mut address, &mut comment, &mut out);
            }
            '"' => {
                i += 1;
                while i < len {
                    match chars[i] {
                        '"' => {
                            i += 1;
                            break;
                        }
                        '\\' => {
                            if let Some(&escaped) = chars.get(i + 1) {
                                name.push(escaped);
                            }
                            i += 2;
                        }
                        other => {
                            name.push(other);
                            i += 1;
                        }
                    }
                }
            }
            '(' => {
                let mut level = 1;
                i += 1;
                while i < len && level > 0 {
                    match chars[i] {
                        ')' => {
                            if level > 1 {
                                comment.push(')');
                            }
                            level -= 1;
                            i += 1;
                        }
                        '(' => {
                            comment.push('(');
                            level += 1;
                            i += 1;
                        }
                        '\\' => {
                            if let Some(&escaped) = chars.get(i + 1) {
                                comment.push(escaped);
                            }
                            i += 2;
                        }
                        other => {
                            comment.push(other);
                            i += 1;
                        }
                    }
                }
            }
            '<' => {
                i += 1;
                while i < len {
                    let inner = chars[i];
                    i += 1;
                    if inner == '>' {
                        break;
                    }
                    address.push(inner);
                }
            }
            ' ' => {
                name.push('\0');
                i += 1;
            }
            other => {
                name.push(other);
                i += 1;
            }
        }
    }

    flush(&mut name, &mut address, &mut comment, &mut out);
    out
}

/// The address of the first token in `text`, if any.
pub fn first_address(text: &str) -> Option<String> {
    tokenize(text).into_iter().next().map(|token| token.address)
}

fn token_end(chars: &[char], start: usize) -> usize {
    let len = chars.len();
    let mut i = start;
    while i < len {
        match chars[i] {
            c if is_separator(c) => return i,
            '"' => {
                i += 1;
                while i < len {
                    match chars[i] {
                        '"' => {
                            i += 1;
                            break;
                        }
                        '\\' if i + 1 < len => i += 2,
                        _ => i += 1,
                    }
                }
            }
            '(' => {
                let mut level = 1;
                i += 1;
                while i < len && level > 0 {
                    match chars[i] {
                        ')' => {
                            level -= 1;
                            i += 1;
                        }
                        '(' => {
                            level += 1;
                            i += 1;
                        }
                        '\\' if i + 1 < len => i += 2,
                        _ => i += 1,
                    }
                }
            }
            '<' => {
                i += 1;
                while i < len {
                    let inner = chars[i];
                    i += 1;
                    if inner == '>' {
                        break;
                    }
                }
            }
            _ => i += 1,
        }
    }
    i.min(len)
}

impl Tokenizer for Rfc822Tokenizer {
    fn find_token_start(&self, text: &str, cursor: usize) -> usize {
        let chars: Vec<char> = text.chars().collect();
        let cursor = cursor.min(chars.len());
        let mut best = 0;
        let mut i = 0;

        while i < cursor {
            i = token_end(&chars, i);
            if i < cursor {
                // skip the separator and the spaces after it
                i += 1;
                while i < cursor && chars[i] == ' ' {
                    i += 1;
                }
                if i < cursor {
                    best = i;
                }
            }
        }

        best
    }

    fn find_token_end(&self, text: &str, offset: usize) -> usize {
        let chars: Vec<char> = text.chars().collect();
        token_end(&chars, offset.min(chars.len()))
    }

    fn terminate_token(&self, text: &str) -> String {
        format!("{text}{TOKEN_SEPARATOR}")
    }

    fn tokenize(&self, text: &str) -> Vec<AddressToken> {
        tokenize(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_bare_address() {
        let tokens = tokenize("alice@example.com");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].address, "alice@example.com");
        assert_eq!(tokens[0].name(), None);
    }

    #[test]
    fn test_tokenize_named_and_quoted() {
        let tokens = tokenize("\"Smith, Bob\" <bob@example.com>, Alice Jones <alice@example.com>");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].name(), Some("Smith, Bob"));
        assert_eq!(tokens[0].address, "bob@example.com");
        assert_eq!(tokens[1].name(), Some("Alice Jones"));
        assert_eq!(tokens[1].address, "alice@example.com");
    }

    #[test]
    fn test_tokenize_comment_and_semicolon() {
        let tokens = tokenize("bob@example.com (work); carol@example.com");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].address, "bob@example.com");
        assert_eq!(tokens[0].comment.as_deref(), Some("work"));
        assert_eq!(tokens[1].address, "carol@example.com");
    }

    #[test]
    fn test_tokenize_collapses_spaces_in_names() {
        let tokens = tokenize("  Bob    Smith   <bob@example.com>");
        assert_eq!(tokens[0].name(), Some("Bob Smith"));
    }

    #[test]
    fn test_tokenize_skips_empty_tokens() {
        assert!(tokenize(", ,;").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_first_address() {
        assert_eq!(first_address("Bob <bob@example.com>, x@y.z").as_deref(), Some("bob@example.com"));
        assert_eq!(first_address("   "), None);
    }

    #[test]
    fn test_find_token_end_stops_at_top_level_separator() {
        let tokenizer = Rfc822Tokenizer::new();
        let text = "\"Smith, Bob\" <bob@example.com>, x";
        assert_eq!(tokenizer.find_token_end(text, 0), 30);
        assert_eq!(tokenizer.find_token_end("abc", 0), 3);
        assert_eq!(tokenizer.find_token_end("a;b", 2), 3);
    }

    #[test]
    fn test_find_token_start_skips_separator_and_spaces() {
        let tokenizer = Rfc822Tokenizer::new();
        let text = "a@x.com, b@y";
        assert_eq!(tokenizer.find_token_start(text, text.chars().count()), 9);
        assert_eq!(tokenizer.find_token_start(text, 3), 0);
        assert_eq!(tokenizer.find_token_start("a@x.com, ", 9), 0);
    }

    #[test]
    fn test_terminate_token_appends_separator() {
        let tokenizer = Rfc822Tokenizer::new();
        assert_eq!(tokenizer.terminate_token("<a@x.com>"), "<a@x.com>, ");
    }

    #[test]
    fn test_offsets_are_characters() {
        let tokenizer = Rfc822Tokenizer::new();
        let text = "José <j@x.com>, k@y.com";
        assert_eq!(tokenizer.find_token_end(text, 0), 14);
        assert_eq!(tokenizer.find_token_start(text, 23), 16);
    }
}
