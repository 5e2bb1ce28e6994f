//! Common test utilities for integration tests.
//!
//! # Example
//!
//! ```ignore
//! use common::{type_text, TestFieldBuilder};
//!
//! let mut field = TestFieldBuilder::new().with_width(300).build();
//! type_text(&mut field, "alice@example.com,");
//! ```

#![allow(dead_code)]

use std::sync::Arc;

use recipient_chips::adapters::mock::MockDirectory;
use recipient_chips::adapters::Rfc822Tokenizer;
use recipient_chips::config::FieldConfig;
use recipient_chips::models::RecipientEntry;
use recipient_chips::traits::ChipResources;
use recipient_chips::widgets::RecipientField;

/// Accepts anything that looks like it has a domain part.
pub fn at_sign_validator(address: &str) -> bool {
    address.contains('@')
}

/// Builder for a [`RecipientField`] wired to test collaborators.
///
/// Defaults: default config, `@` validator, chip resources present,
/// focused, width unknown (0).
pub struct TestFieldBuilder {
    config: FieldConfig,
    directory: Option<MockDirectory>,
    resources: bool,
    focused: bool,
    width: u32,
}

impl Default for TestFieldBuilder {
    fn default() -> Self {
        Self {
            config: FieldConfig::default(),
            directory: None,
            resources: true,
            focused: true,
            width: 0,
        }
    }
}

impl TestFieldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: FieldConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_directory(mut self, directory: MockDirectory) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn without_resources(mut self) -> Self {
        self.resources = false;
        self
    }

    pub fn unfocused(mut self) -> Self {
        self.focused = false;
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn build(self) -> RecipientField {
        let mut field = RecipientField::new(Rfc822Tokenizer::new(), self.config)
            .expect("Failed to create field")
            .with_validator(at_sign_validator);
        if self.resources {
            field = field.with_chip_resources(ChipResources::default());
        }
        if let Some(directory) = self.directory {
            field = field.with_directory(Arc::new(directory));
        }
        if self.width > 0 {
            field.on_size_changed(self.width, 20).expect("size change failed");
        }
        if self.focused {
            field.on_focus_changed(true).expect("focus change failed");
        }
        field
    }
}

/// Type `text` one character at a time.
pub fn type_text(field: &mut RecipientField, text: &str) {
    let mut buf = [0; 4];
    for c in text.chars() {
        field
            .insert_text(c.encode_utf8(&mut buf))
            .expect("insert failed");
    }
}

/// Display texts of the live chips, in order.
pub fn chip_addresses(field: &RecipientField) -> Vec<String> {
    field
        .chips()
        .iter()
        .map(|chip| chip.entry().address().to_string())
        .collect()
}

pub fn bob_smith() -> RecipientEntry {
    RecipientEntry::resolved(Some("Bob Smith"), "bob@example.com", 42, true).with_photo(vec![0x89u8, b'P', b'N', b'G'])
}

/// Directory knowing Bob Smith.
pub fn directory_with_bob() -> MockDirectory {
    let directory = MockDirectory::new();
    directory.add_entry(bob_smith());
    directory
}
