//! Field configuration.
//!
//! Loaded from JSON, from the environment, or built in code:
//!
//! ```ignore
//! use recipient_chips::config::FieldConfig;
//!
//! let config = FieldConfig::default()
//!     .with_chip_limit(3)
//!     .with_more_template("+%d others");
//! ```

use serde::Deserialize;

use crate::error::ConfigurationError;

/// Placeholder replaced by the folded chip count in the summary label.
pub const COUNT_PLACEHOLDER: &str = "%d";

pub const ENV_CHIP_LIMIT: &str = "CHIPS_LIMIT";
pub const ENV_MAX_LOOKUPS: &str = "CHIPS_MAX_LOOKUPS";
pub const ENV_NO_CHIPS: &str = "CHIPS_NO_CHIPS";

/// Configuration for a [`RecipientField`](crate::widgets::RecipientField).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Chips left visible when the field is collapsed (default: 2)
    pub chip_limit: usize,
    /// Most addresses sent to the directory in one job (default: 50)
    pub max_lookups: usize,
    /// A paste with more pending tokens than this falls back to plain text (default: 50)
    pub max_chips_parsed: usize,
    /// Plain delimited text only, no chips (default: false)
    pub no_chips: bool,
    /// Collapse on focus loss (default: true)
    pub should_shrink: bool,
    /// Summary label template, `%d` is the folded count (default: "+%d more")
    pub more_template: String,
    /// Minimum token length before a commit is considered (default: 1)
    pub filter_threshold: usize,
    /// Horizontal padding taken off each side of the chip width budget (default: 0)
    pub chip_padding: u32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            chip_limit: 2,
            max_lookups: 50,
            max_chips_parsed: 50,
            no_chips: false,
            should_shrink: true,
            more_template: "+%d more".to_string(),
            filter_threshold: 1,
            chip_padding: 0,
        }
    }
}

impl FieldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chip_limit(mut self, limit: usize) -> Self {
        self.chip_limit = limit;
        self
    }

    pub fn with_max_lookups(mut self, max: usize) -> Self {
        self.max_lookups = max;
        self
    }

    pub fn with_max_chips_parsed(mut self, max: usize) -> Self {
        self.max_chips_parsed = max;
        self
    }

    pub fn with_no_chips(mut self, no_chips: bool) -> Self {
        self.no_chips = no_chips;
        self
    }

    pub fn with_should_shrink(mut self, shrink: bool) -> Self {
        self.should_shrink = shrink;
        self
    }

    pub fn with_more_template(mut self, template: impl Into<String>) -> Self {
        self.more_template = template.into();
        self
    }

    pub fn with_filter_threshold(mut self, threshold: usize) -> Self {
        self.filter_threshold = threshold;
        self
    }

    pub fn with_chip_padding(mut self, padding: u32) -> Self {
        self.chip_padding = padding;
        self
    }

    /// Format the summary label for `count` folded chips.
    pub fn more_label(&self, count: usize) -> String {
        self.more_template.replace(COUNT_PLACEHOLDER, &count.to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.more_template.contains(COUNT_PLACEHOLDER) {
            return Err(ConfigurationError::invalid(
                "more_template",
                format!("template must contain {}", COUNT_PLACEHOLDER),
            ));
        }
        if self.max_lookups == 0 {
            return Err(ConfigurationError::invalid("max_lookups", "must be positive"));
        }
        Ok(())
    }

    /// Parse and validate a JSON document. Missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigurationError::invalid("json", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with `CHIPS_LIMIT`, `CHIPS_MAX_LOOKUPS` and
    /// `CHIPS_NO_CHIPS` from the environment.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values found through `lookup`, then validate.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_CHIP_LIMIT) {
            self.chip_limit = parse_number(ENV_CHIP_LIMIT, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_LOOKUPS) {
            self.max_lookups = parse_number(ENV_MAX_LOOKUPS, &value)?;
        }
        if let Some(value) = lookup(ENV_NO_CHIPS) {
            self.no_chips = matches!(value.trim(), "1" | "true" | "yes");
        }
        self.validate()?;
        Ok(self)
    }
}

fn parse_number(key: &str, value: &str) -> Result<usize, ConfigurationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigurationError::invalid(key, format!("'{}' is not a number", value)))
}
