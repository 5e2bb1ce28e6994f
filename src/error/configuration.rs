//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A chip was requested but no rendering resources were supplied and
    /// the no-chips fallback is off.
    #[error("Chip resources are missing; supply them or enable the no-chips fallback")]
    MissingChipResources,

    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig { field: String, message: String },
}

impl ConfigurationError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ConfigurationError::InvalidConfig {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigurationError::MissingChipResources => "CFG_MISSING_RESOURCES",
            ConfigurationError::InvalidConfig { .. } => "CFG_INVALID",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            ConfigurationError::MissingChipResources => {
                "Recipients cannot be shown as chips in this field.".to_string()
            }
            ConfigurationError::InvalidConfig { field, message } => {
                format!("Setting '{}' is invalid: {}", field, message)
            }
        }
    }
}
