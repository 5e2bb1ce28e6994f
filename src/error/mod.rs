//! Error handling for the recipient field.
//!
//! - **Hard errors** ([`ChipError`]) propagate synchronously to the caller:
//!   configuration problems, store misuse and lookup failures.
//! - **Soft conditions** ([`SoftCondition`]) are absorbed into field state
//!   (an invalid chip, a dropped result) and only logged and counted.
//!
//! | Category | Description | Recoverable |
//! |----------|-------------|-------------|
//! | Configuration | Missing chip resources, invalid settings | No |
//! | Store | Overlapping or unknown annotations | Yes |
//! | Lookup | Directory failures | Yes |

mod category;
mod chip_error;
mod configuration;
mod soft;
mod store;

pub use crate::traits::LookupError;
pub use category::ErrorCategory;
pub use chip_error::{ChipError, ChipResult};
pub use configuration::ConfigurationError;
pub use soft::SoftCondition;
pub use store::StoreError;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::models::ChipId;

    #[test]
    fn test_error_unification() {
        let config: ChipError = ConfigurationError::MissingChipResources.into();
        let store: ChipError = StoreError::UnknownChip(ChipId(3)).into();
        let lookup: ChipError = LookupError::Cancelled.into();

        assert_eq!(config.category(), ErrorCategory::Configuration);
        assert_eq!(store.category(), ErrorCategory::Store);
        assert_eq!(lookup.category(), ErrorCategory::Lookup);

        for err in [&config, &store, &lookup] {
            assert!(!err.error_code().is_empty());
            assert!(!err.user_message().is_empty());
        }

        assert!(!config.is_recoverable());
        assert!(store.is_recoverable());
    }

    #[test]
    fn test_display_is_transparent() {
        let err: ChipError = StoreError::Overlap { start: 1, end: 4 }.into();
        assert_eq!(err.to_string(), "Range [1, 4) overlaps an existing annotation");
        assert_eq!(
            ChipError::from(ConfigurationError::invalid("chip_limit", "must be positive")).to_string(),
            "Invalid configuration for chip_limit: must be positive"
        );
    }

    #[test]
    fn test_soft_condition_labels() {
        assert_eq!(SoftCondition::StaleResolution.to_string(), "stale_resolution");
    }
}
