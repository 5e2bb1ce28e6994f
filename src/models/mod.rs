//! Value types shared by the annotation store, the commit engine and the
//! resolution scheduler.

pub mod chip;
pub mod entry;
pub mod token;

pub use chip::{ChipAnnotation, ChipId, OverflowSummary, TextRange};
pub use entry::{
    better_entry, is_better, normalize_address, ContactId, RecipientEntry, GENERATED_CONTACT,
    INVALID_CONTACT,
};
pub use token::AddressToken;
