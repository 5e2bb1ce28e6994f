//! Recipient chips - chip/text reconciliation for recipient input fields
//!
//! A recipient field holds delimited address text; committed tokens are
//! overlaid with chip annotations that track their text ranges through
//! every edit, fold into a "+N more" summary when the field loses focus,
//! and get upgraded in place when a directory lookup resolves them.
//!
//! This library exposes modules for use in integration tests and embedders.

pub mod adapters;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod prelude;
pub mod resolution;
pub mod store;
pub mod text;
pub mod traits;
pub mod widgets;
