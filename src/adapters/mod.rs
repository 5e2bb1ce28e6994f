//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`Rfc822Tokenizer`] - comma/semicolon separated mail address tokenizer
//! - [`EmailValidator`] - regex based address validation and repair
//! - [`StaticDirectory`] - directory backed by a JSON contact list
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockDirectory`] - scripted lookups, gated completion
//! - [`mock::MockRenderSurface`] - text drawables

pub mod email_validator;
pub mod mock;
pub mod rfc822;
pub mod static_directory;

pub use email_validator::EmailValidator;
pub use mock::{MockDirectory, MockRenderSurface};
pub use rfc822::Rfc822Tokenizer;
pub use static_directory::StaticDirectory;
