//! Trait abstractions for the collaborators the engine depends on.
//!
//! # Traits
//!
//! - [`Tokenizer`] - splits delimited address text into tokens
//! - [`Validator`] - validates and repairs addresses
//! - [`DirectoryLookup`] - resolves addresses to directory entries
//! - [`RenderSurface`] - draws chips for the painting path
//! - [`TextStorage`] - the character storage a field edits

pub mod directory;
pub mod render;
pub mod text;
pub mod tokenizer;

pub use directory::{lookup_addresses, DirectoryLookup, LookupError, LookupResult};
pub use render::{ChipBounds, ChipResources, RenderRequest, RenderSurface, Rendered};
pub use text::TextStorage;
pub use tokenizer::{Tokenizer, Validator};
