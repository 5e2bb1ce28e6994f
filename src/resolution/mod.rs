//! Asynchronous resolution of provisional chips.
//!
//! The [`ResolutionScheduler`] owns the background jobs; results come back
//! as [`FieldMessage`]s that the field applies on its owning thread.

pub mod messages;
pub mod scheduler;

pub use messages::{FieldMessage, JobId, JobKind, LookupTarget};
pub use scheduler::{JobHandle, ResolutionScheduler};
