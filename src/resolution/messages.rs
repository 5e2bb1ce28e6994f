//! Messages delivered from background lookups to the owning thread.

use std::fmt;

use crate::models::{ChipId, RecipientEntry};
use crate::traits::LookupError;

/// Identity of one background job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub(crate) u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// All provisional chips at once.
    Batch,
    /// A short head of the pending chips, applied one by one.
    Individual,
    /// Entries sharing one chip's display name.
    Alternates,
}

/// One chip to resolve, snapshotted off the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTarget {
    pub chip: ChipId,
    pub address: String,
}

/// Results posted by background jobs.
///
/// Nothing here references live annotations; the owning thread re-checks
/// every [`ChipId`] against the store before applying anything.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldMessage {
    /// A batch job finished.
    BatchResolved {
        job: JobId,
        replacements: Vec<(ChipId, RecipientEntry)>,
        unmatched: Vec<ChipId>,
    },
    /// One chip of an individual job resolved.
    ChipResolved {
        job: JobId,
        chip: ChipId,
        entry: RecipientEntry,
    },
    /// Alternates for a chip arrived.
    AlternatesLoaded {
        job: JobId,
        chip: ChipId,
        entries: Vec<RecipientEntry>,
    },
    /// The directory reported an error; affected chips stay provisional.
    LookupFailed { job: JobId, error: LookupError },
    /// An individual job posted its last result.
    JobFinished { job: JobId },
}

impl FieldMessage {
    pub fn job(&self) -> JobId {
        match self {
            FieldMessage::BatchResolved { job, .. }
            | FieldMessage::ChipResolved { job, .. }
            | FieldMessage::AlternatesLoaded { job, .. }
            | FieldMessage::LookupFailed { job, .. }
            | FieldMessage::JobFinished { job } => *job,
        }
    }

    /// True when the job posts nothing after this message.
    pub fn is_final(&self) -> bool {
        !matches!(self, FieldMessage::ChipResolved { .. })
    }
}
