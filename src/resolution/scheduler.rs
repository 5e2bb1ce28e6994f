//! Background side of chip resolution.
//!
//! Jobs run on the tokio runtime and post [`FieldMessage`]s to an unbounded
//! queue that only the owning field drains. Cancellation is cooperative: a
//! job checks its flag before posting, and the field drops anything from a
//! job that is no longer current.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::messages::{FieldMessage, JobId, JobKind, LookupTarget};
use crate::models::{normalize_address, ChipId};
use crate::traits::{lookup_addresses, DirectoryLookup};

/// A running background job.
#[derive(Debug)]
pub struct JobHandle {
    id: JobId,
    kind: JobKind,
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl JobHandle {
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// Ask the job to stop posting results.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

pub struct ResolutionScheduler {
    directory: Option<Arc<dyn DirectoryLookup>>,
    sender: UnboundedSender<FieldMessage>,
    batch: Option<JobHandle>,
    individual: Option<JobHandle>,
    alternates: Option<JobHandle>,
    next_job: u64,
    max_lookups: usize,
}

impl ResolutionScheduler {
    pub fn new(sender: UnboundedSender<FieldMessage>, max_lookups: usize) -> Self {
        Self {
            directory: None,
            sender,
            batch: None,
            individual: None,
            alternates: None,
            next_job: 0,
            max_lookups,
        }
    }

    pub fn set_directory(&mut self, directory: Arc<dyn DirectoryLookup>) {
        self.directory = Some(directory);
    }

    pub fn has_directory(&self) -> bool {
        self.directory.is_some()
    }

    pub fn set_max_lookups(&mut self, max_lookups: usize) {
        self.max_lookups = max_lookups;
    }

    /// Resolve every target in one lookup.
    ///
    /// Cancels the in-flight individual job and supersedes an in-flight batch.
    pub fn start_batch(&mut self, targets: Vec<LookupTarget>) -> Option<JobId> {
        if let Some(individual) = self.individual.take() {
            debug!("Batch resolution cancels individual {}", individual.id);
            individual.cancel();
        }
        if let Some(batch) = self.batch.take() {
            debug!("Batch resolution supersedes {}", batch.id);
            batch.cancel();
        }
        if targets.is_empty() {
            return None;
        }

        let directory = self.directory.clone()?;
        let max_lookups = self.max_lookups;
        let handle = self.spawn(JobKind::Batch, move |job, cancelled, sender| async move {
            run_batch(directory, targets, max_lookups, job, cancelled, sender).await;
        })?;
        let id = handle.id;
        self.batch = Some(handle);
        Some(id)
    }

    /// Resolve targets one by one, posting each result as it is known.
    ///
    /// Never cancels a batch job.
    pub fn start_individual(&mut self, targets: Vec<LookupTarget>) -> Option<JobId> {
        if let Some(previous) = self.individual.take() {
            previous.cancel();
        }
        if targets.is_empty() {
            return None;
        }

        let directory = self.directory.clone()?;
        let max_lookups = self.max_lookups;
        let handle = self.spawn(JobKind::Individual, move |job, cancelled, sender| async move {
            run_individual(directory, targets, max_lookups, job, cancelled, sender).await;
        })?;
        let id = handle.id;
        self.individual = Some(handle);
        Some(id)
    }

    /// Look up entries sharing `display_name`.
    pub fn start_alternates(&mut self, chip: ChipId, display_name: String) -> Option<JobId> {
        if let Some(previous) = self.alternates.take() {
            previous.cancel();
        }

        let directory = self.directory.clone()?;
        let handle = self.spawn(JobKind::Alternates, move |job, cancelled, sender| async move {
            let message = match directory.alternates(&display_name).await {
                Ok(entries) => FieldMessage::AlternatesLoaded { job, chip, entries },
                Err(error) => FieldMessage::LookupFailed { job, error },
            };
            if !cancelled.load(Ordering::SeqCst) {
                let _ = sender.send(message);
            }
        })?;
        let id = handle.id;
        self.alternates = Some(handle);
        Some(id)
    }

    fn spawn<F, Fut>(&mut self, kind: JobKind, job_fn: F) -> Option<JobHandle>
    where
        F: FnOnce(JobId, Arc<AtomicBool>, UnboundedSender<FieldMessage>) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("No async runtime available, skipping {:?} resolution", kind);
                return None;
            }
        };

        self.next_job += 1;
        let id = JobId(self.next_job);
        let cancelled = Arc::new(AtomicBool::new(false));
        let task = runtime.spawn(job_fn(id, cancelled.clone(), self.sender.clone()));
        info!("Started {:?} resolution {}", kind, id);

        Some(JobHandle {
            id,
            kind,
            cancelled,
            task,
        })
    }

    /// True when `job` is the live job of its kind.
    pub fn is_current(&self, job: JobId) -> bool {
        self.handles().any(|handle| handle.id == job)
    }

    pub fn current(&self, kind: JobKind) -> Option<JobId> {
        match kind {
            JobKind::Batch => self.batch.as_ref(),
            JobKind::Individual => self.individual.as_ref(),
            JobKind::Alternates => self.alternates.as_ref(),
        }
        .map(JobHandle::id)
    }

    /// Forget a job that posted its final message.
    pub fn finish(&mut self, job: JobId) {
        for slot in [&mut self.batch, &mut self.individual, &mut self.alternates] {
            if slot.as_ref().is_some_and(|handle| handle.id == job) {
                debug!("Resolution {} finished", job);
                *slot = None;
            }
        }
    }

    /// True while a job task is still running.
    pub fn has_running_jobs(&self) -> bool {
        self.handles().any(JobHandle::is_running)
    }

    /// True while any job is registered, running or not yet drained.
    pub fn in_flight(&self) -> bool {
        self.handles().next().is_some()
    }

    pub fn cancel_all(&mut self) {
        for slot in [&mut self.batch, &mut self.individual, &mut self.alternates] {
            if let Some(handle) = slot.take() {
                handle.cancel();
            }
        }
    }

    fn handles(&self) -> impl Iterator<Item = &JobHandle> {
        [&self.batch, &self.individual, &self.alternates]
            .into_iter()
            .flatten()
    }
}

impl Drop for ResolutionScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

async fn run_batch(
    directory: Arc<dyn DirectoryLookup>,
    targets: Vec<LookupTarget>,
    max_lookups: usize,
    job: JobId,
    cancelled: Arc<AtomicBool>,
    sender: UnboundedSender<FieldMessage>,
) {
    let addresses: Vec<String> = targets.iter().map(|target| target.address.clone()).collect();
    let result = lookup_addresses(directory.as_ref(), &addresses, max_lookups).await;

    if cancelled.load(Ordering::SeqCst) {
        debug!("Dropping results of cancelled {}", job);
        return;
    }

    let message = match result {
        Ok(result) => {
            let mut replacements = Vec::new();
            let mut unmatched = Vec::new();
            for target in targets {
                match result.matches.get(&normalize_address(&target.address)) {
                    Some(entry) => replacements.push((target.chip, entry.clone())),
                    None => unmatched.push(target.chip),
                }
            }
            FieldMessage::BatchResolved {
                job,
                replacements,
                unmatched,
            }
        }
        Err(error) => FieldMessage::LookupFailed { job, error },
    };
    let _ = sender.send(message);
}

async fn run_individual(
    directory: Arc<dyn DirectoryLookup>,
    targets: Vec<LookupTarget>,
    max_lookups: usize,
    job: JobId,
    cancelled: Arc<AtomicBool>,
    sender: UnboundedSender<FieldMessage>,
) {
    let addresses: Vec<String> = targets.iter().map(|target| target.address.clone()).collect();
    let result = match lookup_addresses(directory.as_ref(), &addresses, max_lookups).await {
        Ok(result) => result,
        Err(error) => {
            if !cancelled.load(Ordering::SeqCst) {
                let _ = sender.send(FieldMessage::LookupFailed { job, error });
            }
            return;
        }
    };

    for target in targets {
        if cancelled.load(Ordering::SeqCst) {
            debug!("Individual {} cancelled, dropping remaining results", job);
            return;
        }
        if let Some(entry) = result.matches.get(&normalize_address(&target.address)) {
            let _ = sender.send(FieldMessage::ChipResolved {
                job,
                chip: target.chip,
                entry: entry.clone(),
            });
        }
    }

    if !cancelled.load(Ordering::SeqCst) {
        let _ = sender.send(FieldMessage::JobFinished { job });
    }
}
