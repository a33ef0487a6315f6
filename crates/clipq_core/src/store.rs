use indexmap::IndexMap;

use crate::{Job, JobId, JobPatch, JobStatus};

/// A state transition request for [`QueueStore::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// Install a full snapshot. Authoritative for every job it names.
    ReplaceAll(Vec<Job>),
    Insert(Job),
    Delete(JobId),
    Patch(JobPatch),
    SetCurrent(Option<JobId>),
    SetProcessing(bool),
    ClearCompleted,
    /// Optimistically claim the processing slot for a job before the backend confirms.
    BeginProcessing(JobId),
    /// Roll back a claim made with `BeginProcessing`.
    AbortProcessing,
}

/// Canonical in-memory queue: ordered jobs, the in-flight pointer and the
/// processing flag.
///
/// `current` is a weak reference kept as an id. Every transition that removes
/// jobs re-checks it, so it always names a job that is in `jobs`.
#[derive(Debug, Clone, Default)]
pub struct QueueStore {
    jobs: IndexMap<JobId, Job>,
    current: Option<JobId>,
    is_processing: bool,
}

// Queue order is part of the state; IndexMap's own equality ignores it.
impl PartialEq for QueueStore {
    fn eq(&self, other: &Self) -> bool {
        self.current == other.current
            && self.is_processing == other.is_processing
            && self.jobs.iter().eq(other.jobs.iter())
    }
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::ReplaceAll(jobs) => {
                let mut next = IndexMap::with_capacity(jobs.len());
                for job in jobs {
                    // First occurrence wins if a snapshot repeats an id.
                    next.entry(job.id.clone()).or_insert(job);
                }
                self.jobs = next;
                self.revalidate_current();
            }
            StoreEvent::Insert(job) => {
                self.jobs.entry(job.id.clone()).or_insert(job);
            }
            StoreEvent::Delete(id) => {
                self.jobs.shift_remove(&id);
                self.revalidate_current();
            }
            StoreEvent::Patch(patch) => {
                if let Some(job) = self.jobs.get_mut(&patch.id) {
                    job.merge(patch);
                }
            }
            StoreEvent::SetCurrent(id) => {
                self.current = id.filter(|id| self.jobs.contains_key(id));
            }
            StoreEvent::SetProcessing(flag) => {
                self.is_processing = flag;
            }
            StoreEvent::ClearCompleted => {
                self.jobs.retain(|_, job| job.status != JobStatus::Completed);
                self.revalidate_current();
            }
            StoreEvent::BeginProcessing(id) => {
                if self.jobs.contains_key(&id) {
                    self.is_processing = true;
                    self.current = Some(id);
                }
            }
            StoreEvent::AbortProcessing => {
                self.is_processing = false;
                self.current = None;
            }
        }
    }

    pub fn jobs(&self) -> impl ExactSizeIterator<Item = &Job> {
        self.jobs.values()
    }

    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs.get(id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn current_id(&self) -> Option<&JobId> {
        self.current.as_ref()
    }

    pub fn current_job(&self) -> Option<&Job> {
        self.current.as_ref().and_then(|id| self.jobs.get(id))
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    /// True while any job is pending or processing.
    pub fn has_active_jobs(&self) -> bool {
        self.jobs.values().any(|job| job.status.is_active())
    }

    pub fn first_pending<'a>(&'a self, mut skip: impl FnMut(&JobId) -> bool) -> Option<&'a Job> {
        self.jobs
            .values()
            .find(|job| job.status == JobStatus::Pending && !skip(&job.id))
    }

    fn revalidate_current(&mut self) {
        if let Some(id) = &self.current {
            if !self.jobs.contains_key(id) {
                self.current = None;
            }
        }
    }
}
