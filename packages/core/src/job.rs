//! Job identifiers and the job-status payload reported by the build executor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identifier of a build job, usually the package name the job builds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Final result of a job the executor has finished with.
///
/// Only the number of completed jobs is ever reported, so a result in any
/// other encoding is kept as raw JSON rather than rejecting the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobResult {
    /// Every stage of the job succeeded.
    Succeeded,
    /// A stage of the job failed.
    Failed,
    /// The job never ran, typically because a dependency failed.
    Abandoned { reason: String },
    /// Any other result encoding.
    #[serde(untagged)]
    Other(serde_json::Value),
}

/// The executor's view of every job at one instant.
///
/// Only the sizes of these collections are reported as metrics, the
/// identifiers are kept so the last-seen state can be inspected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobStatusPayload {
    /// Jobs whose dependencies are satisfied and are waiting for a worker.
    pub queued: Vec<JobId>,
    /// Jobs currently being executed.
    pub active: Vec<JobId>,
    /// Finished jobs and their results.
    pub completed: BTreeMap<JobId, JobResult>,
    /// Jobs still waiting on dependencies.
    pub pending: Vec<JobId>,
}

impl JobStatusPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queued<I, J>(mut self, jobs: I) -> Self
    where
        I: IntoIterator<Item = J>,
        J: Into<JobId>,
    {
        self.queued = jobs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_active<I, J>(mut self, jobs: I) -> Self
    where
        I: IntoIterator<Item = J>,
        J: Into<JobId>,
    {
        self.active = jobs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_pending<I, J>(mut self, jobs: I) -> Self
    where
        I: IntoIterator<Item = J>,
        J: Into<JobId>,
    {
        self.pending = jobs.into_iter().map(Into::into).collect();
        self
    }

    /// Record a finished job.
    pub fn with_completed(mut self, job: impl Into<JobId>, result: JobResult) -> Self {
        self.completed.insert(job.into(), result);
        self
    }

    /// Jobs that are queued, running or waiting on dependencies.
    pub fn outstanding(&self) -> usize {
        self.queued.len() + self.active.len() + self.pending.len()
    }

    /// True once nothing is queued, active or pending.
    ///
    /// Completed jobs never hold a build open.
    pub fn is_quiescent(&self) -> bool {
        self.outstanding() == 0
    }
}
