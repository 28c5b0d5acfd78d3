//! Events emitted by the build executor.

use serde::{Deserialize, Serialize};

use crate::{JobId, JobStatusPayload};

/// A notification from the build executor.
///
/// Events serialize as a flat object tagged by `event_id`. Identifiers this
/// crate does not know decode to [`BuildEvent::Other`] so a newer executor
/// never breaks a consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildEvent {
    /// Snapshot of every job's state.
    JobStatus(JobStatusPayload),

    // Job lifecycle
    /// A job's dependencies were satisfied.
    QueuedJob { job_id: JobId },
    /// A worker picked a job up.
    StartedJob { job_id: JobId },
    /// A job ran to completion.
    FinishedJob { job_id: JobId, succeeded: bool },
    /// A job will never run.
    AbandonedJob { job_id: JobId, reason: String },

    // Stage lifecycle
    /// A stage of a job started.
    StartedStage { job_id: JobId, stage_label: String },
    /// A stage of a job finished.
    FinishedStage {
        job_id: JobId,
        stage_label: String,
        succeeded: bool,
    },
    /// Progress report from a running stage.
    StageProgress {
        job_id: JobId,
        stage_label: String,
        percent: f64,
    },

    // Output
    /// A line of standard output from a stage.
    Stdout {
        job_id: JobId,
        stage_label: String,
        data: String,
    },
    /// A line of standard error from a stage.
    Stderr {
        job_id: JobId,
        stage_label: String,
        data: String,
    },
    /// Free-form message from the executor.
    Message { msg: String },

    /// Any event identifier not listed above.
    #[serde(other)]
    Other,
}

impl BuildEvent {
    /// Build a `JOB_STATUS` event.
    pub fn job_status(payload: JobStatusPayload) -> Self {
        BuildEvent::JobStatus(payload)
    }

    /// The wire identifier of this event.
    pub fn event_id(&self) -> &'static str {
        match self {
            BuildEvent::JobStatus(_) => "JOB_STATUS",
            BuildEvent::QueuedJob { .. } => "QUEUED_JOB",
            BuildEvent::StartedJob { .. } => "STARTED_JOB",
            BuildEvent::FinishedJob { .. } => "FINISHED_JOB",
            BuildEvent::AbandonedJob { .. } => "ABANDONED_JOB",
            BuildEvent::StartedStage { .. } => "STARTED_STAGE",
            BuildEvent::FinishedStage { .. } => "FINISHED_STAGE",
            BuildEvent::StageProgress { .. } => "STAGE_PROGRESS",
            BuildEvent::Stdout { .. } => "STDOUT",
            BuildEvent::Stderr { .. } => "STDERR",
            BuildEvent::Message { .. } => "MESSAGE",
            BuildEvent::Other => "OTHER",
        }
    }

    /// Get a short description of this event for logging.
    pub fn description(&self) -> String {
        match self {
            BuildEvent::JobStatus(status) => format!(
                "Job status: {} queued, {} active, {} completed, {} pending",
                status.queued.len(),
                status.active.len(),
                status.completed.len(),
                status.pending.len()
            ),
            BuildEvent::QueuedJob { job_id } => format!("Job {} queued", job_id),
            BuildEvent::StartedJob { job_id } => format!("Job {} started", job_id),
            BuildEvent::FinishedJob { job_id, succeeded } => {
                let outcome = if *succeeded { "succeeded" } else { "failed" };
                format!("Job {} {}", job_id, outcome)
            }
            BuildEvent::AbandonedJob { job_id, reason } => {
                format!("Job {} abandoned: {}", job_id, reason)
            }
            BuildEvent::StartedStage {
                job_id,
                stage_label,
            } => format!("Job {} started stage {}", job_id, stage_label),
            BuildEvent::FinishedStage {
                job_id,
                stage_label,
                ..
            } => format!("Job {} finished stage {}", job_id, stage_label),
            BuildEvent::StageProgress {
                job_id,
                stage_label,
                percent,
            } => format!("Job {} stage {} at {:.0}%", job_id, stage_label, percent),
            BuildEvent::Stdout { job_id, .. } => format!("Job {} stdout", job_id),
            BuildEvent::Stderr { job_id, .. } => format!("Job {} stderr", job_id),
            BuildEvent::Message { msg } => msg.clone(),
            BuildEvent::Other => "Unrecognized event".to_string(),
        }
    }
}
