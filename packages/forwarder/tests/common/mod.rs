#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use build_core::{BuildEvent, JobId, JobStatusPayload, MetricSnapshot};
use forwarder::{EventSource, SourceClosed};
use sink::{MetricsSink, SinkError};

/// Everything a [`RecordingSink`] has been asked to do.
#[derive(Debug, Default)]
pub struct SinkLog {
    pub database: Option<String>,
    pub writes: Vec<MetricSnapshot>,
    pub attempts: usize,
    pub closes: usize,
    /// Attempts (0-based) that fail instead of recording.
    pub fail_attempts: Vec<usize>,
}

/// In-memory sink shared with the test through an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    log: Arc<Mutex<SinkLog>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the given write attempts.
    pub fn failing_on(attempts: &[usize]) -> Self {
        let sink = Self::new();
        sink.with_log(|log| log.fail_attempts = attempts.to_vec());
        sink
    }

    pub fn with_log<R>(&self, f: impl FnOnce(&mut SinkLog) -> R) -> R {
        let mut log = self.log.lock().expect("sink log poisoned");
        f(&mut log)
    }

    pub fn written_counts(&self) -> Vec<(u64, u64, u64, u64)> {
        self.with_log(|log| log.writes.iter().map(MetricSnapshot::counts).collect())
    }

    pub fn closes(&self) -> usize {
        self.with_log(|log| log.closes)
    }
}

impl MetricsSink for RecordingSink {
    fn select_database(&mut self, database: &str) -> Result<(), SinkError> {
        self.with_log(|log| log.database = Some(database.to_string()));
        Ok(())
    }

    async fn write_points(&mut self, points: &[MetricSnapshot]) -> Result<(), SinkError> {
        self.with_log(|log| {
            let attempt = log.attempts;
            log.attempts += 1;
            if log.closes > 0 {
                return Err(SinkError::Closed);
            }
            if log.fail_attempts.contains(&attempt) {
                return Err(SinkError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            log.writes.extend_from_slice(points);
            Ok(())
        })
    }

    async fn close(&mut self) {
        self.with_log(|log| log.closes += 1);
    }
}

/// Wraps a source and counts `recv` calls.
pub struct CountingSource<Src> {
    inner: Src,
    calls: Arc<AtomicUsize>,
}

impl<Src> CountingSource<Src> {
    pub fn new(inner: Src) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl<Src: EventSource> EventSource for CountingSource<Src> {
    async fn recv(&self) -> Result<Option<BuildEvent>, SourceClosed> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.recv().await
    }
}

/// Job-status event with the given job names in each collection.
pub fn status(queued: &[&str], active: &[&str], completed: &[&str], pending: &[&str]) -> BuildEvent {
    let mut payload = JobStatusPayload::new()
        .with_queued(queued.iter().copied())
        .with_active(active.iter().copied())
        .with_pending(pending.iter().copied());
    for job in completed {
        payload = payload.with_completed(*job, build_core::JobResult::Succeeded);
    }
    BuildEvent::job_status(payload)
}

pub fn started(job: &str) -> BuildEvent {
    BuildEvent::StartedJob {
        job_id: JobId::from(job),
    }
}

pub fn message(msg: &str) -> BuildEvent {
    BuildEvent::Message {
        msg: msg.to_string(),
    }
}
