//! Worker-local state of a status forwarder.

use build_core::{JobStatusPayload, MetricSnapshot};
use tokio_util::sync::CancellationToken;

/// Lifecycle of a forwarder.
///
/// `Starting` moves to `Disabled` when there is no sink, otherwise to
/// `Running`, which ends in `Drained` or `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwarderPhase {
    Starting,
    Running,
    /// No job is queued, active or pending.
    Drained,
    /// Stopped by request, sentinel or a closed source.
    Stopped,
    /// No sink was available, nothing ran.
    Disabled,
}

impl std::fmt::Display for ForwarderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForwarderPhase::Starting => write!(f, "starting"),
            ForwarderPhase::Running => write!(f, "running"),
            ForwarderPhase::Drained => write!(f, "drained"),
            ForwarderPhase::Stopped => write!(f, "stopped"),
            ForwarderPhase::Disabled => write!(f, "disabled"),
        }
    }
}

/// Why a forwarder's loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// A job-status event showed no outstanding work.
    Drained,
    /// The owner requested a stop.
    StopRequested,
    /// The shutdown sentinel was received.
    Sentinel,
    /// The event source closed.
    SourceClosed,
    /// There was no sink, so the loop never ran.
    Disabled,
}

impl ExitReason {
    /// Terminal phase reached through this exit.
    pub fn phase(&self) -> ForwarderPhase {
        match self {
            ExitReason::Drained => ForwarderPhase::Drained,
            ExitReason::StopRequested | ExitReason::Sentinel | ExitReason::SourceClosed => {
                ForwarderPhase::Stopped
            }
            ExitReason::Disabled => ForwarderPhase::Disabled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::Drained => "drained",
            ExitReason::StopRequested => "stop requested",
            ExitReason::Sentinel => "shutdown sentinel",
            ExitReason::SourceClosed => "source closed",
            ExitReason::Disabled => "disabled",
        }
    }
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State owned by the forwarder's worker task.
pub struct ForwarderState {
    /// Job collections from the most recent job-status event.
    last_seen: JobStatusPayload,
    /// Tripped by the owner to request a graceful stop.
    stop: CancellationToken,
}

impl ForwarderState {
    /// Create a state with empty collections.
    pub fn new(stop: CancellationToken) -> Self {
        Self {
            last_seen: JobStatusPayload::default(),
            stop,
        }
    }

    /// Whether the loop should keep going.
    pub fn is_running(&self) -> bool {
        !self.stop.is_cancelled()
    }

    pub fn stop_token(&self) -> &CancellationToken {
        &self.stop
    }

    pub fn last_seen(&self) -> &JobStatusPayload {
        &self.last_seen
    }

    /// Snapshot of the last-seen collections.
    pub fn last_snapshot(&self) -> MetricSnapshot {
        MetricSnapshot::from_payload(&self.last_seen)
    }

    /// Replace the last-seen collections and snapshot them.
    pub fn apply(&mut self, payload: JobStatusPayload) -> MetricSnapshot {
        self.last_seen = payload;
        self.last_snapshot()
    }

    /// No job is queued, active or pending in the last-seen collections.
    pub fn is_quiescent(&self) -> bool {
        self.last_seen.is_quiescent()
    }
}
