//! Background task that turns job-status events into metric snapshots.

use build_core::{BuildEvent, MetricSnapshot};
use sink::{InfluxClient, MetricsSink, SinkConfig};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::source::{EventSource, SourceClosed};
use crate::state::{ExitReason, ForwarderPhase, ForwarderState};

/// Summary of a finished forwarder run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwarderReport {
    /// Why the loop ended.
    pub exit: ExitReason,
    /// Events taken from the source, sentinel excluded.
    pub events_seen: u64,
    /// Snapshots the sink accepted.
    pub snapshots_written: u64,
    /// Snapshots the sink rejected.
    pub write_failures: u64,
    /// Most recent snapshot built, written or not.
    pub last_snapshot: Option<MetricSnapshot>,
}

impl ForwarderReport {
    fn new(exit: ExitReason) -> Self {
        Self {
            exit,
            events_seen: 0,
            snapshots_written: 0,
            write_failures: 0,
            last_snapshot: None,
        }
    }

    /// Terminal phase the forwarder ended in.
    pub fn phase(&self) -> ForwarderPhase {
        self.exit.phase()
    }
}

/// Errors surfaced to the owner of a spawned forwarder.
#[derive(Debug, thiserror::Error)]
pub enum ForwarderError {
    #[error("Forwarder task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Forwards job counts from a build event source to a metrics sink.
///
/// A forwarder without a sink is disabled: running it returns at once
/// without touching the source.
pub struct StatusForwarder<Src, S = InfluxClient> {
    source: Src,
    sink: Option<S>,
    stop: CancellationToken,
}

impl<Src: EventSource + 'static> StatusForwarder<Src, InfluxClient> {
    /// Connect to the configured InfluxDB server.
    ///
    /// Never fails: if no client can be built the forwarder is disabled.
    pub fn new(source: Src, config: &SinkConfig) -> Self {
        Self::with_sink(source, sink::connect(config))
    }
}

impl<Src, S> StatusForwarder<Src, S>
where
    Src: EventSource + 'static,
    S: MetricsSink + 'static,
{
    /// Create a forwarder around an already connected sink.
    pub fn with_sink(source: Src, sink: Option<S>) -> Self {
        Self {
            source,
            sink,
            stop: CancellationToken::new(),
        }
    }

    /// Whether a sink is attached.
    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Token that stops this forwarder when cancelled.
    pub fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    /// Request a graceful stop.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    /// Run the forwarder on its own task.
    pub fn spawn(self) -> ForwarderHandle {
        let stop = self.stop.clone();
        let task = tokio::spawn(self.run());
        ForwarderHandle { stop, task }
    }

    /// Consume events until the source is drained, closed or stopped.
    ///
    /// Sink failures never escape this loop, the worst outcome is an
    /// early exit.
    pub async fn run(self) -> ForwarderReport {
        let Self { source, sink, stop } = self;

        let Some(mut sink) = sink else {
            tracing::info!("Metrics sink unavailable, status forwarder disabled");
            return ForwarderReport::new(ExitReason::Disabled);
        };

        tracing::info!("Starting status forwarder");
        let mut state = ForwarderState::new(stop);

        let mut report = ForwarderReport::new(ExitReason::Drained);
        let exit = forward(&source, &mut sink, &mut state, &mut report).await;

        sink.close().await;
        report.exit = exit;

        tracing::info!(
            "Status forwarder {} ({}): {} events, {} snapshots written, {} failed",
            exit.phase(),
            exit,
            report.events_seen,
            report.snapshots_written,
            report.write_failures
        );
        report
    }
}

async fn forward<Src, S>(
    source: &Src,
    sink: &mut S,
    state: &mut ForwarderState,
    report: &mut ForwarderReport,
) -> ExitReason
where
    Src: EventSource,
    S: MetricsSink,
{
    loop {
        if !state.is_running() {
            return ExitReason::StopRequested;
        }

        let received = tokio::select! {
            biased;
            _ = state.stop_token().cancelled() => return ExitReason::StopRequested,
            received = source.recv() => received,
        };

        let event = match received {
            Ok(Some(event)) => event,
            Ok(None) => return ExitReason::Sentinel,
            Err(SourceClosed) => return ExitReason::SourceClosed,
        };
        report.events_seen += 1;

        let payload = match event {
            BuildEvent::JobStatus(payload) => payload,
            other => {
                tracing::debug!("Ignoring {} event: {}", other.event_id(), other.description());
                continue;
            }
        };

        let snapshot = state.apply(payload);
        match sink.write_points(std::slice::from_ref(&snapshot)).await {
            Ok(()) => {
                report.snapshots_written += 1;
                tracing::debug!(
                    "Sent job counts: {} queued, {} active, {} completed, {} pending",
                    snapshot.queued,
                    snapshot.active,
                    snapshot.completed,
                    snapshot.pending
                );
            }
            Err(e) => {
                report.write_failures += 1;
                tracing::warn!("Cannot send metrics: {}", e);
            }
        }
        report.last_snapshot = Some(snapshot);

        if state.is_quiescent() {
            return ExitReason::Drained;
        }
    }
}

/// Owner's handle to a spawned forwarder.
pub struct ForwarderHandle {
    stop: CancellationToken,
    task: JoinHandle<ForwarderReport>,
}

impl ForwarderHandle {
    /// Request a graceful stop. Takes effect even while the forwarder is
    /// waiting for an event; an in-flight write is allowed to finish.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    /// Token that stops the forwarder when cancelled, for wiring to a
    /// signal handler.
    pub fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    /// Whether the forwarder task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the forwarder to exit.
    pub async fn join(self) -> Result<ForwarderReport, ForwarderError> {
        Ok(self.task.await?)
    }

    /// Request a stop and wait for the forwarder to exit.
    pub async fn shutdown(self) -> Result<ForwarderReport, ForwarderError> {
        self.stop();
        self.join().await
    }
}
