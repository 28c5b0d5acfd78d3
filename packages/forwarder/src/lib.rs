//! Build status forwarder.
//!
//! This crate consumes build events from the executor's event queue and
//! publishes job counts to a metrics sink.
//!
//! # Lifecycle
//!
//! - `Starting` - forwarder created, sink connected or not
//! - `Running` - pulling events, writing a snapshot per job-status event
//! - `Drained` / `Stopped` / `Disabled` - terminal, sink released
//!
//! # Usage
//!
//! ```no_run
//! use build_core::{BuildEvent, JobStatusPayload};
//! use forwarder::{StatusForwarder, event_queue};
//! use sink::SinkConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (events, queue) = event_queue();
//! let handle = StatusForwarder::new(queue, &SinkConfig::from_env()?).spawn();
//!
//! let payload = JobStatusPayload::new().with_queued(["pkg_a"]);
//! events.send(BuildEvent::job_status(payload))?;
//! events.shutdown()?;
//!
//! let report = handle.join().await?;
//! println!("forwarder exited: {}", report.exit);
//! # Ok(())
//! # }
//! ```

mod forwarder;
mod source;
mod state;

pub use forwarder::{ForwarderError, ForwarderHandle, ForwarderReport, StatusForwarder};
pub use source::{EventQueue, EventSender, EventSource, SourceClosed, event_queue};
pub use state::{ExitReason, ForwarderPhase, ForwarderState};

/// Re-export the cancellation token type for owners wiring their own stop signal.
pub use tokio_util::sync::CancellationToken;
