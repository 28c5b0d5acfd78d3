//! Core domain types for the build status forwarder.
//!
//! This crate contains the types shared by the sink and the forwarder:
//! - JobId, JobResult and JobStatusPayload for the executor's job view
//! - BuildEvent for the executor's event stream
//! - MetricSnapshot for the counts written to the metrics sink

mod events;
mod job;
mod snapshot;

pub use events::BuildEvent;
pub use job::{JobId, JobResult, JobStatusPayload};
pub use snapshot::{MEASUREMENT, MetricSnapshot};
