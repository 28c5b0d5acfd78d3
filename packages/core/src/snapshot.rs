//! Aggregate job counts published to the metrics sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::JobStatusPayload;

/// Measurement name every snapshot is written under.
pub const MEASUREMENT: &str = "catkin_build";

/// Job counts at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// Number of queued jobs.
    pub queued: u64,
    /// Number of active jobs.
    pub active: u64,
    /// Number of completed jobs.
    pub completed: u64,
    /// Number of pending jobs.
    pub pending: u64,
    /// When the counts were taken.
    pub taken_at: DateTime<Utc>,
}

impl MetricSnapshot {
    /// Count the collections of a job-status payload.
    pub fn from_payload(payload: &JobStatusPayload) -> Self {
        Self {
            queued: payload.queued.len() as u64,
            active: payload.active.len() as u64,
            completed: payload.completed.len() as u64,
            pending: payload.pending.len() as u64,
            taken_at: Utc::now(),
        }
    }

    /// Override the snapshot time.
    pub fn at(mut self, taken_at: DateTime<Utc>) -> Self {
        self.taken_at = taken_at;
        self
    }

    pub fn measurement(&self) -> &'static str {
        MEASUREMENT
    }

    /// Field names and values in write order.
    pub fn fields(&self) -> [(&'static str, u64); 4] {
        [
            ("queued", self.queued),
            ("active", self.active),
            ("completed", self.completed),
            ("pending", self.pending),
        ]
    }

    /// The counts as a `(queued, active, completed, pending)` tuple.
    pub fn counts(&self) -> (u64, u64, u64, u64) {
        (self.queued, self.active, self.completed, self.pending)
    }
}
