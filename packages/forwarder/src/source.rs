//! Inbound event queue shared between the build executor and its consumers.

use std::future::Future;
use std::sync::Arc;

use build_core::BuildEvent;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};

/// The queue is closed and will never yield another item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Event source closed")]
pub struct SourceClosed;

/// Something the forwarder can pull build events from.
///
/// `Ok(None)` is the shutdown sentinel, distinct from a closed source.
pub trait EventSource: Send + Sync {
    /// Wait for the next item. Must be cancel-safe.
    fn recv(&self) -> impl Future<Output = Result<Option<BuildEvent>, SourceClosed>> + Send;
}

/// Create an unbounded FIFO event queue.
pub fn event_queue() -> (EventSender, EventQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        EventSender { tx },
        EventQueue {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Producer half, held by the build executor.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<Option<BuildEvent>>,
}

impl EventSender {
    /// Enqueue an event.
    pub fn send(&self, event: BuildEvent) -> Result<(), SourceClosed> {
        self.tx.send(Some(event)).map_err(|_| SourceClosed)
    }

    /// Enqueue the shutdown sentinel.
    pub fn shutdown(&self) -> Result<(), SourceClosed> {
        self.tx.send(None).map_err(|_| SourceClosed)
    }

    /// True once every consumer has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half.
///
/// Clones share one underlying queue and each item goes to exactly one
/// of them.
#[derive(Debug, Clone)]
pub struct EventQueue {
    rx: Arc<Mutex<mpsc::UnboundedReceiver<Option<BuildEvent>>>>,
}

impl EventSource for EventQueue {
    async fn recv(&self) -> Result<Option<BuildEvent>, SourceClosed> {
        self.rx.lock().await.recv().await.ok_or(SourceClosed)
    }
}
