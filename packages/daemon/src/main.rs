//! Forward build job counts from an NDJSON event stream to InfluxDB.
//!
//! Reads one JSON build event per line on stdin. End of input enqueues the
//! shutdown sentinel; Ctrl-C requests a stop. Connection settings come from
//! the `INFLUXDB_*` environment variables.

use std::io::BufRead;

use build_core::BuildEvent;
use forwarder::{EventSender, StatusForwarder, event_queue};
use sink::SinkConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = SinkConfig::from_env()?;
    tracing::info!(
        "Forwarding build status to {} (database {})",
        config.base_url(),
        config.database
    );

    let (events, queue) = event_queue();
    let handle = StatusForwarder::new(queue, &config).spawn();

    let stop = handle.stop_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping status forwarder");
            stop.cancel();
        }
    });

    // Stdin is read on a plain thread so a pending read never holds up exit.
    std::thread::spawn(move || read_events(std::io::stdin().lock(), &events));

    let report = handle.join().await?;
    tracing::info!(
        "Done ({}): {} events, {} snapshots written, {} failed",
        report.exit,
        report.events_seen,
        report.snapshots_written,
        report.write_failures
    );
    if let Some(snapshot) = report.last_snapshot {
        tracing::info!(
            "Last counts: {} queued, {} active, {} completed, {} pending",
            snapshot.queued,
            snapshot.active,
            snapshot.completed,
            snapshot.pending
        );
    }
    Ok(())
}

/// Enqueue every parseable line, then the sentinel.
fn read_events(input: impl BufRead, events: &EventSender) {
    for (index, line) in input.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Cannot read input: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let event = match serde_json::from_str::<BuildEvent>(&line) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Skipping line {}: {}", index + 1, e);
                continue;
            }
        };
        if events.send(event).is_err() {
            // Forwarder already exited.
            return;
        }
    }

    if events.shutdown().is_err() {
        tracing::debug!("Forwarder exited before end of input");
    }
}
