//! Metrics sink for build job counts.
//!
//! This crate provides the InfluxDB client the status forwarder writes
//! snapshots through, plus the trait it is written against.
//!
//! # Features
//!
//! - `influxdb` (default): HTTP transport for the InfluxDB `/write` endpoint.
//!   Without it [`connect`] always returns `None` and forwarders run disabled.

mod client;
mod config;
pub mod line_protocol;

pub use client::{InfluxClient, MetricsSink, SinkError};
pub use config::SinkConfig;

/// Build a client and select the configured database.
///
/// Returns `None` when the client cannot be built, either because the
/// transport is compiled out or because the config is unusable. Callers
/// treat `None` as "metrics disabled", never as a startup failure.
pub fn connect(config: &SinkConfig) -> Option<InfluxClient> {
    let mut client = match InfluxClient::new(config) {
        Ok(client) => client,
        Err(SinkError::Unavailable) => {
            tracing::info!("InfluxDB support not compiled in, metrics disabled");
            return None;
        }
        Err(e) => {
            tracing::warn!("Cannot create InfluxDB client, metrics disabled: {}", e);
            return None;
        }
    };

    if let Err(e) = client.select_database(&config.database) {
        tracing::warn!("Cannot select database, metrics disabled: {}", e);
        return None;
    }

    tracing::info!(
        "Metrics sink ready: {}/{}",
        config.base_url(),
        config.database
    );
    Some(client)
}
