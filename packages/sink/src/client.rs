//! InfluxDB HTTP client and the sink trait the forwarder writes through.

use std::future::Future;

use build_core::MetricSnapshot;
use thiserror::Error;

use crate::SinkConfig;
#[cfg(feature = "influxdb")]
use crate::line_protocol::encode_snapshots;

/// Sink errors.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Invalid sink config: {0}")]
    InvalidConfig(String),
    #[error("Sink client unavailable: built without the `influxdb` feature")]
    Unavailable,
    #[error("No database selected")]
    NoDatabase,
    #[error("Sink connection is closed")]
    Closed,
    #[cfg(feature = "influxdb")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Write rejected with status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Destination for metric snapshots.
///
/// Writes are best-effort: callers log a failed write and move on.
pub trait MetricsSink: Send {
    /// Choose the database later writes go to.
    fn select_database(&mut self, database: &str) -> Result<(), SinkError>;

    /// Write a batch of snapshots.
    fn write_points(
        &mut self,
        points: &[MetricSnapshot],
    ) -> impl Future<Output = Result<(), SinkError>> + Send;

    /// Release the connection. Later writes fail with [`SinkError::Closed`].
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Client for the InfluxDB 1.x `/write` endpoint.
#[derive(Debug)]
pub struct InfluxClient {
    /// Server base URL.
    #[allow(dead_code)] // Used when the influxdb feature is enabled
    base_url: String,
    #[allow(dead_code)] // Used when the influxdb feature is enabled
    username: String,
    #[allow(dead_code)] // Used when the influxdb feature is enabled
    password: String,
    /// Database selected with [`MetricsSink::select_database`].
    database: Option<String>,
    /// HTTP client, `None` once closed.
    #[cfg(feature = "influxdb")]
    http: Option<reqwest::Client>,
}

impl InfluxClient {
    /// Build a client for the configured server.
    ///
    /// No request is made here, the server is first contacted on write.
    #[cfg(feature = "influxdb")]
    pub fn new(config: &SinkConfig) -> Result<Self, SinkError> {
        if config.host.trim().is_empty() {
            return Err(SinkError::InvalidConfig("empty host".into()));
        }

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            base_url: config.base_url(),
            username: config.username.clone(),
            password: config.password.clone(),
            database: None,
            http: Some(http),
        })
    }

    /// Without the `influxdb` feature there is no transport to build.
    #[cfg(not(feature = "influxdb"))]
    pub fn new(_config: &SinkConfig) -> Result<Self, SinkError> {
        Err(SinkError::Unavailable)
    }

    /// The currently selected database.
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    #[cfg(feature = "influxdb")]
    pub fn is_closed(&self) -> bool {
        self.http.is_none()
    }

    #[cfg(feature = "influxdb")]
    fn write_url(&self) -> String {
        format!("{}/write", self.base_url)
    }
}

impl MetricsSink for InfluxClient {
    fn select_database(&mut self, database: &str) -> Result<(), SinkError> {
        if database.trim().is_empty() {
            return Err(SinkError::InvalidConfig("empty database name".into()));
        }
        self.database = Some(database.to_string());
        Ok(())
    }

    #[cfg(feature = "influxdb")]
    async fn write_points(&mut self, points: &[MetricSnapshot]) -> Result<(), SinkError> {
        let http = self.http.as_ref().ok_or(SinkError::Closed)?;
        let database = self.database.as_deref().ok_or(SinkError::NoDatabase)?;
        if points.is_empty() {
            return Ok(());
        }

        let response = http
            .post(self.write_url())
            .query(&[("db", database), ("precision", "ns")])
            .basic_auth(&self.username, Some(&self.password))
            .body(encode_snapshots(points))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("Wrote {} point(s) to {}", points.len(), database);
        Ok(())
    }

    #[cfg(not(feature = "influxdb"))]
    async fn write_points(&mut self, _points: &[MetricSnapshot]) -> Result<(), SinkError> {
        Err(SinkError::Unavailable)
    }

    async fn close(&mut self) {
        #[cfg(feature = "influxdb")]
        {
            if self.http.take().is_some() {
                tracing::debug!("Closed sink connection to {}", self.base_url);
            }
        }
    }
}
