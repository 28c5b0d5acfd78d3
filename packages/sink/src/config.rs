//! Connection settings for the metrics sink.

use std::time::Duration;

use crate::SinkError;

/// Metrics sink configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Hostname of the InfluxDB server.
    pub host: String,
    /// HTTP port of the InfluxDB server.
    pub port: u16,
    /// Username for HTTP basic authentication.
    pub username: String,
    /// Password for HTTP basic authentication.
    pub password: String,
    /// Database the snapshots are written to.
    pub database: String,
    /// Use `https` instead of `http`.
    pub use_tls: bool,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8086,
            username: "root".to_string(),
            password: "root".to_string(),
            database: "catkin".to_string(),
            use_tls: false,
            timeout: Duration::from_secs(10),
        }
    }
}

impl SinkConfig {
    /// Create a config targeting `database` on a local server.
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Default::default()
        }
    }

    /// Set the server hostname.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the server port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the basic-auth credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL of the server, without a trailing slash.
    pub fn base_url(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    /// Build a config from environment variables.
    ///
    /// Every variable is optional and falls back to [`SinkConfig::default`]:
    /// - `INFLUXDB_HOST`
    /// - `INFLUXDB_PORT`
    /// - `INFLUXDB_USERNAME`, `INFLUXDB_PASSWORD`
    /// - `INFLUXDB_DATABASE`
    /// - `INFLUXDB_TLS` (`true`/`false`, `1`/`0`)
    /// - `INFLUXDB_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, SinkError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SinkError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("INFLUXDB_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("INFLUXDB_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| SinkError::InvalidConfig(format!("INFLUXDB_PORT: {}", port)))?;
        }
        if let Some(username) = lookup("INFLUXDB_USERNAME") {
            config.username = username;
        }
        if let Some(password) = lookup("INFLUXDB_PASSWORD") {
            config.password = password;
        }
        if let Some(database) = lookup("INFLUXDB_DATABASE") {
            config.database = database;
        }
        if let Some(tls) = lookup("INFLUXDB_TLS") {
            config.use_tls = parse_bool(&tls)
                .ok_or_else(|| SinkError::InvalidConfig(format!("INFLUXDB_TLS: {}", tls)))?;
        }
        if let Some(secs) = lookup("INFLUXDB_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                SinkError::InvalidConfig(format!("INFLUXDB_TIMEOUT_SECS: {}", secs))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
