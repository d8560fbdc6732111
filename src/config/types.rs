//! Configuration type definitions
//!
//! Defines the destination and scheduling settings shared by the exporters.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Default collector endpoint for spans
pub const DEFAULT_SPANS_DESTINATION_URL: &str = "http://localhost:24224";
/// Default collector endpoint for logs
pub const DEFAULT_LOGS_DESTINATION_URL: &str = "http://localhost:24225";
/// Default collector endpoint for metrics
pub const DEFAULT_METRICS_DESTINATION_URL: &str = "http://localhost:24226";
/// Default metric export interval in minutes
pub const DEFAULT_METRIC_INTERVAL_MINUTES: u64 = 30;

/// Property holding the metric export interval in minutes
pub const METRIC_INTERVAL_PROPERTY: &str = "metric.interval.minutes";
/// Property holding the optional HTTP request timeout in seconds
pub const EXPORT_TIMEOUT_PROPERTY: &str = "export.timeout.seconds";

/// Telemetry signal handled by one exporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Trace spans
    Spans,
    /// Log records
    Logs,
    /// Metric data points
    Metrics,
}

impl Signal {
    /// All signals, in registration order
    pub const ALL: [Signal; 3] = [Signal::Spans, Signal::Logs, Signal::Metrics];

    /// Environment variable overriding the destination URL
    pub fn env_var(&self) -> &'static str {
        match self {
            Signal::Spans => "SPANS_DESTINATION_URL",
            Signal::Logs => "LOGS_DESTINATION_URL",
            Signal::Metrics => "METRICS_DESTINATION_URL",
        }
    }

    /// Property consulted when the environment variable is unset
    pub fn property(&self) -> &'static str {
        match self {
            Signal::Spans => "spans.destination.url",
            Signal::Logs => "logs.destination.url",
            Signal::Metrics => "metrics.destination.url",
        }
    }

    /// Hardcoded fallback destination
    pub fn default_url(&self) -> &'static str {
        match self {
            Signal::Spans => DEFAULT_SPANS_DESTINATION_URL,
            Signal::Logs => DEFAULT_LOGS_DESTINATION_URL,
            Signal::Metrics => DEFAULT_METRICS_DESTINATION_URL,
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Spans => f.write_str("spans"),
            Signal::Logs => f.write_str("logs"),
            Signal::Metrics => f.write_str("metrics"),
        }
    }
}

/// Exporter configuration
///
/// Built once at startup (see [`ConfigLoader`](crate::config::ConfigLoader))
/// and handed to the exporter constructors; nothing reads the environment
/// after that.
///
/// # Default Values
///
/// - `spans_destination_url`: `http://localhost:24224`
/// - `logs_destination_url`: `http://localhost:24225`
/// - `metrics_destination_url`: `http://localhost:24226`
/// - `metric_interval_minutes`: `30`
/// - `export_timeout_secs`: unset (HTTP client default)
///
/// # Example
///
/// ```no_run
/// use otel_json_exporter::ConfigBuilder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ConfigBuilder::new()
///     .logs_destination_url("http://fluent-bit:9880")
///     .metric_interval_minutes(5)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Collector URL receiving span batches
    #[serde(default = "default_spans_destination_url")]
    pub spans_destination_url: String,

    /// Collector URL receiving log batches
    #[serde(default = "default_logs_destination_url")]
    pub logs_destination_url: String,

    /// Collector URL receiving metric batches
    #[serde(default = "default_metrics_destination_url")]
    pub metrics_destination_url: String,

    /// How often the periodic reader exports metrics, in minutes
    #[serde(default = "default_metric_interval_minutes")]
    pub metric_interval_minutes: u64,

    /// Optional HTTP request timeout in seconds
    #[serde(default)]
    pub export_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spans_destination_url: default_spans_destination_url(),
            logs_destination_url: default_logs_destination_url(),
            metrics_destination_url: default_metrics_destination_url(),
            metric_interval_minutes: default_metric_interval_minutes(),
            export_timeout_secs: None,
        }
    }
}

impl Config {
    /// Destination URL configured for a signal
    pub fn destination_url(&self, signal: Signal) -> &str {
        match signal {
            Signal::Spans => &self.spans_destination_url,
            Signal::Logs => &self.logs_destination_url,
            Signal::Metrics => &self.metrics_destination_url,
        }
    }

    pub(crate) fn destination_url_mut(&mut self, signal: Signal) -> &mut String {
        match signal {
            Signal::Spans => &mut self.spans_destination_url,
            Signal::Logs => &mut self.logs_destination_url,
            Signal::Metrics => &mut self.metrics_destination_url,
        }
    }

    /// Parsed destination URL for a signal
    pub fn destination(&self, signal: Signal) -> Result<Url, ConfigError> {
        parse_destination(signal, self.destination_url(signal))
    }

    /// Metric export interval
    pub fn metric_interval(&self) -> Duration {
        Duration::from_secs(self.metric_interval_minutes.saturating_mul(60))
    }

    /// HTTP request timeout, if one is configured
    pub fn export_timeout(&self) -> Option<Duration> {
        self.export_timeout_secs.map(Duration::from_secs)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        for signal in Signal::ALL {
            self.destination(signal)?;
        }

        if self.metric_interval_minutes == 0 {
            return Err(ConfigError::InvalidInterval(
                "Metric interval must be greater than 0 minutes".to_string(),
            ));
        }

        if self.export_timeout_secs == Some(0) {
            return Err(ConfigError::ValidationFailed(
                "Export timeout must be greater than 0 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_destination(signal: Signal, raw: &str) -> Result<Url, ConfigError> {
    if raw.is_empty() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} destination URL cannot be empty",
            signal
        )));
    }

    let url = Url::parse(raw).map_err(|e| {
        ConfigError::InvalidUrl(format!("{} destination URL '{}': {}", signal, raw, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} destination URL must use http:// or https:// scheme, got '{}'",
            signal, raw
        )));
    }

    Ok(url)
}

/// Builder for creating configurations programmatically
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the span destination URL
    pub fn spans_destination_url(mut self, url: impl Into<String>) -> Self {
        self.config.spans_destination_url = url.into();
        self
    }

    /// Set the log destination URL
    pub fn logs_destination_url(mut self, url: impl Into<String>) -> Self {
        self.config.logs_destination_url = url.into();
        self
    }

    /// Set the metric destination URL
    pub fn metrics_destination_url(mut self, url: impl Into<String>) -> Self {
        self.config.metrics_destination_url = url.into();
        self
    }

    /// Set the metric export interval in minutes
    pub fn metric_interval_minutes(mut self, minutes: u64) -> Self {
        self.config.metric_interval_minutes = minutes;
        self
    }

    /// Set the HTTP request timeout in seconds
    pub fn export_timeout_secs(mut self, secs: u64) -> Self {
        self.config.export_timeout_secs = Some(secs);
        self
    }

    /// Build the configuration with validation
    pub fn build(self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// Default value functions
fn default_spans_destination_url() -> String {
    DEFAULT_SPANS_DESTINATION_URL.to_string()
}

fn default_logs_destination_url() -> String {
    DEFAULT_LOGS_DESTINATION_URL.to_string()
}

fn default_metrics_destination_url() -> String {
    DEFAULT_METRICS_DESTINATION_URL.to_string()
}

fn default_metric_interval_minutes() -> u64 {
    DEFAULT_METRIC_INTERVAL_MINUTES
}
