//! Configuration loader
//!
//! Resolves the exporter configuration once at startup.
//! Priority per destination: environment variable > property > default.
//!
//! Properties are flat dotted keys (`logs.destination.url`,
//! `metric.interval.minutes`) read from a YAML file.

use std::collections::BTreeMap;
use std::env;
use std::path::Path;

use crate::config::types::{
    Config, EXPORT_TIMEOUT_PROPERTY, METRIC_INTERVAL_PROPERTY, Signal,
};
use crate::error::ConfigError;
use tracing::{debug, info, warn};

/// Flat key/value property set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    values: BTreeMap<String, String>,
}

impl Properties {
    /// Create an empty property set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Look up a property
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no properties are set
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse properties from a YAML mapping of scalar values
    ///
    /// ```
    /// use otel_json_exporter::config::Properties;
    ///
    /// let props = Properties::from_yaml_str("metric.interval.minutes: 5\n").unwrap();
    /// assert_eq!(props.get("metric.interval.minutes"), Some("5"));
    /// ```
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let raw: BTreeMap<String, serde_yaml::Value> = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse YAML: {}", e)))?;

        let mut values = BTreeMap::new();
        for (key, value) in raw {
            let value = match value {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                serde_yaml::Value::Null => continue,
                _ => {
                    return Err(ConfigError::Parse(format!(
                        "Property '{}' must be a scalar value",
                        key
                    )));
                }
            };
            values.insert(key, value);
        }

        Ok(Self { values })
    }

    /// Read properties from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            warn!(
                config_path = %path.display(),
                error = %e,
                "Failed to read properties file"
            );
            ConfigError::Read(format!("{}: {}", path.display(), e))
        })?;

        debug!(
            config_path = %path.display(),
            file_size_bytes = content.len(),
            "Read properties file"
        );

        Self::from_yaml_str(&content)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the process environment and defaults
    pub fn from_env() -> Result<Config, ConfigError> {
        info!("Loading configuration from environment variables");
        Self::resolve(&Properties::default(), |key| env::var(key).ok())
    }

    /// Load configuration from a YAML properties file, with environment overrides
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        info!(
            config_path = %path.display(),
            "Loading configuration from properties file"
        );

        let properties = Properties::from_yaml_file(path)?;
        Self::resolve(&properties, |key| env::var(key).ok())
    }

    /// Resolve configuration from properties and an environment lookup
    ///
    /// Each destination URL comes from the signal's environment variable if
    /// set, else its property, else the built-in default. Unparseable numeric
    /// properties are ignored with a warning.
    pub fn resolve<F>(properties: &Properties, lookup_env: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        for signal in Signal::ALL {
            let (url, source) = if let Some(url) = lookup_env(signal.env_var()) {
                (url, signal.env_var())
            } else if let Some(url) = properties.get(signal.property()) {
                (url.to_string(), signal.property())
            } else {
                (signal.default_url().to_string(), "default")
            };

            debug!(
                signal = %signal,
                source = source,
                destination = %url,
                "Resolved destination URL"
            );
            *config.destination_url_mut(signal) = url;
        }

        if let Some(minutes) = parse_property::<u64>(properties, METRIC_INTERVAL_PROPERTY) {
            config.metric_interval_minutes = minutes;
        }

        if let Some(secs) = parse_property::<u64>(properties, EXPORT_TIMEOUT_PROPERTY) {
            config.export_timeout_secs = Some(secs);
        }

        config.validate().map_err(|e| {
            warn!(
                error = %e,
                "Configuration validation failed"
            );
            e
        })?;

        info!(
            spans_destination = %config.spans_destination_url,
            logs_destination = %config.logs_destination_url,
            metrics_destination = %config.metrics_destination_url,
            metric_interval_minutes = config.metric_interval_minutes,
            "Configuration loaded and validated successfully"
        );

        Ok(config)
    }
}

fn parse_property<T>(properties: &Properties, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = properties.get(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(
                property = key,
                value = %raw,
                error = %e,
                "Failed to parse property, using default"
            );
            None
        }
    }
}
