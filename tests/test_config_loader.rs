//! Tests for destination resolution from properties and environment

use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use otel_json_exporter::config::{ConfigLoader, Properties, Signal};
use otel_json_exporter::ConfigError;
use tempfile::NamedTempFile;

fn no_env(_: &str) -> Option<String> {
    None
}

fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_defaults_when_nothing_configured() {
    let config = ConfigLoader::resolve(&Properties::new(), no_env).unwrap();

    assert_eq!(config.spans_destination_url, "http://localhost:24224");
    assert_eq!(config.logs_destination_url, "http://localhost:24225");
    assert_eq!(config.metrics_destination_url, "http://localhost:24226");
    assert_eq!(config.metric_interval_minutes, 30);
    assert_eq!(config.metric_interval(), Duration::from_secs(30 * 60));
    assert_eq!(config.export_timeout(), None);
}

#[test]
fn test_env_var_overrides_one_signal() {
    let lookup = env_of(&[("LOGS_DESTINATION_URL", "http://example:9000")]);
    let config = ConfigLoader::resolve(&Properties::new(), lookup).unwrap();

    assert_eq!(config.logs_destination_url, "http://example:9000");
    assert_eq!(config.spans_destination_url, "http://localhost:24224");
    assert_eq!(config.metrics_destination_url, "http://localhost:24226");
}

#[test]
fn test_property_used_when_env_unset() {
    let props: Properties = [("spans.destination.url", "http://collector:8080/spans")]
        .into_iter()
        .collect();
    let config = ConfigLoader::resolve(&props, no_env).unwrap();

    assert_eq!(config.spans_destination_url, "http://collector:8080/spans");
    assert_eq!(
        config.destination(Signal::Spans).unwrap().path(),
        "/spans"
    );
}

#[test]
fn test_env_var_beats_property() {
    let props: Properties = [("metrics.destination.url", "http://from-property:1")]
        .into_iter()
        .collect();
    let lookup = env_of(&[("METRICS_DESTINATION_URL", "http://from-env:2")]);
    let config = ConfigLoader::resolve(&props, lookup).unwrap();

    assert_eq!(config.metrics_destination_url, "http://from-env:2");
}

#[test]
fn test_metric_interval_property() {
    let mut props = Properties::new();
    props.set("metric.interval.minutes", "5");
    let config = ConfigLoader::resolve(&props, no_env).unwrap();

    assert_eq!(config.metric_interval_minutes, 5);
    assert_eq!(config.metric_interval(), Duration::from_secs(300));
}

#[test]
fn test_unparseable_interval_keeps_default() {
    let mut props = Properties::new();
    props.set("metric.interval.minutes", "soon");
    let config = ConfigLoader::resolve(&props, no_env).unwrap();

    assert_eq!(config.metric_interval_minutes, 30);
}

#[test]
fn test_zero_interval_rejected() {
    let mut props = Properties::new();
    props.set("metric.interval.minutes", "0");

    match ConfigLoader::resolve(&props, no_env) {
        Err(ConfigError::InvalidInterval(_)) => {}
        other => panic!("Expected InvalidInterval, got: {:?}", other),
    }
}

#[test]
fn test_export_timeout_property() {
    let mut props = Properties::new();
    props.set("export.timeout.seconds", "15");
    let config = ConfigLoader::resolve(&props, no_env).unwrap();

    assert_eq!(config.export_timeout(), Some(Duration::from_secs(15)));
}

#[test]
fn test_zero_export_timeout_rejected() {
    let mut props = Properties::new();
    props.set("export.timeout.seconds", "0");

    assert!(matches!(
        ConfigLoader::resolve(&props, no_env),
        Err(ConfigError::ValidationFailed(_))
    ));
}

#[test]
fn test_invalid_url_rejected() {
    let lookup = env_of(&[("SPANS_DESTINATION_URL", "not a url")]);

    match ConfigLoader::resolve(&Properties::new(), lookup) {
        Err(ConfigError::InvalidUrl(msg)) => assert!(msg.contains("spans")),
        other => panic!("Expected InvalidUrl, got: {:?}", other),
    }
}

#[test]
fn test_non_http_scheme_rejected() {
    let props: Properties = [("logs.destination.url", "ftp://collector/logs")]
        .into_iter()
        .collect();

    assert!(matches!(
        ConfigLoader::resolve(&props, no_env),
        Err(ConfigError::InvalidUrl(_))
    ));
}

#[test]
fn test_from_yaml_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "spans.destination.url: http://fluent-bit:9880/spans\nmetric.interval.minutes: 2\nunused.key: ~"
    )
    .unwrap();

    let props = Properties::from_yaml_file(file.path()).unwrap();
    assert_eq!(props.len(), 2, "Null values are skipped");

    let config = ConfigLoader::resolve(&props, no_env).unwrap();
    assert_eq!(config.spans_destination_url, "http://fluent-bit:9880/spans");
    assert_eq!(config.metric_interval_minutes, 2);
}

#[test]
fn test_missing_yaml_file_is_read_error() {
    match Properties::from_yaml_file("/nonexistent/otel-json.yaml") {
        Err(ConfigError::Read(_)) => {}
        other => panic!("Expected Read error, got: {:?}", other),
    }
}

#[test]
fn test_nested_yaml_value_is_parse_error() {
    let result = Properties::from_yaml_str("spans:\n  destination: http://x\n");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_empty_yaml_is_empty_properties() {
    let props = Properties::from_yaml_str("   \n").unwrap();
    assert!(props.is_empty());
}
