//! JSON exporter demo
//!
//! Installs the JSON exporters, emits one span, one log record and one metric
//! point, then shuts the pipeline down so everything is delivered.
//!
//! Usage: `otel-json-demo [properties.yaml]`

use anyhow::Context;
use opentelemetry::KeyValue;
use opentelemetry::logs::{LogRecord, Logger, LoggerProvider, Severity};
use opentelemetry::metrics::MeterProvider;
use opentelemetry::trace::{Span, Tracer, TracerProvider};
use opentelemetry_sdk::Resource;
use otel_json_exporter::{ConfigLoader, TelemetryPipeline};
use tracing::info;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ConfigLoader::from_yaml(&path)
            .with_context(|| format!("loading properties from {}", path))?,
        None => ConfigLoader::from_env().context("loading configuration from environment")?,
    };

    let mut pipeline = TelemetryPipeline::builder()
        .with_resource(
            Resource::builder()
                .with_service_name("otel-json-demo")
                .build(),
        )
        .with_json_exporters(config)
        .install()
        .context("installing telemetry pipeline")?;

    let tracer = pipeline.tracer_provider().tracer("otel-json-demo");
    let mut span = tracer.start("demo-operation");
    span.set_attribute(KeyValue::new("demo.iteration", 1));

    let logger = pipeline.logger_provider().logger("otel-json-demo");
    let mut record = logger.create_log_record();
    record.set_severity_number(Severity::Info);
    record.set_severity_text("INFO");
    record.set_body("demo log record".into());
    record.add_attribute("demo.source", "otel-json-demo");
    logger.emit(record);

    span.end();

    let meter = pipeline.meter_provider().meter("otel-json-demo");
    let counter = meter
        .u64_counter("demo.requests")
        .with_description("Requests handled by the demo")
        .with_unit("1")
        .build();
    counter.add(1, &[KeyValue::new("route", "/demo")]);

    info!("Demo telemetry emitted, shutting down");
    pipeline.shutdown().context("shutting down telemetry pipeline")?;

    Ok(())
}
