//! OpenTelemetry JSON Exporters
//!
//! Span, log and metric exporters for the OpenTelemetry Rust SDK that encode
//! each batch as a JSON document and POST it to an HTTP collector such as a
//! Fluent Bit HTTP input.
//!
//! # Features
//!
//! - `SpanExporter`, `LogExporter` and `PushMetricExporter` implementations
//! - Fixed JSON schemas per signal (metrics flatten scalar, histogram and summary points)
//! - Destinations resolved once from environment variables, a properties file, or defaults
//! - Pipeline customizer that registers all three exporters at startup
//!
//! # Example
//!
//! ```no_run
//! use otel_json_exporter::{ConfigLoader, TelemetryPipeline};
//!
//! # fn example() -> Result<(), otel_json_exporter::ExporterError> {
//! let config = ConfigLoader::from_env()?;
//! let mut pipeline = TelemetryPipeline::builder()
//!     .with_json_exporters(config)
//!     .install_global(true)
//!     .install()?;
//!
//! // Instrumented code runs here
//!
//! pipeline.shutdown()?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod error;
pub mod export;

// Re-export public API
pub use api::{JsonExportCustomizer, JsonExporterProvider, PipelineCustomizer, TelemetryPipeline};
pub use config::{Config, ConfigBuilder, ConfigLoader, Properties, Signal};
pub use error::{ConfigError, ExportError, ExporterError};
pub use export::{JsonLogExporter, JsonMetricExporter, JsonSpanExporter};

use tracing_subscriber::EnvFilter;

/// Initialize structured logging
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init();
}
