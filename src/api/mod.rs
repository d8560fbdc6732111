//! Registration API
//!
//! Wires the JSON exporters into SDK providers for embedding applications.

pub mod pipeline;

pub use pipeline::{
    JSON_EXPORT_CUSTOMIZER_ORDER, JsonExportCustomizer, JsonExporterProvider, PipelineCustomizer,
    TelemetryPipeline, TelemetryPipelineBuilder,
};
