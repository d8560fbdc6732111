//! JSON export module
//!
//! Provides the record model, SDK conversion, JSON codec, HTTP delivery and
//! the SDK exporter adapters built from them.

pub mod codec;
pub mod converter;
pub mod exporter;
pub mod forwarder;
pub mod model;

pub use exporter::{JsonLogExporter, JsonMetricExporter, JsonSpanExporter, delta_preferred};
pub use forwarder::HttpForwarder;
