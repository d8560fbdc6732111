//! SDK exporter adapters
//!
//! Bind the converter, codec and forwarder into the shapes the OpenTelemetry
//! SDK expects. Every export call is independent: convert, encode, POST once
//! for the whole batch, report. Flush and shutdown have nothing to release
//! and always succeed.

use std::time::Duration;

use opentelemetry_sdk::Resource;
use opentelemetry_sdk::error::OTelSdkResult;
use opentelemetry_sdk::logs::{LogBatch, LogExporter};
use opentelemetry_sdk::metrics::data::ResourceMetrics;
use opentelemetry_sdk::metrics::exporter::PushMetricExporter;
use opentelemetry_sdk::metrics::{InstrumentKind, Temporality};
use opentelemetry_sdk::trace::{SpanData, SpanExporter};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{Config, Signal};
use crate::error::{ExportError, ExporterError};
use crate::export::codec;
use crate::export::converter;
use crate::export::forwarder::HttpForwarder;
use crate::export::model::Attributes;

/// Delta-preferred temporality selection
///
/// Up-down counters stay cumulative; every other instrument reports deltas.
pub fn delta_preferred(kind: InstrumentKind) -> Temporality {
    match kind {
        InstrumentKind::UpDownCounter | InstrumentKind::ObservableUpDownCounter => {
            Temporality::Cumulative
        }
        _ => Temporality::Delta,
    }
}

fn forwarder_for(config: &Config, signal: Signal) -> Result<HttpForwarder, ExporterError> {
    let destination = config.destination(signal)?;
    info!(
        signal = %signal,
        destination = %destination,
        "Sending {} to {}",
        signal,
        destination
    );
    HttpForwarder::new(destination, config.export_timeout())
}

fn log_failure(signal: Signal, destination: &Url, error: &ExportError) {
    warn!(
        signal = %signal,
        destination = %destination,
        kind = error.kind(),
        error = %error,
        "Failed to export {}",
        signal
    );
}

/// Span exporter posting each batch as a JSON array
#[derive(Debug, Clone)]
pub struct JsonSpanExporter {
    forwarder: HttpForwarder,
    resource: Attributes,
}

impl JsonSpanExporter {
    /// Create an exporter targeting the configured span destination
    pub fn new(config: &Config) -> Result<Self, ExporterError> {
        Ok(Self {
            forwarder: forwarder_for(config, Signal::Spans)?,
            resource: Attributes::new(),
        })
    }

    /// Destination span batches are posted to
    pub fn destination(&self) -> &Url {
        self.forwarder.destination()
    }

    /// Convert, encode and deliver one batch
    pub fn export_spans(&self, spans: &[SpanData]) -> Result<(), ExportError> {
        if spans.is_empty() {
            return Ok(());
        }

        let records: Vec<_> = spans
            .iter()
            .map(|span| converter::span_record(span, &self.resource))
            .collect();
        let payload = codec::encode_spans(&records)?;

        debug!(spans = records.len(), payload_bytes = payload.len(), "Exporting spans");
        self.forwarder.send(payload)
    }
}

impl SpanExporter for JsonSpanExporter {
    async fn export(&self, batch: Vec<SpanData>) -> OTelSdkResult {
        self.export_spans(&batch).map_err(|e| {
            log_failure(Signal::Spans, self.destination(), &e);
            e.into()
        })
    }

    fn shutdown_with_timeout(&mut self, _timeout: Duration) -> OTelSdkResult {
        debug!("Span exporter shut down");
        Ok(())
    }

    fn force_flush(&mut self) -> OTelSdkResult {
        Ok(())
    }

    fn set_resource(&mut self, resource: &Resource) {
        self.resource = converter::resource_attributes(resource);
    }
}

/// Log exporter posting each batch inside a `resourceLogs` envelope
#[derive(Debug, Clone)]
pub struct JsonLogExporter {
    forwarder: HttpForwarder,
}

impl JsonLogExporter {
    /// Create an exporter targeting the configured log destination
    pub fn new(config: &Config) -> Result<Self, ExporterError> {
        Ok(Self {
            forwarder: forwarder_for(config, Signal::Logs)?,
        })
    }

    /// Destination log batches are posted to
    pub fn destination(&self) -> &Url {
        self.forwarder.destination()
    }

    fn export_batch(&self, batch: &LogBatch<'_>) -> Result<(), ExportError> {
        let entries: Vec<_> = batch
            .iter()
            .map(|(record, _scope)| converter::log_entry(record))
            .collect();
        if entries.is_empty() {
            return Ok(());
        }

        let payload = codec::encode_logs(&entries)?;

        debug!(logs = entries.len(), payload_bytes = payload.len(), "Exporting logs");
        self.forwarder.send(payload)
    }
}

impl LogExporter for JsonLogExporter {
    async fn export(&self, batch: LogBatch<'_>) -> OTelSdkResult {
        self.export_batch(&batch).map_err(|e| {
            log_failure(Signal::Logs, self.destination(), &e);
            e.into()
        })
    }

    fn shutdown_with_timeout(&self, _timeout: Duration) -> OTelSdkResult {
        debug!("Log exporter shut down");
        Ok(())
    }
}

/// Metric exporter posting each collection cycle as a JSON array
#[derive(Debug, Clone)]
pub struct JsonMetricExporter {
    forwarder: HttpForwarder,
}

impl JsonMetricExporter {
    /// Create an exporter targeting the configured metric destination
    pub fn new(config: &Config) -> Result<Self, ExporterError> {
        Ok(Self {
            forwarder: forwarder_for(config, Signal::Metrics)?,
        })
    }

    /// Destination metric batches are posted to
    pub fn destination(&self) -> &Url {
        self.forwarder.destination()
    }

    /// Temporality preferred for an instrument kind
    pub fn aggregation_temporality(&self, kind: InstrumentKind) -> Temporality {
        delta_preferred(kind)
    }

    fn export_metrics(&self, metrics: &ResourceMetrics) -> Result<(), ExportError> {
        let records = converter::metric_records(metrics);
        if records.is_empty() {
            return Ok(());
        }

        let payload = codec::encode_metrics(&records)?;

        debug!(metrics = records.len(), payload_bytes = payload.len(), "Exporting metrics");
        self.forwarder.send(payload)
    }
}

impl PushMetricExporter for JsonMetricExporter {
    async fn export(&self, metrics: &ResourceMetrics) -> OTelSdkResult {
        self.export_metrics(metrics).map_err(|e| {
            log_failure(Signal::Metrics, self.destination(), &e);
            e.into()
        })
    }

    fn force_flush(&self) -> OTelSdkResult {
        debug!("Metric exporter flush requested");
        Ok(())
    }

    fn shutdown_with_timeout(&self, _timeout: Duration) -> OTelSdkResult {
        debug!("Metric exporter shut down");
        Ok(())
    }

    fn temporality(&self) -> Temporality {
        Temporality::Delta
    }
}
