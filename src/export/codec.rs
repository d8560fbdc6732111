//! Record-to-JSON codec
//!
//! Pure and deterministic: the same records always produce the same bytes.
//! Each signal has one fixed document shape:
//!
//! - spans: `[ {span}, ... ]`
//! - logs: `{"resourceLogs":[{"scopeLogs":[{"logRecords":[ ... ]}]}]}`
//! - metrics: `[ {name, description, unit, type, dataPoints}, ... ]`
//!
//! Non-finite doubles are written as `null`.

use serde::Serialize;

use crate::error::ExportError;
use crate::export::model::{LogEntry, MetricRecord, SpanRecord};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogsDocument<'a> {
    resource_logs: [ResourceLogs<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceLogs<'a> {
    scope_logs: [ScopeLogs<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScopeLogs<'a> {
    log_records: &'a [LogEntry],
}

/// Encode a span batch as a JSON array
pub fn encode_spans(spans: &[SpanRecord]) -> Result<Vec<u8>, ExportError> {
    Ok(serde_json::to_vec(spans)?)
}

/// Encode a log batch inside the `resourceLogs/scopeLogs/logRecords` envelope
pub fn encode_logs(entries: &[LogEntry]) -> Result<Vec<u8>, ExportError> {
    let document = LogsDocument {
        resource_logs: [ResourceLogs {
            scope_logs: [ScopeLogs {
                log_records: entries,
            }],
        }],
    };
    Ok(serde_json::to_vec(&document)?)
}

/// Encode a metric batch as a JSON array
///
/// Fails if any point's value kind does not match its metric's declared type.
pub fn encode_metrics(metrics: &[MetricRecord]) -> Result<Vec<u8>, ExportError> {
    for metric in metrics {
        if let Some(point) = metric
            .data_points
            .iter()
            .find(|p| !metric.metric_type.accepts(&p.value))
        {
            return Err(ExportError::Serialization(format!(
                "metric '{}' of type {:?} has a point with a mismatched value: {:?}",
                metric.name, metric.metric_type, point.value
            )));
        }
    }
    Ok(serde_json::to_vec(metrics)?)
}
