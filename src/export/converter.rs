//! SDK-to-record conversion
//!
//! Borrows SDK telemetry for the duration of an export call and copies what
//! the JSON schema needs into the owned record model. Nothing from the SDK is
//! retained or mutated.

use std::time::{SystemTime, UNIX_EPOCH};

use opentelemetry::logs::AnyValue;
use opentelemetry::trace::{SpanId, SpanKind, Status, TraceId};
use opentelemetry::{InstrumentationScope, KeyValue};
use opentelemetry_sdk::logs::SdkLogRecord;
use opentelemetry_sdk::metrics::data::{
    AggregatedMetrics, ExponentialHistogramDataPoint, HistogramDataPoint, Metric, MetricData,
    ResourceMetrics,
};
use opentelemetry_sdk::trace::SpanData;
use opentelemetry_sdk::Resource;
use tracing::warn;

use crate::export::model::{
    Attributes, DataPoint, HistogramValue, LogAttribute, LogBody, LogEntry, MetricRecord,
    MetricType, PointValue, ScopeRecord, SpanEventRecord, SpanKindName, SpanLinkRecord,
    SpanRecord, SpanStatusRecord, StatusCodeName,
};

/// Nanoseconds since the Unix epoch; times before the epoch map to 0
pub fn unix_nanos(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

fn attributes<'a>(kvs: impl IntoIterator<Item = &'a KeyValue>) -> Attributes {
    kvs.into_iter()
        .map(|kv| (kv.key.as_str().to_string(), kv.value.to_string()))
        .collect()
}

/// Resource attributes rendered as strings
pub fn resource_attributes(resource: &Resource) -> Attributes {
    resource
        .iter()
        .map(|(key, value)| (key.as_str().to_string(), value.to_string()))
        .collect()
}

fn scope_record(scope: &InstrumentationScope) -> ScopeRecord {
    ScopeRecord {
        name: scope.name().to_string(),
        version: scope.version().map(str::to_string),
        schema_url: scope.schema_url().map(str::to_string),
    }
}

fn span_kind(kind: &SpanKind) -> SpanKindName {
    match kind {
        SpanKind::Client => SpanKindName::Client,
        SpanKind::Server => SpanKindName::Server,
        SpanKind::Producer => SpanKindName::Producer,
        SpanKind::Consumer => SpanKindName::Consumer,
        SpanKind::Internal => SpanKindName::Internal,
    }
}

fn span_status(status: &Status) -> SpanStatusRecord {
    match status {
        Status::Unset => SpanStatusRecord {
            status_code: StatusCodeName::Unset,
            description: String::new(),
        },
        Status::Ok => SpanStatusRecord {
            status_code: StatusCodeName::Ok,
            description: String::new(),
        },
        Status::Error { description } => SpanStatusRecord {
            status_code: StatusCodeName::Error,
            description: description.to_string(),
        },
    }
}

/// Convert one finished span
pub fn span_record(span: &SpanData, resource: &Attributes) -> SpanRecord {
    SpanRecord {
        trace_id: span.span_context.trace_id().to_string(),
        span_id: span.span_context.span_id().to_string(),
        parent_span_id: span.parent_span_id.to_string(),
        parent_span_is_remote: span.parent_span_is_remote,
        trace_flags: span.span_context.trace_flags().to_u8(),
        name: span.name.to_string(),
        kind: span_kind(&span.span_kind),
        start_epoch_nanos: unix_nanos(span.start_time),
        end_epoch_nanos: unix_nanos(span.end_time),
        attributes: attributes(&span.attributes),
        dropped_attributes_count: span.dropped_attributes_count,
        events: span
            .events
            .events
            .iter()
            .map(|event| SpanEventRecord {
                name: event.name.to_string(),
                epoch_nanos: unix_nanos(event.timestamp),
                attributes: attributes(&event.attributes),
            })
            .collect(),
        dropped_events_count: span.events.dropped_count,
        links: span
            .links
            .links
            .iter()
            .map(|link| SpanLinkRecord {
                trace_id: link.span_context.trace_id().to_string(),
                span_id: link.span_context.span_id().to_string(),
                attributes: attributes(&link.attributes),
            })
            .collect(),
        dropped_links_count: span.links.dropped_count,
        status: span_status(&span.status),
        instrumentation_scope: scope_record(&span.instrumentation_scope),
        resource: resource.clone(),
    }
}

/// Render a log value the way it appears in `stringValue` fields
pub fn any_value_to_string(value: &AnyValue) -> String {
    match value {
        AnyValue::String(s) => s.as_str().to_string(),
        AnyValue::Int(i) => i.to_string(),
        AnyValue::Double(d) => d.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        AnyValue::Bytes(bytes) => format!("{:?}", bytes),
        AnyValue::ListAny(values) => {
            let items: Vec<String> = values.iter().map(any_value_to_string).collect();
            format!("[{}]", items.join(", "))
        }
        AnyValue::Map(map) => {
            let mut entries: Vec<(String, String)> = map
                .iter()
                .map(|(k, v)| (k.as_str().to_string(), any_value_to_string(v)))
                .collect();
            entries.sort();
            let items: Vec<String> = entries
                .into_iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            format!("{{{}}}", items.join(", "))
        }
        #[allow(unreachable_patterns)]
        other => format!("{:?}", other),
    }
}

/// Convert one log record
///
/// Missing timestamps fall back to the observed timestamp, then 0. Missing
/// correlation ids render as the all-zero invalid ids.
pub fn log_entry(record: &SdkLogRecord) -> LogEntry {
    let (trace_id, span_id) = record
        .trace_context()
        .map(|ctx| (ctx.trace_id, ctx.span_id))
        .unwrap_or((TraceId::INVALID, SpanId::INVALID));

    LogEntry {
        time_unix_nano: record
            .timestamp()
            .or_else(|| record.observed_timestamp())
            .map(unix_nanos)
            .unwrap_or(0),
        severity_number: record.severity_number().map(|s| s as i32).unwrap_or(0),
        severity_text: record.severity_text().map(str::to_string),
        body: LogBody::new(record.body().map(any_value_to_string).unwrap_or_default()),
        trace_id: trace_id.to_string(),
        span_id: span_id.to_string(),
        attributes: record
            .attributes_iter()
            .map(|(key, value)| LogAttribute::new(key.as_str(), any_value_to_string(value)))
            .collect(),
    }
}

/// Numeric types the SDK aggregates over
trait Numeric: Copy {
    const IS_LONG: bool;

    fn point_value(self) -> PointValue;

    fn as_f64(self) -> f64;
}

impl Numeric for f64 {
    const IS_LONG: bool = false;

    fn point_value(self) -> PointValue {
        PointValue::Double(self)
    }

    fn as_f64(self) -> f64 {
        self
    }
}

impl Numeric for i64 {
    const IS_LONG: bool = true;

    fn point_value(self) -> PointValue {
        PointValue::Long(self)
    }

    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl Numeric for u64 {
    const IS_LONG: bool = true;

    fn point_value(self) -> PointValue {
        PointValue::UnsignedLong(self)
    }

    fn as_f64(self) -> f64 {
        self as f64
    }
}

/// Convert every metric stream of a collection cycle
///
/// Aggregations without a JSON representation are skipped with a warning.
pub fn metric_records(metrics: &ResourceMetrics) -> Vec<MetricRecord> {
    metrics
        .scope_metrics()
        .flat_map(|scope| scope.metrics())
        .filter_map(metric_record)
        .collect()
}

fn metric_record(metric: &Metric) -> Option<MetricRecord> {
    #[allow(unreachable_patterns)]
    let converted = match metric.data() {
        AggregatedMetrics::F64(data) => metric_data(data),
        AggregatedMetrics::I64(data) => metric_data(data),
        AggregatedMetrics::U64(data) => metric_data(data),
        _ => None,
    };

    let Some((metric_type, data_points)) = converted else {
        warn!(
            metric = %metric.name(),
            "Skipping metric with unsupported aggregation"
        );
        return None;
    };

    Some(MetricRecord {
        name: metric.name().to_string(),
        description: metric.description().to_string(),
        unit: metric.unit().to_string(),
        metric_type,
        data_points,
    })
}

fn metric_data<T: Numeric>(data: &MetricData<T>) -> Option<(MetricType, Vec<DataPoint>)> {
    #[allow(unreachable_patterns)]
    let converted = match data {
        MetricData::Gauge(gauge) => {
            let start = gauge.start_time().map(unix_nanos).unwrap_or(0);
            let time = unix_nanos(gauge.time());
            let points = gauge
                .data_points()
                .map(|p| DataPoint {
                    start_time_unix_nano: start,
                    time_unix_nano: time,
                    value: p.value().point_value(),
                    attributes: attributes(p.attributes()),
                })
                .collect();
            let metric_type = if T::IS_LONG {
                MetricType::LongGauge
            } else {
                MetricType::DoubleGauge
            };
            (metric_type, points)
        }
        MetricData::Sum(sum) => {
            let start = unix_nanos(sum.start_time());
            let time = unix_nanos(sum.time());
            let points = sum
                .data_points()
                .map(|p| DataPoint {
                    start_time_unix_nano: start,
                    time_unix_nano: time,
                    value: p.value().point_value(),
                    attributes: attributes(p.attributes()),
                })
                .collect();
            let metric_type = if T::IS_LONG {
                MetricType::LongSum
            } else {
                MetricType::DoubleSum
            };
            (metric_type, points)
        }
        MetricData::Histogram(histogram) => {
            let start = unix_nanos(histogram.start_time());
            let time = unix_nanos(histogram.time());
            let points = histogram
                .data_points()
                .map(|p| DataPoint {
                    start_time_unix_nano: start,
                    time_unix_nano: time,
                    value: PointValue::Histogram(histogram_value(p)),
                    attributes: attributes(p.attributes()),
                })
                .collect();
            (MetricType::Histogram, points)
        }
        MetricData::ExponentialHistogram(histogram) => {
            let start = unix_nanos(histogram.start_time());
            let time = unix_nanos(histogram.time());
            let points = histogram
                .data_points()
                .map(|p| DataPoint {
                    start_time_unix_nano: start,
                    time_unix_nano: time,
                    value: PointValue::Histogram(exponential_histogram_value(p)),
                    attributes: attributes(p.attributes()),
                })
                .collect();
            (MetricType::ExponentialHistogram, points)
        }
        _ => return None,
    };
    Some(converted)
}

fn histogram_value<T: Numeric>(point: &HistogramDataPoint<T>) -> HistogramValue {
    HistogramValue {
        count: point.count(),
        sum: point.sum().as_f64(),
        boundaries: point.bounds().collect(),
        counts: point.bucket_counts().collect(),
    }
}

fn exponential_histogram_value<T: Numeric>(
    point: &ExponentialHistogramDataPoint<T>,
) -> HistogramValue {
    let negative_total: u64 = point.negative_bucket().counts().sum();
    let positive: Vec<u64> = point.positive_bucket().counts().collect();
    let (boundaries, counts) = exponential_buckets(
        point.scale(),
        point.positive_bucket().offset(),
        &positive,
        point.zero_count() + negative_total,
    );

    HistogramValue {
        count: point.count() as u64,
        sum: point.sum().as_f64(),
        boundaries,
        counts,
    }
}

/// Flatten exponential buckets into explicit boundaries and counts
///
/// Boundaries are the upper bounds of the positive buckets. The first bucket
/// also absorbs `low_count` (zero and negative observations) and a trailing
/// empty overflow bucket keeps `counts.len() == boundaries.len() + 1`.
pub fn exponential_buckets(
    scale: i8,
    offset: i32,
    positive: &[u64],
    low_count: u64,
) -> (Vec<f64>, Vec<u64>) {
    if positive.is_empty() {
        return (Vec::new(), vec![low_count]);
    }

    let base = 2f64.powf(2f64.powi(-i32::from(scale)));
    let boundaries = (0..positive.len())
        .map(|i| base.powf(f64::from(offset) + i as f64 + 1.0))
        .collect();

    let mut counts = Vec::with_capacity(positive.len() + 1);
    counts.push(low_count + positive[0]);
    counts.extend_from_slice(&positive[1..]);
    counts.push(0);

    (boundaries, counts)
}
