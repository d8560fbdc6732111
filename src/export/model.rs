//! Record model
//!
//! Owned, immutable snapshots of the telemetry handed over by the SDK. The
//! codec only ever sees these types, so the JSON schema is fixed here rather
//! than by whatever the SDK happens to expose.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Attribute map with string-rendered values, ordered by key
pub type Attributes = BTreeMap<String, String>;

/// One finished span
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanRecord {
    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: String,
    pub parent_span_is_remote: bool,
    pub trace_flags: u8,
    pub name: String,
    pub kind: SpanKindName,
    pub start_epoch_nanos: u64,
    pub end_epoch_nanos: u64,
    pub attributes: Attributes,
    pub dropped_attributes_count: u32,
    pub events: Vec<SpanEventRecord>,
    pub dropped_events_count: u32,
    pub links: Vec<SpanLinkRecord>,
    pub dropped_links_count: u32,
    pub status: SpanStatusRecord,
    pub instrumentation_scope: ScopeRecord,
    pub resource: Attributes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpanKindName {
    Internal,
    Server,
    Client,
    Producer,
    Consumer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanEventRecord {
    pub name: String,
    pub epoch_nanos: u64,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanLinkRecord {
    pub trace_id: String,
    pub span_id: String,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanStatusRecord {
    pub status_code: StatusCodeName,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCodeName {
    Unset,
    Ok,
    Error,
}

/// Instrumentation scope that produced a span
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeRecord {
    pub name: String,
    pub version: Option<String>,
    pub schema_url: Option<String>,
}

/// One log entry
///
/// Serializes with the header fields in a fixed order followed by the
/// attribute list, which keeps the record's own ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub time_unix_nano: u64,
    pub severity_number: i32,
    #[serde(rename = "level")]
    pub severity_text: Option<String>,
    pub body: LogBody,
    pub trace_id: String,
    pub span_id: String,
    pub attributes: Vec<LogAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogBody {
    pub string_value: String,
}

impl LogBody {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            string_value: value.into(),
        }
    }
}

/// `{key, value: {stringValue}}` pair of a log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogAttribute {
    pub key: String,
    pub value: LogBody,
}

impl LogAttribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: LogBody::new(value),
        }
    }
}

/// Declared type of a metric stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricType {
    LongGauge,
    DoubleGauge,
    LongSum,
    DoubleSum,
    Histogram,
    ExponentialHistogram,
    Summary,
}

impl MetricType {
    /// Whether a point value is a valid representation for this metric type
    pub fn accepts(&self, value: &PointValue) -> bool {
        matches!(
            (self, value),
            (
                MetricType::LongGauge | MetricType::LongSum,
                PointValue::Long(_) | PointValue::UnsignedLong(_)
            )
                | (MetricType::DoubleGauge | MetricType::DoubleSum, PointValue::Double(_))
                | (
                    MetricType::Histogram | MetricType::ExponentialHistogram,
                    PointValue::Histogram(_)
                )
                | (MetricType::Summary, PointValue::Summary(_))
        )
    }
}

/// One metric stream with its points
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    pub name: String,
    pub description: String,
    pub unit: String,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    pub data_points: Vec<DataPoint>,
}

impl MetricRecord {
    /// Create a metric with no points
    pub fn new(name: impl Into<String>, metric_type: MetricType) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            unit: String::new(),
            metric_type,
            data_points: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_point(mut self, point: DataPoint) -> Self {
        self.data_points.push(point);
        self
    }
}

/// Value carried by a data point; exactly one representation per point
#[derive(Debug, Clone, PartialEq)]
pub enum PointValue {
    Long(i64),
    /// Unsigned integer observation, kept unsigned so large counters are exact
    UnsignedLong(u64),
    Double(f64),
    Histogram(HistogramValue),
    Summary(SummaryValue),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramValue {
    pub count: u64,
    pub sum: f64,
    pub boundaries: Vec<f64>,
    pub counts: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryValue {
    pub count: u64,
    pub sum: f64,
    pub quantiles: Vec<QuantileValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuantileValue {
    pub quantile: f64,
    pub value: f64,
}

/// One observation (or aggregate) of a metric stream
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub start_time_unix_nano: u64,
    pub time_unix_nano: u64,
    pub value: PointValue,
    pub attributes: Attributes,
}

impl DataPoint {
    pub fn new(start_time_unix_nano: u64, time_unix_nano: u64, value: PointValue) -> Self {
        Self {
            start_time_unix_nano,
            time_unix_nano,
            value,
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

impl Serialize for DataPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut point = serializer.serialize_struct("DataPoint", 4)?;
        point.serialize_field("startTimeUnixNano", &self.start_time_unix_nano)?;
        point.serialize_field("timeUnixNano", &self.time_unix_nano)?;
        match &self.value {
            PointValue::Long(v) => point.serialize_field("value", v)?,
            PointValue::UnsignedLong(v) => point.serialize_field("value", v)?,
            PointValue::Double(v) => point.serialize_field("value", v)?,
            PointValue::Histogram(h) => point.serialize_field("histogram", h)?,
            PointValue::Summary(s) => point.serialize_field("summary", s)?,
        }
        point.serialize_field("attributes", &self.attributes)?;
        point.end()
    }
}
