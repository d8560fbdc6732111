//! Tests for the metric JSON document shape

use otel_json_exporter::ExportError;
use otel_json_exporter::export::codec::encode_metrics;
use otel_json_exporter::export::model::{
    DataPoint, HistogramValue, MetricRecord, MetricType, PointValue, QuantileValue, SummaryValue,
};
use serde_json::{Value, json};

fn encode(metrics: &[MetricRecord]) -> String {
    String::from_utf8(encode_metrics(metrics).unwrap()).unwrap()
}

#[test]
fn test_long_sum_document() {
    let metric = MetricRecord::new("http.requests", MetricType::LongSum)
        .with_description("Handled requests")
        .with_unit("1")
        .with_point(DataPoint::new(100, 200, PointValue::Long(42)).with_attribute("route", "/"));

    let document: Value = serde_json::from_str(&encode(&[metric])).unwrap();
    assert_eq!(
        document,
        json!([{
            "name": "http.requests",
            "description": "Handled requests",
            "unit": "1",
            "type": "LONG_SUM",
            "dataPoints": [{
                "startTimeUnixNano": 100,
                "timeUnixNano": 200,
                "value": 42,
                "attributes": {"route": "/"}
            }]
        }])
    );
}

#[test]
fn test_unsigned_value_above_i64_range_is_exact() {
    let metric = MetricRecord::new("bytes.sent", MetricType::LongSum)
        .with_point(DataPoint::new(0, 1, PointValue::UnsignedLong(u64::MAX)));

    let json = encode(&[metric]);
    assert!(json.contains(r#""value":18446744073709551615"#));
}

#[test]
fn test_histogram_point_layout() {
    let metric = MetricRecord::new("latency", MetricType::Histogram).with_point(DataPoint::new(
        0,
        1,
        PointValue::Histogram(HistogramValue {
            count: 10,
            sum: 55.0,
            boundaries: vec![1.0, 5.0, 10.0],
            counts: vec![2, 5, 3],
        }),
    ));

    let json = encode(&[metric]);
    assert!(json.contains(
        r#""histogram":{"count":10,"sum":55.0,"boundaries":[1.0,5.0,10.0],"counts":[2,5,3]}"#
    ));
    assert!(!json.contains(r#""value""#));
}

#[test]
fn test_summary_point_layout() {
    let metric = MetricRecord::new("rpc.duration", MetricType::Summary).with_point(DataPoint::new(
        0,
        1,
        PointValue::Summary(SummaryValue {
            count: 4,
            sum: 10.5,
            quantiles: vec![
                QuantileValue {
                    quantile: 0.5,
                    value: 2.0,
                },
                QuantileValue {
                    quantile: 0.99,
                    value: 4.5,
                },
            ],
        }),
    ));

    let document: Value = serde_json::from_str(&encode(&[metric])).unwrap();
    assert_eq!(document[0]["type"], "SUMMARY");
    assert_eq!(
        document[0]["dataPoints"][0]["summary"],
        json!({
            "count": 4,
            "sum": 10.5,
            "quantiles": [
                {"quantile": 0.5, "value": 2.0},
                {"quantile": 0.99, "value": 4.5}
            ]
        })
    );
}

#[test]
fn test_point_attributes_sorted_by_key() {
    let metric = MetricRecord::new("queue.depth", MetricType::LongGauge).with_point(
        DataPoint::new(0, 1, PointValue::Long(3))
            .with_attribute("zone", "b")
            .with_attribute("app", "a"),
    );

    let json = encode(&[metric]);
    assert!(json.contains(r#""attributes":{"app":"a","zone":"b"}"#));
}

#[test]
fn test_metric_without_points() {
    let metric = MetricRecord::new("idle", MetricType::DoubleSum);
    let document: Value = serde_json::from_str(&encode(&[metric])).unwrap();

    assert_eq!(document[0]["type"], "DOUBLE_SUM");
    assert_eq!(document[0]["description"], "");
    assert_eq!(document[0]["unit"], "");
    assert_eq!(document[0]["dataPoints"], json!([]));
}

#[test]
fn test_empty_metric_batch_is_empty_array() {
    assert_eq!(encode(&[]), "[]");
}

#[test]
fn test_mismatched_point_value_rejected() {
    let metric = MetricRecord::new("bad", MetricType::LongSum)
        .with_point(DataPoint::new(0, 1, PointValue::Double(1.5)));

    match encode_metrics(&[metric]) {
        Err(ExportError::Serialization(msg)) => assert!(msg.contains("bad")),
        other => panic!("Expected serialization error, got: {:?}", other),
    }
}

#[test]
fn test_infinite_sum_is_null() {
    let metric = MetricRecord::new("overflow", MetricType::Histogram).with_point(DataPoint::new(
        0,
        1,
        PointValue::Histogram(HistogramValue {
            count: 1,
            sum: f64::INFINITY,
            boundaries: Vec::new(),
            counts: vec![1],
        }),
    ));

    let json = encode(&[metric]);
    assert!(json.contains(r#""sum":null"#));
}
