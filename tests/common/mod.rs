//! Shared helpers for integration tests
//!
//! The exporters use a blocking HTTP client, so tests drive them from plain
//! threads and keep the mock collector on its own tokio runtime.

#![allow(dead_code)]

use std::borrow::Cow;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use opentelemetry::trace::{SpanContext, SpanId, SpanKind, Status, TraceFlags, TraceId, TraceState};
use opentelemetry::{InstrumentationScope, KeyValue};
use opentelemetry_sdk::trace::{SpanData, SpanEvents, SpanLinks};
use tokio::runtime::Runtime;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Mock HTTP collector answering every POST with a fixed status
pub struct TestCollector {
    server: MockServer,
    runtime: Runtime,
}

impl TestCollector {
    pub fn start(status: u16) -> Self {
        let runtime = Runtime::new().expect("Failed to create tokio runtime");
        let server = runtime.block_on(MockServer::start());
        runtime.block_on(
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(status))
                .mount(&server),
        );
        Self { server, runtime }
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }

    pub fn requests(&self) -> Vec<Request> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.path() == path)
            .collect()
    }

    pub fn json_bodies(&self) -> Vec<serde_json::Value> {
        self.requests()
            .iter()
            .map(|r| r.body_json().expect("Request body should be JSON"))
            .collect()
    }
}

/// URL of a local port nobody listens on
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind probe port");
    let port = listener.local_addr().expect("Probe port has no address").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

pub const TRACE_ID_HEX: &str = "0102030405060708090a0b0c0d0e0f10";
pub const SPAN_ID_HEX: &str = "0102030405060708";

pub fn at_nanos(nanos: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_nanos(nanos)
}

/// Helper function to create a test span
pub fn create_test_span(name: &str) -> SpanData {
    let trace_id = TraceId::from_bytes([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16]);
    let span_id = SpanId::from_bytes([1, 2, 3, 4, 5, 6, 7, 8]);

    let span_context = SpanContext::new(
        trace_id,
        span_id,
        TraceFlags::SAMPLED,
        false,
        TraceState::default(),
    );

    SpanData {
        span_context,
        parent_span_id: SpanId::INVALID,
        span_kind: SpanKind::Server,
        name: Cow::Owned(name.to_string()),
        start_time: at_nanos(1_000),
        end_time: at_nanos(2_500),
        attributes: vec![
            KeyValue::new("service.name", "test-service"),
            KeyValue::new("http.status_code", 200),
        ],
        events: SpanEvents::default(),
        links: SpanLinks::default(),
        status: Status::Ok,
        dropped_attributes_count: 0,
        parent_span_is_remote: false,
        instrumentation_scope: InstrumentationScope::builder("test")
            .with_version("1.0.0")
            .build(),
    }
}
