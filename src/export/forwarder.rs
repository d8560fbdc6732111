//! HTTP delivery
//!
//! Posts one JSON document per call to a fixed destination and classifies the
//! outcome. Idle connection pooling is disabled, so every call opens a new
//! connection that is closed once the response status has been read.
//!
//! The blocking client runs its own runtime and must not be driven from a
//! thread that is inside an async runtime. Building the client and sending a
//! request both happen on a short-lived scoped worker thread; the caller still
//! blocks until the outcome is known.

use std::thread;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ConfigError, ExportError, ExporterError};

/// Whether a collector response counts as delivered
///
/// Only 200 OK and 201 Created are accepted, for every signal.
pub fn is_accepted(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::CREATED
}

/// Run `f` on a scoped worker thread and wait for it
fn off_runtime<T, F>(f: F) -> thread::Result<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    thread::scope(|scope| scope.spawn(f).join())
}

/// Synchronous JSON-over-HTTP sink for one destination
#[derive(Debug, Clone)]
pub struct HttpForwarder {
    destination: Url,
    client: Client,
}

impl HttpForwarder {
    /// Create a forwarder for `destination`
    ///
    /// `timeout` bounds the whole request; `None` keeps the client default.
    pub fn new(destination: Url, timeout: Option<Duration>) -> Result<Self, ExporterError> {
        if destination.scheme() != "http" && destination.scheme() != "https" {
            return Err(ExporterError::Config(ConfigError::InvalidUrl(format!(
                "Destination must use http:// or https:// scheme: {}",
                destination
            ))));
        }

        let client = off_runtime(move || {
            let mut builder = Client::builder().pool_max_idle_per_host(0);
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            builder.build().map_err(|e| e.to_string())
        })
        .unwrap_or_else(|_| Err("HTTP client builder panicked".to_string()))
        .map_err(|e| {
            ConfigError::HttpClient(format!("Failed to create HTTP client: {}", e))
        })?;

        info!(
            destination = %destination,
            timeout_secs = timeout.map(|t| t.as_secs()),
            "Created HTTP forwarder"
        );

        Ok(Self {
            destination,
            client,
        })
    }

    /// Destination every payload is posted to
    pub fn destination(&self) -> &Url {
        &self.destination
    }

    /// POST `payload` with `Content-Type: application/json`
    ///
    /// Blocks the calling thread until the response status is known. Safe to
    /// call from inside an async runtime.
    pub fn send(&self, payload: Vec<u8>) -> Result<(), ExportError> {
        let payload_bytes = payload.len();

        let status = off_runtime(|| self.post(payload)).unwrap_or_else(|_| {
            Err(ExportError::Network(
                "HTTP delivery worker panicked".to_string(),
            ))
        })?;

        if !is_accepted(status) {
            warn!(
                destination = %self.destination,
                status = status.as_u16(),
                "Destination rejected payload"
            );
            return Err(ExportError::RejectedStatus(status.as_u16()));
        }

        debug!(
            destination = %self.destination,
            status = status.as_u16(),
            payload_bytes,
            "Delivered payload"
        );
        Ok(())
    }

    fn post(&self, payload: Vec<u8>) -> Result<StatusCode, ExportError> {
        let response = self
            .client
            .post(self.destination.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .map_err(|e| {
                warn!(
                    destination = %self.destination,
                    error = %e,
                    "Failed to reach destination"
                );
                ExportError::Network(e.to_string())
            })?;
        Ok(response.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_policy() {
        assert!(is_accepted(StatusCode::OK));
        assert!(is_accepted(StatusCode::CREATED));
        assert!(!is_accepted(StatusCode::ACCEPTED));
        assert!(!is_accepted(StatusCode::NO_CONTENT));
        assert!(!is_accepted(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let url = Url::parse("ftp://localhost:21").unwrap();
        assert!(HttpForwarder::new(url, None).is_err());
    }

    #[tokio::test]
    async fn test_usable_inside_async_runtime() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let url = Url::parse(&format!("http://127.0.0.1:{}", port)).unwrap();
        let forwarder = HttpForwarder::new(url, Some(Duration::from_secs(2))).unwrap();

        match forwarder.send(b"[]".to_vec()) {
            Err(ExportError::Network(_)) => {}
            other => panic!("Expected network error, got: {:?}", other),
        }
        drop(forwarder);
    }
}
