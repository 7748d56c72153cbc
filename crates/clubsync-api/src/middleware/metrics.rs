//! # Request Metrics
//!
//! In-process atomic counters, served as JSON at `/metrics`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use serde::Serialize;
use utoipa::ToSchema;

/// Shared metrics state, cloned into request extensions.
#[derive(Debug, Clone, Default)]
pub struct ApiMetrics {
    request_count: Arc<AtomicU64>,
    client_error_count: Arc<AtomicU64>,
    server_error_count: Arc<AtomicU64>,
    rate_limited_count: Arc<AtomicU64>,
}

/// Point-in-time view of [`ApiMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub client_errors: u64,
    pub server_errors: u64,
    pub rate_limited: u64,
}

impl ApiMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// 4xx and 5xx responses together.
    pub fn errors(&self) -> u64 {
        self.client_error_count.load(Ordering::Relaxed)
            + self.server_error_count.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests(),
            client_errors: self.client_error_count.load(Ordering::Relaxed),
            server_errors: self.server_error_count.load(Ordering::Relaxed),
            rate_limited: self.rate_limited_count.load(Ordering::Relaxed),
        }
    }

    fn record(&self, status: axum::http::StatusCode) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        if status.is_client_error() {
            self.client_error_count.fetch_add(1, Ordering::Relaxed);
        }
        if status.is_server_error() {
            self.server_error_count.fetch_add(1, Ordering::Relaxed);
        }
        if status == axum::http::StatusCode::TOO_MANY_REQUESTS {
            self.rate_limited_count.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Middleware that counts every response by status class.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        m.record(response.status());
    }

    response
}
