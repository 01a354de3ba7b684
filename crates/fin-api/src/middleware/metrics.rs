//! # Prometheus Metrics
//!
//! HTTP metrics (request counts, latency, errors) are recorded by
//! [`metrics_middleware`]. Store gauges (requests by status, ledger and
//! audit sizes) are refreshed on each `/metrics` scrape by the handler in
//! `lib.rs`.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use prometheus::core::Collector;
use prometheus::{
    Encoder, Gauge, GaugeVec, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry,
    TextEncoder,
};

/// Shared metrics state backed by a Prometheus registry.
#[derive(Clone)]
pub struct ApiMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,

    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    http_errors_total: IntCounterVec,

    requests_by_status: GaugeVec,
    ledger_entries: Gauge,
    audit_entries: Gauge,
}

impl std::fmt::Debug for ApiMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiMetrics")
            .field("requests", &self.requests())
            .field("errors", &self.errors())
            .finish()
    }
}

fn register<C: Collector + Clone + 'static>(registry: &Registry, collector: C) -> C {
    registry
        .register(Box::new(collector.clone()))
        .expect("metric can be registered");
    collector
}

impl ApiMetrics {
    /// Create a new metrics instance with a fresh registry.
    pub fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = register(
            &registry,
            IntCounterVec::new(
                Opts::new("fin_http_requests_total", "Total HTTP requests"),
                &["method", "path", "status"],
            )
            .expect("metric can be created"),
        );

        let http_request_duration_seconds = register(
            &registry,
            HistogramVec::new(
                HistogramOpts::new(
                    "fin_http_request_duration_seconds",
                    "HTTP request duration in seconds",
                )
                .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
                &["method", "path"],
            )
            .expect("metric can be created"),
        );

        let http_errors_total = register(
            &registry,
            IntCounterVec::new(
                Opts::new("fin_http_errors_total", "Total HTTP errors (4xx and 5xx)"),
                &["method", "path", "status"],
            )
            .expect("metric can be created"),
        );

        let requests_by_status = register(
            &registry,
            GaugeVec::new(
                Opts::new("fin_requests_total", "Fund requests by status"),
                &["status"],
            )
            .expect("metric can be created"),
        );

        let ledger_entries = register(
            &registry,
            Gauge::new("fin_ledger_entries_total", "Ledger entries").expect("metric can be created"),
        );

        let audit_entries = register(
            &registry,
            Gauge::new("fin_audit_entries_total", "Audit log entries")
                .expect("metric can be created"),
        );

        Self {
            inner: Arc::new(Inner {
                registry,
                http_requests_total,
                http_request_duration_seconds,
                http_errors_total,
                requests_by_status,
                ledger_entries,
                audit_entries,
            }),
        }
    }

    /// Total request count across all labels.
    pub fn requests(&self) -> u64 {
        sum_counter(&self.inner.http_requests_total)
    }

    /// Total error count across all labels.
    pub fn errors(&self) -> u64 {
        sum_counter(&self.inner.http_errors_total)
    }

    fn record_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.inner
            .http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();
        self.inner
            .http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
        if status >= 400 {
            self.inner
                .http_errors_total
                .with_label_values(&[method, path, &status_str])
                .inc();
        }
    }

    /// Gauge of fund requests, labelled by status.
    pub fn requests_by_status(&self) -> &GaugeVec {
        &self.inner.requests_by_status
    }

    /// Gauge of ledger entries.
    pub fn ledger_entries(&self) -> &Gauge {
        &self.inner.ledger_entries
    }

    /// Gauge of audit log entries.
    pub fn audit_entries(&self) -> &Gauge {
        &self.inner.audit_entries
    }

    /// Gather all metrics and encode them in the Prometheus text format.
    pub fn gather_and_encode(&self) -> Result<String, String> {
        let encoder = TextEncoder::new();
        let families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&families, &mut buffer)
            .map_err(|e| format!("failed to encode metrics: {e}"))?;
        String::from_utf8(buffer).map_err(|e| format!("metrics encoding produced invalid UTF-8: {e}"))
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn sum_counter(counter: &IntCounterVec) -> u64 {
    counter
        .collect()
        .iter()
        .flat_map(|family| family.get_metric())
        .map(|m| m.get_counter().get_value() as u64)
        .sum()
}

/// Replace UUID path segments with `{id}` to bound label cardinality.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if uuid::Uuid::try_parse(segment).is_ok() {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Middleware that records HTTP request metrics.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());
    let start = Instant::now();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        m.record_request(
            &method,
            &path,
            response.status().as_u16(),
            start.elapsed().as_secs_f64(),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_metrics_start_at_zero() {
        let m = ApiMetrics::default();
        assert_eq!(m.requests(), 0);
        assert_eq!(m.errors(), 0);
    }

    #[test]
    fn errors_count_client_and_server_failures() {
        let m = ApiMetrics::new();
        m.record_request("GET", "/v1/requests", 200, 0.01);
        m.record_request("POST", "/v1/requests", 400, 0.01);
        m.record_request("GET", "/v1/dashboard", 500, 0.2);
        assert_eq!(m.requests(), 3);
        assert_eq!(m.errors(), 2);
    }

    #[test]
    fn clones_share_the_registry() {
        let a = ApiMetrics::new();
        let b = a.clone();
        a.record_request("GET", "/metrics", 200, 0.001);
        assert_eq!(b.requests(), 1);
    }

    #[test]
    fn encoded_text_carries_counters_and_gauges() {
        let m = ApiMetrics::new();
        m.record_request("GET", "/v1/requests", 200, 0.01);
        m.requests_by_status().with_label_values(&["PENDING"]).set(2.0);
        m.audit_entries().set(5.0);
        let text = m.gather_and_encode().unwrap();
        assert!(text.contains("# TYPE fin_http_requests_total counter"));
        assert!(text.contains("fin_http_request_duration_seconds"));
        assert!(text.contains("fin_requests_total{status=\"PENDING\"} 2"));
        assert!(text.contains("fin_audit_entries_total 5"));
    }

    #[test]
    fn request_ids_collapse_in_paths() {
        assert_eq!(
            normalize_path("/v1/requests/6f1c1a52-8a4e-4d4b-9a55-0f4b4c1e2d11/approve"),
            "/v1/requests/{id}/approve"
        );
        assert_eq!(normalize_path("/v1/ledger/summary"), "/v1/ledger/summary");
    }
}
