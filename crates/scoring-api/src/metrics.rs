//! Prometheus metrics for the scoring API
//!
//! - `scoring_api_requests_total` (counter) - requests by method and status code
//! - `scoring_api_request_duration_seconds` (histogram) - handling time by method
//! - `scoring_api_errors_total` (counter) - failed requests by error kind

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use std::time::Instant;

const NAMESPACE: &str = "scoring_api";

pub struct ApiMetrics {
    registry: Arc<Registry>,
    requests_total: CounterVec,
    duration_seconds: HistogramVec,
    errors_total: CounterVec,
}

impl ApiMetrics {
    /// Create the metrics and register them with `registry`
    pub fn new(registry: Arc<Registry>) -> prometheus::Result<Self> {
        let requests_total = CounterVec::new(
            Opts::new("requests_total", "Total number of method requests").namespace(NAMESPACE),
            &["method", "code"],
        )?;

        let duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "request_duration_seconds",
                "Method request handling duration in seconds",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
            &["method"],
        )?;

        let errors_total = CounterVec::new(
            Opts::new("errors_total", "Total number of failed method requests by kind")
                .namespace(NAMESPACE),
            &["kind"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(duration_seconds.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            duration_seconds,
            errors_total,
        })
    }

    /// Metrics on a private registry
    pub fn standalone() -> prometheus::Result<Self> {
        Self::new(Arc::new(Registry::new()))
    }

    pub fn record_request(&self, method: &str, code: u16) {
        let code = code.to_string();
        self.requests_total
            .with_label_values(&[method, code.as_str()])
            .inc();
    }

    pub fn record_error(&self, kind: &str) {
        self.errors_total.with_label_values(&[kind]).inc();
    }

    pub fn start_timer(&self, method: &str) -> RequestTimer<'_> {
        RequestTimer {
            start: Instant::now(),
            method: method.to_string(),
            metrics: self,
        }
    }

    /// Render all registered metrics in the text exposition format
    pub fn encode(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// Records the request duration when dropped
pub struct RequestTimer<'a> {
    start: Instant,
    method: String,
    metrics: &'a ApiMetrics,
}

impl RequestTimer<'_> {
    /// Relabel the observation, for requests whose method is known only after parsing
    pub fn set_method(&mut self, method: &str) {
        self.method = method.to_string();
    }
}

impl Drop for RequestTimer<'_> {
    fn drop(&mut self) {
        self.metrics
            .duration_seconds
            .with_label_values(&[self.method.as_str()])
            .observe(self.start.elapsed().as_secs_f64());
    }
}
