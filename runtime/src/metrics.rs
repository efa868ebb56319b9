//! Prometheus metrics for observability and monitoring.
//!
//! Metric families:
//! - Commerce: purchases, cash debited, sponsorships
//! - Gifts: promotion gifts issued and received
//! - Operations: per-command latency and outcome
//! - HTTP: request counts and latency
//! - Retry: identity-provider retries
//!
//! # Example
//!
//! ```rust,no_run
//! use webnovel_runtime::metrics::MetricsServer;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = MetricsServer::new("0.0.0.0:9090".parse()?);
//! server.start()?;
//! let body = server.render();
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub use metrics::{counter, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus recorder plus the address its scrape endpoint binds to.
pub struct MetricsServer {
    addr: SocketAddr,
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create a server for `addr` (e.g. `0.0.0.0:9090`).
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr, handle: None }
    }

    /// Scrape endpoint address.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Install the global recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed. A recorder
    /// installed earlier in the process (tests) is tolerated.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!(addr = %self.addr, "Metrics recorder installed");
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                if message.contains("already") {
                    tracing::warn!("Metrics recorder already initialized, skipping");
                    Ok(())
                } else {
                    Err(MetricsError::Install(message))
                }
            }
        }
    }

    /// Handle for rendering, once started.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Current metrics in Prometheus text format; `None` before `start`.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

fn register_metrics() {
    describe_counter!(
        "webnovel_purchases_total",
        "Episodes bought, by kind (own, rental, bulk)"
    );
    describe_counter!("webnovel_cash_debited_total", "Cash debited from users");
    describe_counter!("webnovel_sponsorships_total", "Sponsorships made");
    describe_counter!(
        "webnovel_promotion_gifts_issued_total",
        "Gifts deposited by promotions, by promotion type"
    );
    describe_counter!(
        "webnovel_gifts_received_total",
        "Gifts moved into the productbook, by promotion type"
    );
    describe_histogram!(
        "webnovel_operation_duration_seconds",
        "Command latency, by operation and outcome"
    );
    describe_counter!(
        "webnovel_http_requests_total",
        "HTTP requests, by method and status"
    );
    describe_histogram!(
        "webnovel_http_request_duration_seconds",
        "HTTP request latency"
    );
    describe_counter!("webnovel_retry_attempts_total", "Retries scheduled");
    describe_counter!("webnovel_retry_successes_total", "Operations that recovered");
    describe_counter!("webnovel_retry_exhausted_total", "Operations that ran out of retries");
}

/// Cash and purchase metrics.
pub struct CommerceMetrics;

impl CommerceMetrics {
    /// Record episodes bought and the cash they cost.
    pub fn record_purchase(kind: &'static str, episodes: u64, cash: u64) {
        counter!("webnovel_purchases_total", "kind" => kind).increment(episodes);
        counter!("webnovel_cash_debited_total").increment(cash);
    }

    /// Record a sponsorship.
    pub fn record_sponsorship(cash: u64) {
        counter!("webnovel_sponsorships_total").increment(1);
        counter!("webnovel_cash_debited_total").increment(cash);
    }
}

/// Gift pipeline metrics.
pub struct GiftMetrics;

impl GiftMetrics {
    /// Record gifts deposited by a promotion.
    pub fn record_issued(promotion_type: &'static str, count: u64) {
        counter!("webnovel_promotion_gifts_issued_total", "promotion_type" => promotion_type)
            .increment(count);
    }

    /// Record a gift received.
    pub fn record_received(promotion_type: &'static str) {
        counter!("webnovel_gifts_received_total", "promotion_type" => promotion_type).increment(1);
    }
}

/// Per-command latency.
pub struct OperationMetrics;

impl OperationMetrics {
    /// Record one command execution.
    pub fn record(operation: &'static str, outcome: &'static str, duration: Duration) {
        histogram!(
            "webnovel_operation_duration_seconds",
            "operation" => operation,
            "outcome" => outcome
        )
        .record(duration.as_secs_f64());
    }
}

/// HTTP metrics.
pub struct HttpMetrics;

impl HttpMetrics {
    /// Record one request.
    pub fn record_request(method: String, status: u16, duration: Duration) {
        counter!(
            "webnovel_http_requests_total",
            "method" => method,
            "status" => status.to_string()
        )
        .increment(1);
        histogram!("webnovel_http_request_duration_seconds").record(duration.as_secs_f64());
    }
}

/// Retry metrics recorder.
pub struct RetryMetrics;

impl RetryMetrics {
    /// Record a retry attempt.
    pub fn record_attempt(operation: &'static str) {
        counter!("webnovel_retry_attempts_total", "operation" => operation).increment(1);
    }

    /// Record a successful retry.
    pub fn record_success(operation: &'static str) {
        counter!("webnovel_retry_successes_total", "operation" => operation).increment(1);
    }

    /// Record exhausted retries.
    pub fn record_exhausted(operation: &'static str) {
        counter!("webnovel_retry_exhausted_total", "operation" => operation).increment(1);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn server_has_no_handle_before_start() {
        let server = MetricsServer::new("127.0.0.1:0".parse().unwrap());
        assert!(server.handle().is_none());
        assert!(server.render().is_none());
    }

    #[test]
    fn recorded_business_metrics_render() {
        let mut server = MetricsServer::new("127.0.0.1:0".parse().unwrap());
        server.start().unwrap();

        CommerceMetrics::record_purchase("bulk", 3, 300);
        GiftMetrics::record_issued("reader-of-prev", 3);

        // Another test may have installed the recorder first.
        if let Some(rendered) = server.render() {
            assert!(rendered.contains("webnovel_purchases_total"));
            assert!(rendered.contains("webnovel_promotion_gifts_issued_total"));
        }
    }
}
