//! # Webnovel Runtime
//!
//! Process-level plumbing shared by the platform services.
//!
//! - [`retry`]: exponential backoff for calls to external collaborators
//!   (the identity provider)
//! - [`metrics`]: Prometheus recorder installation and the platform's
//!   business and HTTP metrics

/// Retry logic with exponential backoff
pub mod retry;

/// Prometheus metrics for observability
pub mod metrics;
