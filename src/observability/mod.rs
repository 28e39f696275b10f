//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Registration and request handling produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields, not formatted strings
//! - Request ID (tower-http) flows through every request span
//! - Metrics exporter only starts when enabled in config

pub mod logging;
pub mod metrics;
