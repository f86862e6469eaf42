//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! gate + http produce:
//!     → logging.rs (structured tracing events, pretty or JSON)
//!     → metrics.rs (upstream counters and latency histogram)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the HTTP layer's spans
//! - Metric macros are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
