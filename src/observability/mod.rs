//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields (path, source, cache_path, plugin) on every event
//! - Request ID flows from the host's request-id layer into log fields
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
