//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Both components produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request
//! - Metrics are cheap and disabled unless configured

pub mod logging;
pub mod metrics;
