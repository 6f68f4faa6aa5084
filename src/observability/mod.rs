//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registrar / factory / dispatcher produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//! ```

pub mod logging;
pub mod metrics;
