//! Observability subsystem.
//!
//! Structured logs go through `tracing`; request outcomes and savings are
//! counted with the `metrics` crate and optionally exposed for Prometheus
//! scraping.

pub mod logging;
pub mod metrics;
