//! balancer-metrics — observability for the ingredients balancer.
//!
//! Tracks balance outcomes (operations, durations, errors by category) and
//! HTTP requests per route, and renders them in the Prometheus text format.
//!
//! # Architecture
//!
//! ```text
//! MetricsCollector
//!   ├── record_balance() ← called around each balance call
//!   ├── record_request() ← called per HTTP request
//!   ├── snapshot() → MetricsSnapshot
//!   └── run() → periodic summary log
//!
//! Prometheus exposition
//!   └── render_prometheus() → text/plain for /metrics endpoint
//! ```

pub mod category;
pub mod collector;
pub mod histogram;
pub mod prometheus;

pub use category::error_category;
pub use collector::{BalanceOutcome, MetricsCollector, MetricsSnapshot, UNKNOWN_RECIPE_TYPE};
pub use histogram::HistogramSnapshot;
pub use prometheus::render_prometheus;
