//! balancer-core — recipe balancing for the ingredients balancer service.
//!
//! Scales a recipe's dough and topping to the combined area of a set of
//! pans and splits the dough across the pans by area share. Also computes
//! pan areas from shape dimensions and parses the service configuration.
//!
//! Nothing in this crate logs, records metrics, or performs I/O on the
//! balancing path; callers wrap [`balance`] with whatever instrumentation
//! they need.
//!
//! # Components
//!
//! - **`balancer`** — dough/topping scaling and the per-pan dough split
//! - **`geometry`** — per-shape pan areas
//! - **`types`** — recipe, pan, and result types
//! - **`config`** — `balancer.toml` parsing

pub mod balancer;
pub mod config;
pub mod error;
pub mod geometry;
pub mod types;

pub use balancer::{Balancer, DOUGH_AREA_RATIO, TOTAL_PERCENTAGE, balance};
pub use config::ServiceConfig;
pub use error::{BalanceError, BalanceResult, ConfigError, GeometryError};
pub use geometry::measure_pans;
pub use types::*;
