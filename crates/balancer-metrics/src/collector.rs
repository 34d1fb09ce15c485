//! Metrics collector — tracks balance operations and HTTP requests.
//!
//! Counters are atomics; label maps sit behind an `RwLock` and histograms
//! behind a mutex. Series are created on first use and live for the whole
//! process, so every counter is cumulative.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::histogram::{DURATION_BUCKETS, Histogram, HistogramSnapshot, PORTION_BUCKETS};

/// Classification label used when a balance call carries no recipe type.
pub const UNKNOWN_RECIPE_TYPE: &str = "unknown";

/// Outcome of one balance call, as seen by the caller that timed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceOutcome<'a> {
    /// Balanced successfully across `pans` pans.
    Success { pans: usize },
    /// Failed with the given business error category.
    Failure { error_type: &'a str },
}

/// Per-recipe-type balance series.
struct BalanceSeries {
    operations: AtomicU64,
    errors: Mutex<BTreeMap<String, u64>>,
    durations: Mutex<Histogram>,
}

impl BalanceSeries {
    fn new() -> Self {
        Self {
            operations: AtomicU64::new(0),
            errors: Mutex::new(BTreeMap::new()),
            durations: Mutex::new(Histogram::new(DURATION_BUCKETS)),
        }
    }
}

/// Per-route request series.
struct RequestSeries {
    by_status: Mutex<BTreeMap<u16, u64>>,
    durations: Mutex<Histogram>,
}

impl RequestSeries {
    fn new() -> Self {
        Self {
            by_status: Mutex::new(BTreeMap::new()),
            durations: Mutex::new(Histogram::new(DURATION_BUCKETS)),
        }
    }
}

/// Collects balancer metrics for Prometheus exposition and periodic log
/// summaries.
pub struct MetricsCollector {
    /// recipe type → balance series.
    balance: RwLock<BTreeMap<String, Arc<BalanceSeries>>>,
    /// route → request series.
    requests: RwLock<BTreeMap<String, Arc<RequestSeries>>>,
    /// (ingredient type, success) → count.
    ingredient_processing: Mutex<BTreeMap<(String, bool), u64>>,
    portions: Mutex<Histogram>,
    /// Interval between log summaries.
    interval: Duration,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    pub fn new(interval: Duration) -> Self {
        Self {
            balance: RwLock::new(BTreeMap::new()),
            requests: RwLock::new(BTreeMap::new()),
            ingredient_processing: Mutex::new(BTreeMap::new()),
            portions: Mutex::new(Histogram::new(PORTION_BUCKETS)),
            interval,
        }
    }

    /// Record one balance call.
    ///
    /// Successes count as operations, observe the duration and the pan
    /// count. Failures only increment the error counter for `error_type`.
    pub async fn record_balance(
        &self,
        recipe_type: &str,
        duration: Duration,
        outcome: BalanceOutcome<'_>,
    ) {
        let series = self.balance_series(recipe_type).await;
        match outcome {
            BalanceOutcome::Success { pans } => {
                series.operations.fetch_add(1, Ordering::Relaxed);
                series.durations.lock().await.observe(duration.as_secs_f64());
                self.portions.lock().await.observe(pans as f64);
                self.record_ingredient_processing("balanced", true).await;
            }
            BalanceOutcome::Failure { error_type } => {
                *series
                    .errors
                    .lock()
                    .await
                    .entry(error_type.to_string())
                    .or_insert(0) += 1;
                self.record_ingredient_processing("balanced", false).await;
            }
        }
        debug!(%recipe_type, ?outcome, elapsed_us = duration.as_micros() as u64, "balance recorded");
    }

    /// Record one HTTP request.
    pub async fn record_request(&self, route: &str, status: u16, duration: Duration) {
        let series = self.request_series(route).await;
        *series.by_status.lock().await.entry(status).or_insert(0) += 1;
        series.durations.lock().await.observe(duration.as_secs_f64());
    }

    pub async fn record_ingredient_processing(&self, ingredient_type: &str, success: bool) {
        *self
            .ingredient_processing
            .lock()
            .await
            .entry((ingredient_type.to_string(), success))
            .or_insert(0) += 1;
    }

    /// Successful balance operations for a recipe type so far.
    pub async fn balance_operations(&self, recipe_type: &str) -> u64 {
        let balance = self.balance.read().await;
        balance
            .get(recipe_type)
            .map(|s| s.operations.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Failed balance operations for a recipe type and error category.
    pub async fn balance_errors(&self, recipe_type: &str, error_type: &str) -> u64 {
        let series = match self.balance.read().await.get(recipe_type) {
            Some(s) => s.clone(),
            None => return 0,
        };
        let errors = series.errors.lock().await;
        errors.get(error_type).copied().unwrap_or(0)
    }

    /// Requests seen for a route, across all statuses.
    pub async fn request_count(&self, route: &str) -> u64 {
        let series = match self.requests.read().await.get(route) {
            Some(s) => s.clone(),
            None => return 0,
        };
        let by_status = series.by_status.lock().await;
        by_status.values().sum()
    }

    /// Take a consistent-per-series view of every metric.
    pub async fn snapshot(&self) -> MetricsSnapshot {
        let mut balance = Vec::new();
        for (recipe_type, series) in self.balance.read().await.iter() {
            let errors = series.errors.lock().await;
            balance.push(BalanceSnapshot {
                recipe_type: recipe_type.clone(),
                operations: series.operations.load(Ordering::Relaxed),
                errors: errors.iter().map(|(k, v)| (k.clone(), *v)).collect(),
                duration: series.durations.lock().await.snapshot(),
            });
        }

        let mut requests = Vec::new();
        for (route, series) in self.requests.read().await.iter() {
            let by_status = series.by_status.lock().await;
            requests.push(RequestSnapshot {
                route: route.clone(),
                by_status: by_status.iter().map(|(k, v)| (*k, *v)).collect(),
                duration: series.durations.lock().await.snapshot(),
            });
        }

        let ingredient_processing = self
            .ingredient_processing
            .lock()
            .await
            .iter()
            .map(|((kind, success), count)| (kind.clone(), *success, *count))
            .collect();

        MetricsSnapshot {
            balance,
            requests,
            ingredient_processing,
            portions: self.portions.lock().await.snapshot(),
        }
    }

    /// Log a summary every interval until shutdown.
    pub async fn run(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs(),
            "metrics collector started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {
                    self.log_summary().await;
                }
                _ = shutdown.changed() => {
                    info!("metrics collector shutting down");
                    self.log_summary().await;
                    break;
                }
            }
        }
    }

    async fn log_summary(&self) {
        let snap = self.snapshot().await;
        info!(
            balance_operations = snap.total_operations(),
            balance_errors = snap.total_errors(),
            requests = snap.total_requests(),
            "metrics summary"
        );
    }

    async fn balance_series(&self, recipe_type: &str) -> Arc<BalanceSeries> {
        if let Some(series) = self.balance.read().await.get(recipe_type) {
            return series.clone();
        }
        let mut balance = self.balance.write().await;
        balance
            .entry(recipe_type.to_string())
            .or_insert_with(|| Arc::new(BalanceSeries::new()))
            .clone()
    }

    async fn request_series(&self, route: &str) -> Arc<RequestSeries> {
        if let Some(series) = self.requests.read().await.get(route) {
            return series.clone();
        }
        let mut requests = self.requests.write().await;
        requests
            .entry(route.to_string())
            .or_insert_with(|| Arc::new(RequestSeries::new()))
            .clone()
    }
}

/// Balance series for one recipe type.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceSnapshot {
    pub recipe_type: String,
    pub operations: u64,
    /// `(error type, count)`, sorted by error type.
    pub errors: Vec<(String, u64)>,
    pub duration: HistogramSnapshot,
}

/// Request series for one route.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSnapshot {
    pub route: String,
    /// `(status code, count)`, sorted by status.
    pub by_status: Vec<(u16, u64)>,
    pub duration: HistogramSnapshot,
}

/// Everything the collector knows at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub balance: Vec<BalanceSnapshot>,
    pub requests: Vec<RequestSnapshot>,
    /// `(ingredient type, success, count)`.
    pub ingredient_processing: Vec<(String, bool, u64)>,
    pub portions: HistogramSnapshot,
}

impl MetricsSnapshot {
    pub fn total_operations(&self) -> u64 {
        self.balance.iter().map(|b| b.operations).sum()
    }

    pub fn total_errors(&self) -> u64 {
        self.balance
            .iter()
            .flat_map(|b| b.errors.iter().map(|(_, c)| *c))
            .sum()
    }

    pub fn total_requests(&self) -> u64 {
        self.requests
            .iter()
            .flat_map(|r| r.by_status.iter().map(|(_, c)| *c))
            .sum()
    }
}
