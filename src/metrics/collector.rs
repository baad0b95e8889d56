use crate::core::error::DashboardError;
use crate::stores::assignment_cache::AssignmentIdCache;
use crate::stores::classroom_views::ClassroomViews;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub struct Metrics {
    pub classroom_loads: AtomicU64,
    pub degraded_loads: AtomicU64,
    pub cache_refreshes: AtomicU64,
    pub resolution_misses: AtomicU64,
    pub upstream_failures: AtomicU64,
    pub stats_loads: AtomicU64,
    pub start_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub classroom_loads: u64,
    pub degraded_loads: u64,
    /// Share of classroom loads served without assignments, in percent
    pub degraded_rate: f64,
    pub cache_refreshes: u64,
    pub resolution_misses: u64,
    pub upstream_failures: u64,
    pub stats_loads: u64,
    pub cached_scopes: usize,
    pub open_views: usize,
    pub uptime_seconds: i64,
}

/// Seconds since the Unix epoch; 0 if the clock is before it.
pub fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            classroom_loads: AtomicU64::new(0),
            degraded_loads: AtomicU64::new(0),
            cache_refreshes: AtomicU64::new(0),
            resolution_misses: AtomicU64::new(0),
            upstream_failures: AtomicU64::new(0),
            stats_loads: AtomicU64::new(0),
            start_time: unix_timestamp(),
        }
    }

    pub fn increment_classroom_loads(&self) {
        self.classroom_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_degraded(&self) {
        self.degraded_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cache_refreshes(&self) {
        self.cache_refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_stats_loads(&self) {
        self.stats_loads.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a failed pipeline call under the matching counter.
    pub fn record_error(&self, err: &DashboardError) {
        match err {
            DashboardError::NotFound(_) => {
                self.resolution_misses.fetch_add(1, Ordering::Relaxed);
            }
            DashboardError::FetchFailed { .. }
            | DashboardError::MalformedResponse { .. }
            | DashboardError::PartialDataUnavailable(_) => {
                self.upstream_failures.fetch_add(1, Ordering::Relaxed);
            }
            DashboardError::CredentialMissing | DashboardError::InvalidInput(_) => {}
        }
    }

    pub fn get_snapshot(&self, cache: &AssignmentIdCache, views: &ClassroomViews) -> MetricsSnapshot {
        let classroom_loads = self.classroom_loads.load(Ordering::Relaxed);
        let degraded_loads = self.degraded_loads.load(Ordering::Relaxed);

        let degraded_rate = if classroom_loads > 0 {
            (degraded_loads as f64 / classroom_loads as f64) * 100.0
        } else {
            0.0
        };

        MetricsSnapshot {
            classroom_loads,
            degraded_loads,
            degraded_rate,
            cache_refreshes: self.cache_refreshes.load(Ordering::Relaxed),
            resolution_misses: self.resolution_misses.load(Ordering::Relaxed),
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
            stats_loads: self.stats_loads.load(Ordering::Relaxed),
            cached_scopes: cache.scope_count(),
            open_views: views.len(),
            uptime_seconds: unix_timestamp() - self.start_time,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
