//! Tier metrics recording.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use metrics::{counter, histogram};
use strata_core::Tier;

/// Describes the dispatcher metrics.
/// Call once at startup, after installing a recorder.
pub fn register_dispatch_metrics() {
    metrics::describe_counter!("strata_tier_hits_total", "Results served, by tier");
    metrics::describe_counter!("strata_tier_misses_total", "Reads that missed, by tier");
    metrics::describe_counter!(
        "strata_origin_failures_total",
        "Origin calls that failed or returned no data"
    );
    metrics::describe_counter!(
        "strata_write_failures_total",
        "Write-backs that failed, by tier"
    );
    metrics::describe_histogram!(
        "strata_dispatch_seconds",
        "Time spent serving a dispatch, by tier"
    );
}

/// Recorder de metricas por tier.
/// Keeps in-process counters next to the `metrics` facade.
#[derive(Debug, Clone, Default)]
pub struct TierMetrics {
    cache_hits: Arc<AtomicU64>,
    storage_hits: Arc<AtomicU64>,
    origin_hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    origin_failures: Arc<AtomicU64>,
    write_failures: Arc<AtomicU64>,
}

impl TierMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un resultado servido por `tier`
    pub fn record_hit(&self, tier: Tier, elapsed: Duration) {
        let slot = match tier {
            Tier::Cache => &self.cache_hits,
            Tier::Storage => &self.storage_hits,
            Tier::Origin => &self.origin_hits,
        };
        slot.fetch_add(1, Ordering::Relaxed);
        counter!("strata_tier_hits_total", "tier" => tier.as_str()).increment(1);
        histogram!("strata_dispatch_seconds", "tier" => tier.as_str()).record(elapsed.as_secs_f64());
    }

    /// Registra un miss en `tier`
    pub fn record_miss(&self, tier: Tier) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("strata_tier_misses_total", "tier" => tier.as_str()).increment(1);
    }

    /// Registra un fallo del origin
    pub fn record_origin_failure(&self) {
        self.origin_failures.fetch_add(1, Ordering::Relaxed);
        counter!("strata_origin_failures_total").increment(1);
    }

    /// Registra un write-back fallido
    pub fn record_write_failure(&self, tier: Tier) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
        counter!("strata_write_failures_total", "tier" => tier.as_str()).increment(1);
    }

    /// Number of results served by `tier`.
    pub fn hits(&self, tier: Tier) -> u64 {
        match tier {
            Tier::Cache => self.cache_hits.load(Ordering::Relaxed),
            Tier::Storage => self.storage_hits.load(Ordering::Relaxed),
            Tier::Origin => self.origin_hits.load(Ordering::Relaxed),
        }
    }

    /// Reads that missed in cache or storage.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn origin_failures(&self) -> u64 {
        self.origin_failures.load(Ordering::Relaxed)
    }

    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    /// Share of served results that avoided the origin.
    pub fn hit_rate(&self) -> f64 {
        let tiered = (self.hits(Tier::Cache) + self.hits(Tier::Storage)) as f64;
        let total = tiered + self.hits(Tier::Origin) as f64;
        if total == 0.0 { 0.0 } else { tiered / total }
    }
}
