//! Metrics and reporting for database loads.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Load and lookup metrics (thread-safe counters).
#[derive(Debug, Clone)]
pub struct LoadMetrics {
    /// Modules registered from decodable records
    pub modules_registered: Arc<AtomicU64>,
    /// Module records that failed to decode
    pub module_decode_failures: Arc<AtomicU64>,
    /// Members assigned into a module, type or multi-member slot
    pub members_assigned: Arc<AtomicU64>,
    /// Member records skipped by the version gate
    pub members_version_gated: Arc<AtomicU64>,
    /// Member records skipped as malformed
    pub malformed_records: Arc<AtomicU64>,
    /// Fixups added to the worklist
    pub fixups_queued: Arc<AtomicU64>,
    /// Fixup retries that made no progress
    pub fixups_deferred: Arc<AtomicU64>,
    /// Type references that fell back to the root type
    pub type_fallbacks: Arc<AtomicU64>,
    /// Member and module references dropped as unresolvable
    pub dropped_references: Arc<AtomicU64>,
    /// Constant lookups served from the cache
    pub constant_cache_hits: Arc<AtomicU64>,
    /// Constant lookups that created a new constant
    pub constant_cache_misses: Arc<AtomicU64>,
}

impl Default for LoadMetrics {
    fn default() -> Self {
        Self {
            modules_registered: Arc::new(AtomicU64::new(0)),
            module_decode_failures: Arc::new(AtomicU64::new(0)),
            members_assigned: Arc::new(AtomicU64::new(0)),
            members_version_gated: Arc::new(AtomicU64::new(0)),
            malformed_records: Arc::new(AtomicU64::new(0)),
            fixups_queued: Arc::new(AtomicU64::new(0)),
            fixups_deferred: Arc::new(AtomicU64::new(0)),
            type_fallbacks: Arc::new(AtomicU64::new(0)),
            dropped_references: Arc::new(AtomicU64::new(0)),
            constant_cache_hits: Arc::new(AtomicU64::new(0)),
            constant_cache_misses: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl LoadMetrics {
    pub fn record_module_registered(&self) {
        self.modules_registered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_failure(&self) {
        self.module_decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_member_assigned(&self) {
        self.members_assigned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_version_gated(&self) {
        self.members_version_gated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed(&self) {
        self.malformed_records.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fixup_queued(&self) {
        self.fixups_queued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fixup_deferred(&self) {
        self.fixups_deferred.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_type_fallback(&self) {
        self.type_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_reference(&self) {
        self.dropped_references.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a constant cache lookup.
    pub fn record_constant_lookup(&self, hit: bool) {
        if hit {
            self.constant_cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.constant_cache_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            modules_registered: self.modules_registered.load(Ordering::Relaxed),
            module_decode_failures: self.module_decode_failures.load(Ordering::Relaxed),
            members_assigned: self.members_assigned.load(Ordering::Relaxed),
            members_version_gated: self.members_version_gated.load(Ordering::Relaxed),
            malformed_records: self.malformed_records.load(Ordering::Relaxed),
            fixups_queued: self.fixups_queued.load(Ordering::Relaxed),
            fixups_deferred: self.fixups_deferred.load(Ordering::Relaxed),
            type_fallbacks: self.type_fallbacks.load(Ordering::Relaxed),
            dropped_references: self.dropped_references.load(Ordering::Relaxed),
            constant_cache_hits: self.constant_cache_hits.load(Ordering::Relaxed),
            constant_cache_misses: self.constant_cache_misses.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of metrics (for reporting).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub modules_registered: u64,
    pub module_decode_failures: u64,
    pub members_assigned: u64,
    pub members_version_gated: u64,
    pub malformed_records: u64,
    pub fixups_queued: u64,
    pub fixups_deferred: u64,
    pub type_fallbacks: u64,
    pub dropped_references: u64,
    pub constant_cache_hits: u64,
    pub constant_cache_misses: u64,
}

impl MetricsSnapshot {
    /// Total constant lookups.
    pub fn total_constant_lookups(&self) -> u64 {
        self.constant_cache_hits + self.constant_cache_misses
    }

    /// Constant cache hit rate.
    pub fn constant_hit_rate(&self) -> f64 {
        let total = self.total_constant_lookups();
        if total == 0 {
            return 0.0;
        }
        self.constant_cache_hits as f64 / total as f64
    }

    /// Format a human-readable report.
    pub fn format_report(&self) -> String {
        let mut lines = Vec::new();
        lines.push("Load Metrics Report".to_string());
        lines.push("=".repeat(50));
        lines.push("Modules:".to_string());
        lines.push(format!("  Registered:      {}", self.modules_registered));
        lines.push(format!("  Decode failures: {}", self.module_decode_failures));
        lines.push(String::new());
        lines.push("Members:".to_string());
        lines.push(format!("  Assigned:        {}", self.members_assigned));
        lines.push(format!("  Version gated:   {}", self.members_version_gated));
        lines.push(format!("  Malformed:       {}", self.malformed_records));
        lines.push(String::new());
        lines.push("Fixups:".to_string());
        lines.push(format!("  Queued:          {}", self.fixups_queued));
        lines.push(format!("  Deferred:        {}", self.fixups_deferred));
        lines.push(format!("  Type fallbacks:  {}", self.type_fallbacks));
        lines.push(format!("  Dropped refs:    {}", self.dropped_references));
        lines.push(String::new());
        lines.push("Constants:".to_string());
        lines.push(format!("  Cache hits:      {}", self.constant_cache_hits));
        lines.push(format!("  Cache misses:    {}", self.constant_cache_misses));
        lines.push(format!(
            "  Hit Rate:        {:.1}%",
            self.constant_hit_rate() * 100.0
        ));
        lines.join("\n")
    }
}
