//! Metrics definitions for the version cache.

use shared::metrics_defs::{MetricDef, MetricType};

pub const CACHE_HIT: MetricDef = MetricDef {
    name: "versions.cache.hit",
    metric_type: MetricType::Counter,
    description: "Single-place lookups served from the fresh cache",
};

pub const CACHE_MISS: MetricDef = MetricDef {
    name: "versions.cache.miss",
    metric_type: MetricType::Counter,
    description: "Single-place lookups with no cached entry",
};

pub const CACHE_EXPIRED: MetricDef = MetricDef {
    name: "versions.cache.expired",
    metric_type: MetricType::Counter,
    description: "Single-place lookups whose cached entry was past its TTL",
};

pub const RECONCILE_PRUNED: MetricDef = MetricDef {
    name: "versions.reconcile.pruned",
    metric_type: MetricType::Counter,
    description: "Cache entries removed for places absent from the live catalog",
};

pub const RECONCILE_BACKFILLED: MetricDef = MetricDef {
    name: "versions.reconcile.backfilled",
    metric_type: MetricType::Counter,
    description: "Places backfilled during a reconciliation pass",
};

pub const RECONCILE_BACKFILL_FAILED: MetricDef = MetricDef {
    name: "versions.reconcile.backfill_failed",
    metric_type: MetricType::Counter,
    description: "Backfill fetches that failed and left a place unresolved",
};

pub const RECONCILE_BUDGET_EXHAUSTED: MetricDef = MetricDef {
    name: "versions.reconcile.budget_exhausted",
    metric_type: MetricType::Counter,
    description: "Reconciliation passes that stopped on the call budget",
};

pub const ALL_METRICS: &[MetricDef] = &[
    CACHE_HIT,
    CACHE_MISS,
    CACHE_EXPIRED,
    RECONCILE_PRUNED,
    RECONCILE_BACKFILLED,
    RECONCILE_BACKFILL_FAILED,
    RECONCILE_BUDGET_EXHAUSTED,
];
