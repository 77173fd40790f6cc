//! Metrics definitions for the roulette service.

use shared::metrics_defs::{MetricDef, MetricType};

pub const ROULETTE_SPINS: MetricDef = MetricDef {
    name: "roulette.spins",
    metric_type: MetricType::Counter,
    description: "Roulette spins served",
};

pub const TELEPORT_REPORTS: MetricDef = MetricDef {
    name: "roulette.teleport_reports",
    metric_type: MetricType::Counter,
    description: "Teleport reports recorded",
};

pub const HISTORY_REQUESTS: MetricDef = MetricDef {
    name: "roulette.history.requests",
    metric_type: MetricType::Counter,
    description: "Catalog history reconciliations served",
};

pub const ALL_METRICS: &[MetricDef] = &[ROULETTE_SPINS, TELEPORT_REPORTS, HISTORY_REQUESTS];
