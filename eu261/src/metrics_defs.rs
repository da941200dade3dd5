//! Metrics definitions for the eligibility engine.

use shared::metrics_defs::{MetricDef, MetricType};

pub const BATCH_SIZE: MetricDef = MetricDef {
    name: "batch.size",
    metric_type: MetricType::Histogram,
    description: "Number of flight records per batch operation",
};

pub const ELIGIBILITY_CHECKED: MetricDef = MetricDef {
    name: "eligibility.checked",
    metric_type: MetricType::Counter,
    description: "Number of flight records classified",
};

pub const ELIGIBILITY_ELIGIBLE: MetricDef = MetricDef {
    name: "eligibility.eligible",
    metric_type: MetricType::Counter,
    description: "Number of flight records found eligible for compensation",
};

pub const FLIGHT_RECORD_MALFORMED: MetricDef = MetricDef {
    name: "flight_record.malformed",
    metric_type: MetricType::Counter,
    description: "Number of flight payloads that could not be normalized",
};

pub const JURISDICTION_CACHE_HIT: MetricDef = MetricDef {
    name: "jurisdiction.cache.hit",
    metric_type: MetricType::Counter,
    description: "Number of airport or carrier lookups answered from the memo cache",
};

pub const JURISDICTION_CACHE_MISS: MetricDef = MetricDef {
    name: "jurisdiction.cache.miss",
    metric_type: MetricType::Counter,
    description: "Number of airport or carrier lookups that missed the memo cache",
};

pub const REFERENCE_DATA_FALLBACK: MetricDef = MetricDef {
    name: "reference_data.fallback",
    metric_type: MetricType::Counter,
    description: "Number of times the default EU reference data was used instead of a stored copy",
};

// All metrics must be listed here so descriptions are registered at startup.
pub const ALL_METRICS: &[MetricDef] = &[
    BATCH_SIZE,
    ELIGIBILITY_CHECKED,
    ELIGIBILITY_ELIGIBLE,
    FLIGHT_RECORD_MALFORMED,
    JURISDICTION_CACHE_HIT,
    JURISDICTION_CACHE_MISS,
    REFERENCE_DATA_FALLBACK,
];
