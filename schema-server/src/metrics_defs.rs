//! Metrics definitions for the schema server.

use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUESTS: MetricDef = MetricDef {
    name: "requests",
    metric_type: MetricType::Counter,
    description: "Schema requests handled. Tagged with outcome.",
};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "Schema request duration in seconds. Tagged with outcome.",
};

pub const SCHEMA_CACHE_HIT: MetricDef = MetricDef {
    name: "schema_cache.hit",
    metric_type: MetricType::Counter,
    description: "Lookups answered from the schema cache",
};

pub const SCHEMA_CACHE_MISS: MetricDef = MetricDef {
    name: "schema_cache.miss",
    metric_type: MetricType::Counter,
    description: "Lookups that started an upstream fetch",
};

pub const SCHEMA_CACHE_COALESCED: MetricDef = MetricDef {
    name: "schema_cache.coalesced",
    metric_type: MetricType::Counter,
    description: "Lookups that joined an upstream fetch already in flight",
};

pub const SCHEMA_CACHE_ENTRIES: MetricDef = MetricDef {
    name: "schema_cache.entries",
    metric_type: MetricType::Gauge,
    description: "Number of schemas held in the cache",
};

pub const UPSTREAM_FETCHES: MetricDef = MetricDef {
    name: "upstream.fetches",
    metric_type: MetricType::Counter,
    description: "Upstream schema fetches. Tagged with outcome.",
};

pub const UPSTREAM_FETCH_DURATION: MetricDef = MetricDef {
    name: "upstream.fetch.duration",
    metric_type: MetricType::Histogram,
    description: "Upstream schema fetch duration in seconds",
};

pub const ALL_METRICS: &[MetricDef] = &[
    REQUESTS,
    REQUEST_DURATION,
    SCHEMA_CACHE_HIT,
    SCHEMA_CACHE_MISS,
    SCHEMA_CACHE_COALESCED,
    SCHEMA_CACHE_ENTRIES,
    UPSTREAM_FETCHES,
    UPSTREAM_FETCH_DURATION,
];
