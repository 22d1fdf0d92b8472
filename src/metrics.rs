//! Time-series traffic metric types
//!
//! The read side mirrors the windowed metrics endpoint: per-route series
//! keyed by metric type, a node map resolving route specs, and the sampling
//! window. The write side is the batch shape the ingest endpoint accepts.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metric_type::MetricType;

/// Source/destination node-group pair a series belongs to
///
/// Serialized as a two-element array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSpec(pub String, pub String);

/// Sampled series for one route, one array of values per metric type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteHistory {
    pub spec: RouteSpec,
    pub history: BTreeMap<MetricType, Vec<f64>>,
}

/// A node referenced by route specs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

/// Sampling window bounds; field names match the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Window length in milliseconds
    pub duration: u64,
    /// Sample period in milliseconds
    pub sample_period: u64,
    /// Number of samples in each series
    pub samples: u64,
}

/// Windowed metrics for an environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<RouteHistory>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<HashMap<String, MetricsNode>>,
    pub window: MetricsWindow,
    pub version: u32,
}

/// One endpoint of a measured route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEndpoint {
    pub name: String,
    pub instance: String,
}

/// Route between two endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub source: RouteEndpoint,
    pub destination: RouteEndpoint,
}

/// The measured values for one route in one sample period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleValues {
    pub bandwidth: f64,
    pub connections: f64,
    pub concurrency: f64,
    pub latency: f64,
}

/// One route measurement submitted to the ingest endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSample {
    pub route: Route,
    pub metric: SampleValues,
}
