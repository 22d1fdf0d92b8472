//! Metric type enumeration for view policies and traffic metrics

use serde::{Deserialize, Serialize};

/// The four metric kinds a view policy can limit
///
/// Each kind has a stable ordinal index; [`MetricType::ALL`] iterates them in
/// ordinal order. Wire names are the lowercase strings the service uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Request rate
    Requests = 0,
    /// Request latency
    Latency = 1,
    /// Concurrent requests in flight
    Concurrency = 2,
    /// Transfer bandwidth
    Bandwidth = 3,
}

impl MetricType {
    /// All metric types, in ordinal order
    pub const ALL: [MetricType; 4] = [
        MetricType::Requests,
        MetricType::Latency,
        MetricType::Concurrency,
        MetricType::Bandwidth,
    ];

    /// Stable ordinal index of this metric type
    pub fn index(self) -> usize {
        self as usize
    }

    /// Wire name of this metric type
    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::Requests => "requests",
            MetricType::Latency => "latency",
            MetricType::Concurrency => "concurrency",
            MetricType::Bandwidth => "bandwidth",
        }
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
