//! Policy value types and the active-set merge

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metric_type::MetricType;

/// A single rate, latency, concurrency, or bandwidth limit
///
/// Policies are immutable once created; a "change" is a new entry plus a
/// deletion mark on the prior one. Both timestamps are assigned by the
/// service at commit time, so a policy built on the client side carries none.
/// An entry with `deleted_at` set is retired and never active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// The numeric limit value
    pub policy_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Policy {
    /// A policy value not yet committed to the service (no timestamps)
    pub fn pending(value: f64) -> Self {
        Self {
            policy_value: value,
            created_at: None,
            deleted_at: None,
        }
    }

    /// Whether this entry is still in force
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// The currently active policy per metric type
///
/// A metric type absent from the map means no policy is enforced for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Policies(pub BTreeMap<MetricType, Policy>);

impl Policies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-entry set, convenient for create and update calls
    pub fn single(metric: MetricType, value: f64) -> Self {
        let mut map = BTreeMap::new();
        map.insert(metric, Policy::pending(value));
        Self(map)
    }

    pub fn get(&self, metric: MetricType) -> Option<&Policy> {
        self.0.get(&metric)
    }

    pub fn insert(&mut self, metric: MetricType, policy: Policy) {
        self.0.insert(metric, policy);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MetricType, &Policy)> {
        self.0.iter()
    }

    /// Merge caller-supplied overrides into this active set
    ///
    /// Per metric type, the override wins; otherwise the existing entry is
    /// kept; a type present in neither side is omitted. The result consists
    /// of pending values only: input timestamps are never carried over, since
    /// the service assigns fresh ones when the merged set is committed.
    pub fn merge(&self, overrides: &Policies) -> Policies {
        let mut merged = BTreeMap::new();
        for metric in MetricType::ALL {
            if let Some(over) = overrides.get(metric) {
                merged.insert(metric, Policy::pending(over.policy_value));
            } else if let Some(existing) = self.get(metric) {
                merged.insert(metric, Policy::pending(existing.policy_value));
            }
        }
        Policies(merged)
    }
}
