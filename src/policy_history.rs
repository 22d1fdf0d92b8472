//! Append-only per-metric-type policy log and active-set derivation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metric_type::MetricType;
use crate::policy::{Policies, Policy};

/// The log of all policy values ever set for a view, per metric type
///
/// Entries are kept in the order the service returned them (oldest first) and
/// are never re-sorted. The log is owned by the service; the client only
/// reads it and derives the active set locally, submitting new policy values
/// for the service to append.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyHistory(pub BTreeMap<MetricType, Vec<Policy>>);

impl PolicyHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries recorded for one metric type, in stored order
    pub fn entries(&self, metric: MetricType) -> &[Policy] {
        self.0.get(&metric).map(Vec::as_slice).unwrap_or_default()
    }

    /// The first undeleted entry for a metric type, in stored order
    ///
    /// `None` when the type has no entries or every entry is marked deleted.
    pub fn latest_policy(&self, metric: MetricType) -> Option<&Policy> {
        self.0.get(&metric)?.iter().find(|p| p.is_active())
    }

    /// Derive the currently active policy set from this log
    ///
    /// Entries are cloned out of the log, so callers may mutate the result
    /// without touching the stored history. A type with no undeleted entry is
    /// omitted. A well-formed history holds at most one undeleted entry per
    /// type; a violation is logged and the first one in stored order is used.
    pub fn active_policies(&self) -> Policies {
        let mut active = Policies::new();
        for metric in MetricType::ALL {
            let undeleted = self
                .0
                .get(&metric)
                .map(|entries| entries.iter().filter(|p| p.is_active()).count())
                .unwrap_or(0);
            if undeleted > 1 {
                log::warn!(
                    "policy history for {} holds {} undeleted entries, using the first",
                    metric,
                    undeleted
                );
            }
            if let Some(policy) = self.latest_policy(metric) {
                active.insert(metric, policy.clone());
            }
        }
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn deleted(value: f64) -> Policy {
        Policy {
            policy_value: value,
            created_at: Some(Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap()),
            deleted_at: Some(Utc.with_ymd_and_hms(2021, 3, 2, 0, 0, 0).unwrap()),
        }
    }

    fn history(entries: &[(MetricType, Vec<Policy>)]) -> PolicyHistory {
        PolicyHistory(entries.iter().cloned().collect())
    }

    #[test]
    fn test_single_undeleted_entry_is_active() {
        // {requests: [{value: 10, deletedAt: null}]} -> {requests: {value: 10}}
        let history = history(&[(MetricType::Requests, vec![Policy::pending(10.0)])]);
        let active = history.active_policies();
        assert_eq!(active.len(), 1);
        assert_eq!(active.get(MetricType::Requests).unwrap().policy_value, 10.0);
    }

    #[test]
    fn test_deleted_entries_are_skipped() {
        let history = history(&[(
            MetricType::Requests,
            vec![deleted(5.0), Policy::pending(10.0)],
        )]);
        let latest = history.latest_policy(MetricType::Requests).unwrap();
        assert_eq!(latest.policy_value, 10.0);
    }

    #[test]
    fn test_first_undeleted_in_stored_order_wins() {
        // among undeleted entries, stored order is authoritative
        let history = history(&[(
            MetricType::Requests,
            vec![Policy::pending(5.0), Policy::pending(10.0)],
        )]);
        let latest = history.latest_policy(MetricType::Requests).unwrap();
        assert_eq!(latest.policy_value, 5.0);
    }

    #[test]
    fn test_all_deleted_yields_none() {
        let history = history(&[(MetricType::Latency, vec![deleted(1.0), deleted(2.0)])]);
        assert!(history.latest_policy(MetricType::Latency).is_none());
        assert!(history.active_policies().is_empty());
    }

    #[test]
    fn test_absent_type_yields_none() {
        let history = PolicyHistory::new();
        assert!(history.latest_policy(MetricType::Bandwidth).is_none());
        assert!(history.active_policies().is_empty());
    }

    #[test]
    fn test_active_policies_never_invents_types() {
        let history = history(&[
            (MetricType::Requests, vec![Policy::pending(10.0)]),
            (MetricType::Latency, vec![deleted(7.0)]),
        ]);
        let active = history.active_policies();
        assert!(active.get(MetricType::Requests).is_some());
        assert!(active.get(MetricType::Latency).is_none());
        assert!(active.get(MetricType::Concurrency).is_none());
        assert!(active.get(MetricType::Bandwidth).is_none());
    }

    #[test]
    fn test_active_policies_are_clones() {
        let history = history(&[(MetricType::Requests, vec![Policy::pending(10.0)])]);
        let mut active = history.active_policies();
        if let Some(policy) = active.0.get_mut(&MetricType::Requests) {
            policy.policy_value = 999.0;
        }
        // the stored history is unchanged
        assert_eq!(
            history.latest_policy(MetricType::Requests).unwrap().policy_value,
            10.0
        );
    }

    #[test]
    fn test_multiple_undeleted_entries_use_the_first() {
        let history = history(&[(
            MetricType::Concurrency,
            vec![Policy::pending(3.0), Policy::pending(8.0)],
        )]);
        let active = history.active_policies();
        assert_eq!(
            active.get(MetricType::Concurrency).unwrap().policy_value,
            3.0
        );
    }

    #[test]
    fn test_entries_preserve_stored_order() {
        let history = history(&[(
            MetricType::Requests,
            vec![deleted(1.0), deleted(2.0), Policy::pending(3.0)],
        )]);
        let values: Vec<f64> = history
            .entries(MetricType::Requests)
            .iter()
            .map(|p| p.policy_value)
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_deserializes_from_wire_shape() {
        let json = r#"{"requests": [
            {"policyValue": 5.0, "deletedAt": "2021-03-02T00:00:00Z"},
            {"policyValue": 10.0}
        ]}"#;
        let history: PolicyHistory = serde_json::from_str(json).unwrap();
        assert_eq!(
            history.latest_policy(MetricType::Requests).unwrap().policy_value,
            10.0
        );
    }
}
