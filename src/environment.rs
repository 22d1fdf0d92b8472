//! Environment (assembly) records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A managed deployment scope containing the clusters/networks to observe
///
/// Optional fields are deserialized leniently; the service omits or nulls
/// them depending on account state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub id: String,
    /// Key used to address this environment in view and metrics calls
    pub key: String,
    #[serde(default)]
    pub switch: bool,
    #[serde(default)]
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub clusters: Vec<Cluster>,
}

/// A cluster/network inside an environment
///
/// The `key` is the network key expected by metric submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_full_record() {
        let json = serde_json::json!({
            "id": "env-1",
            "key": "a1b2c3",
            "switch": true,
            "userId": "user-9",
            "name": "staging",
            "description": "staging assembly",
            "createdAt": "2021-03-01T00:00:00Z",
            "modifiedAt": "2021-03-05T00:00:00Z",
            "deletedAt": null,
            "clusters": [
                {"id": "cl-1", "key": "net-1", "name": "default"}
            ]
        });
        let environment: Environment = serde_json::from_value(json).unwrap();
        assert_eq!(environment.key, "a1b2c3");
        assert_eq!(environment.user_id, "user-9");
        assert!(environment.deleted_at.is_none());
        assert_eq!(environment.clusters[0].key, "net-1");
    }

    #[test]
    fn test_tolerates_sparse_record() {
        let json = serde_json::json!({
            "id": "env-2",
            "key": "k",
            "name": "empty"
        });
        let environment: Environment = serde_json::from_value(json).unwrap();
        assert!(!environment.switch);
        assert!(environment.clusters.is_empty());
        assert!(environment.simulator.is_none());
    }
}
