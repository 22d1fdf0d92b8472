// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 glasnostic

//! Views (channels), commit snapshots, and update reconciliation
//!
//! A view matches a source pattern to a destination pattern and carries the
//! policy history the service has accumulated for it. Updates never edit the
//! server-side record in place: the client builds a working snapshot from the
//! last committed state plus the derived active policies, folds in the
//! caller's changes, and commits the snapshot as a new version guarded by the
//! previous commit id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::policy::Policies;
use crate::policy_history::PolicyHistory;

/// A traffic-shaping view as returned by the service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    /// Source (client) node-group pattern, e.g. `"clients*"`
    pub clients: String,
    /// Destination (service) node-group pattern
    pub services: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Index used when querying metrics for this view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_history: Option<PolicyHistory>,
    /// Opaque handler configuration, passed through untouched on update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handlers: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committed_at: Option<DateTime<Utc>>,
    /// Version token for optimistic-concurrency updates and deletes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
}

impl View {
    /// Active policy set derived from this view's history
    ///
    /// Empty when the service sent no history at all.
    pub fn active_policies(&self) -> Policies {
        self.policy_history
            .as_ref()
            .map(PolicyHistory::active_policies)
            .unwrap_or_default()
    }
}

/// Commit verb for the versioned write endpoint
///
/// The service identifies actions by numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitAction {
    Create = 1,
    Update = 2,
    Delete = 3,
}

impl CommitAction {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl Serialize for CommitAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Explicit "leave unchanged" / "set to value" choice for one updatable field
///
/// `Keep` is the default, so an update struct built with
/// `..Default::default()` touches nothing beyond the fields named.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    #[default]
    Keep,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }

    /// Store the provided value into `slot`, leaving it untouched on `Keep`
    pub fn store(self, slot: &mut Option<T>) {
        if let Patch::Set(value) = self {
            *slot = Some(value);
        }
    }
}

/// Caller-supplied changes for a view update; every field is independently
/// optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewUpdate {
    pub name: Patch<String>,
    pub source: Patch<String>,
    pub destination: Patch<String>,
    pub policies: Patch<Policies>,
}

impl ViewUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Patch::Set(name.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Patch::Set(source.into());
        self
    }

    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Patch::Set(destination.into());
        self
    }

    pub fn policies(mut self, policies: Policies) -> Self {
        self.policies = Patch::Set(policies);
        self
    }
}

/// The working copy of a view submitted in a commit
///
/// Absent fields stay off the wire entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clients: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policies: Option<Policies>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handlers: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
}

impl ViewSnapshot {
    /// Snapshot for a create commit; there is no prior history to reconcile
    pub fn for_create(
        name: &str,
        source: &str,
        destination: &str,
        policies: Option<Policies>,
    ) -> Self {
        Self {
            clients: Some(source.to_string()),
            services: Some(destination.to_string()),
            name: Some(name.to_string()),
            policies,
            ..Default::default()
        }
    }

    /// Working snapshot for an update commit
    ///
    /// Copies id, name, patterns, handlers, and commit id from the last
    /// committed state and derives the policy set from the view's history, so
    /// an update that provides nothing recommits the view exactly as it is.
    pub fn for_update(view: &View) -> Self {
        Self {
            id: view.id.clone(),
            name: view.name.clone(),
            clients: Some(view.clients.clone()),
            services: Some(view.services.clone()),
            handlers: view.handlers.clone(),
            policies: Some(view.active_policies()),
            commit_id: view.commit_id.clone(),
        }
    }

    /// Snapshot for a delete commit
    ///
    /// A delete is a tombstone, not a content update: only the id travels in
    /// the channel body; the version token goes in the payload's
    /// `lastCommitId`.
    pub fn tombstone(view: &View) -> Self {
        Self {
            id: view.id.clone(),
            ..Default::default()
        }
    }

    /// Fold caller-supplied changes into the snapshot
    ///
    /// Fields left at `Patch::Keep` are untouched. Provided policies replace
    /// the snapshot's set with the merge of the derived active set and the
    /// overrides, overrides winning per metric type.
    pub fn apply(&mut self, update: ViewUpdate) {
        update.name.store(&mut self.name);
        update.source.store(&mut self.clients);
        update.destination.store(&mut self.services);
        if let Patch::Set(overrides) = update.policies {
            let active = self.policies.take().unwrap_or_default();
            self.policies = Some(active.merge(&overrides));
        }
    }
}
