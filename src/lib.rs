// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 glasnostic

//! Typed client for the Glasnostic console
//!
//! Logs in a user session, lists environments (assemblies), manages
//! traffic-shaping views (channels) and their request-rate, latency,
//! concurrency, and bandwidth policies, and reads and writes time-series
//! traffic metrics.
//!
//! Updating a view is more than a field write: the service keeps an
//! append-only policy history per view, so the client first derives the
//! currently active policy set from that history, merges the caller's
//! overrides into it, and commits the result as a new version guarded by the
//! previous commit id. See [`policy_history`] and [`view`] for the rules.
//!
//! # Example
//!
//! ```rust,ignore
//! use glasnostic::{GlasnosticConsole, MetricType, Policies, ViewUpdate};
//!
//! let console = GlasnosticConsole::new()?;
//! let session = console.login("user@example.com", "changeme")?;
//!
//! let environments = session.environments()?;
//! let view = session.create_view(
//!     &environments[0].key,
//!     "My Channel",
//!     "clients*",
//!     "services*",
//!     Some(Policies::single(MetricType::Requests, 10000.0)),
//! )?;
//!
//! let view_id = view.id.as_deref().unwrap();
//! session.update_view(
//!     &environments[0].key,
//!     view_id,
//!     ViewUpdate::new().name("Renamed Channel"),
//! )?;
//! ```

pub mod client;
pub mod config;
pub mod environment;
pub mod error;
pub mod metric_type;
pub mod metrics;
pub mod policy;
pub mod policy_history;
pub mod view;

pub use client::{GlasnosticConsole, LoginStatus, Session};
pub use config::{ClientConfig, DEFAULT_BASE_DOMAIN};
pub use environment::{Cluster, Environment};
pub use error::{Error, Result};
pub use metric_type::MetricType;
pub use metrics::{
    MetricsNode, MetricsResponse, MetricsWindow, Route, RouteEndpoint, RouteHistory, RouteSample,
    RouteSpec, SampleValues,
};
pub use policy::{Policies, Policy};
pub use policy_history::PolicyHistory;
pub use view::{CommitAction, Patch, View, ViewSnapshot, ViewUpdate};
