// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 glasnostic

//! Console session client
//!
//! Logs a user in against the console, then drives the remote API:
//! assemblies, channel CRUD commits, and traffic metrics. All operations are
//! sequential request/response calls; the session cookie jar established at
//! login is owned by the [`Session`] value, so there is no hidden client
//! state and no refresh logic. When the server-side session expires, calls
//! fail with an authentication error and a new login is required.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::cookie::Jar;
use reqwest::{redirect, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::config::{ClientConfig, DEFAULT_BASE_DOMAIN};
use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::metrics::{MetricsResponse, RouteSample};
use crate::policy::Policies;
use crate::view::{CommitAction, View, ViewSnapshot, ViewUpdate};

const LOGIN_PATH: &str = "/auth/email/login";
const ASSEMBLIES_PATH: &str = "/api/assemblies/user";
const CHANNELS_PATH: &str = "/api/channels";
const COMMIT_PATH: &str = "/api/channels/commit";
const METRICS_PATH: &str = "/api/metrics";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Successful login outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginStatus {
    pub username: String,
}

/// Console endpoints; holds no session state
///
/// Login happens against the base domain; everything else goes to the
/// `app.`-prefixed API domain derived from it.
#[derive(Debug, Clone)]
pub struct GlasnosticConsole {
    base_domain: Url,
    api_domain: Url,
}

impl GlasnosticConsole {
    /// Console client against [`DEFAULT_BASE_DOMAIN`]
    pub fn new() -> Result<Self> {
        Self::with_base_domain(DEFAULT_BASE_DOMAIN)
    }

    /// Console client against an explicit base domain
    pub fn with_base_domain(base_domain: &str) -> Result<Self> {
        let base_domain = Url::parse(base_domain)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", base_domain, e)))?;
        let api_domain = api_domain_for(&base_domain)?;
        Ok(Self {
            base_domain,
            api_domain,
        })
    }

    /// Console client for a configuration's base domain
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::with_base_domain(&config.base_domain)
    }

    /// Build from configuration and log in with its credentials
    pub fn login_with_config(config: &ClientConfig) -> Result<Session> {
        Self::from_config(config)?.login(&config.username, &config.password)
    }

    pub fn base_domain(&self) -> &Url {
        &self.base_domain
    }

    pub fn api_domain(&self) -> &Url {
        &self.api_domain
    }

    /// Log in and return the authenticated session
    ///
    /// Credentials go as a form post with redirects disabled: a `Location`
    /// pointing at the `app.` host means the session cookie is set. A
    /// redirect anywhere else carries a `jwt` query parameter whose payload
    /// embeds the user-facing rejection message.
    pub fn login(&self, username: &str, password: &str) -> Result<Session> {
        if username.is_empty() || password.is_empty() {
            return Err(Error::Validation(
                "username and password must not be empty".to_string(),
            ));
        }

        let jar = Arc::new(Jar::default());
        let http = HttpClient::builder()
            .cookie_provider(jar)
            .redirect(redirect::Policy::none())
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let login_url = self
            .base_domain
            .join(LOGIN_PATH)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", LOGIN_PATH, e)))?;
        log::debug!("logging in as {} via {}", username, login_url);

        let response = http
            .post(login_url)
            .form(&[("loginid", username), ("password", password)])
            .send()?;

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Error::Auth("invalid response: missing header \"location\"".into()))?;
        let location = Url::parse(location)
            .map_err(|e| Error::Auth(format!("invalid redirect location: {}", e)))?;

        let landed_on_app = location
            .host_str()
            .map(|host| host.starts_with("app"))
            .unwrap_or(false);
        if !landed_on_app {
            let jwt = location
                .query_pairs()
                .find(|(key, _)| key == "jwt")
                .map(|(_, value)| value.into_owned())
                .ok_or_else(|| {
                    Error::Auth("invalid response: missing search param \"jwt\"".into())
                })?;
            return Err(Error::Auth(decode_login_error(&jwt)));
        }

        log::info!("logged in as {}", username);
        Ok(Session {
            status: LoginStatus {
                username: username.to_string(),
            },
            api_domain: self.api_domain.clone(),
            http,
        })
    }
}

/// An authenticated console session
///
/// Returned by [`GlasnosticConsole::login`]; all remote operations live here.
pub struct Session {
    status: LoginStatus,
    api_domain: Url,
    http: HttpClient,
}

impl Session {
    /// Who this session is logged in as
    pub fn status(&self) -> &LoginStatus {
        &self.status
    }

    pub fn username(&self) -> &str {
        &self.status.username
    }

    fn api_url(&self, path: &str) -> Result<Url> {
        self.api_domain
            .join(path)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// List the environments (assemblies) the user manages
    pub fn environments(&self) -> Result<Vec<Environment>> {
        let url = self.api_url(ASSEMBLIES_PATH)?;
        let response = check_status("list environments", self.http.get(url).send()?)?;
        Ok(response.json()?)
    }

    /// List all views (channels) of an environment
    pub fn views(&self, environment_key: &str) -> Result<Vec<View>> {
        #[derive(Deserialize)]
        struct ChannelList {
            channels: Vec<View>,
        }

        let mut url = self.api_url(CHANNELS_PATH)?;
        url.query_pairs_mut()
            .append_pair("assemblyKey", environment_key);
        let response = check_status("list views", self.http.get(url).send()?)?;
        let list: ChannelList = response.json()?;
        Ok(list.channels)
    }

    /// Fetch one view by id
    ///
    /// Fails with [`Error::NotFound`] when the environment has no such view.
    pub fn view(&self, environment_key: &str, view_id: &str) -> Result<View> {
        self.views(environment_key)?
            .into_iter()
            .find(|view| view.id.as_deref() == Some(view_id))
            .ok_or_else(|| Error::NotFound(format!("view {}", view_id)))
    }

    /// Create a view matching `source` to `destination`, optionally with an
    /// initial policy set
    pub fn create_view(
        &self,
        environment_key: &str,
        name: &str,
        source: &str,
        destination: &str,
        policies: Option<Policies>,
    ) -> Result<View> {
        let snapshot = ViewSnapshot::for_create(name, source, destination, policies);
        let committed = self.commit(environment_key, CommitAction::Create, snapshot, None)?;
        committed.ok_or_else(|| Error::Api {
            status: 200,
            message: "create commit returned no view".to_string(),
        })
    }

    /// Update a view by reconciling its current state with the provided
    /// changes
    ///
    /// The view is fetched, its active policies are derived from the policy
    /// history, and the update is folded in: provided fields replace their
    /// counterparts, provided policies are merged over the derived active set
    /// with overrides winning per metric type. The commit carries the fetched
    /// version token, so a concurrent change surfaces as [`Error::Conflict`]
    /// and is never silently retried.
    pub fn update_view(
        &self,
        environment_key: &str,
        view_id: &str,
        update: ViewUpdate,
    ) -> Result<View> {
        let original = self.view(environment_key, view_id)?;
        let last_commit_id = original.commit_id.clone();
        let mut snapshot = ViewSnapshot::for_update(&original);
        snapshot.apply(update);
        let committed =
            self.commit(environment_key, CommitAction::Update, snapshot, last_commit_id)?;
        committed.ok_or_else(|| Error::Api {
            status: 200,
            message: format!("update commit for view {} returned no view", view_id),
        })
    }

    /// Delete a view
    ///
    /// A delete is a tombstone commit carrying only the view id and the
    /// version token read at fetch time.
    pub fn delete_view(&self, environment_key: &str, view_id: &str) -> Result<()> {
        let original = self.view(environment_key, view_id)?;
        let last_commit_id = original.commit_id.clone();
        let tombstone = ViewSnapshot::tombstone(&original);
        self.commit(environment_key, CommitAction::Delete, tombstone, last_commit_id)?;
        Ok(())
    }

    /// Submit one timestamped batch of route samples for a network
    pub fn send_metrics(
        &self,
        network_key: &str,
        timestamp: DateTime<Utc>,
        samples: &[RouteSample],
    ) -> Result<()> {
        #[derive(Serialize)]
        struct MetricsPayload<'a> {
            timestamp: DateTime<Utc>,
            metrics: &'a [RouteSample],
        }

        let url = self.api_url(&format!("{}/{}", METRICS_PATH, network_key))?;
        let payload = MetricsPayload {
            timestamp,
            metrics: samples,
        };
        log::debug!(
            "sending {} route sample(s) for network {}",
            samples.len(),
            network_key
        );
        check_status("send metrics", self.http.post(url).json(&payload).send()?)?;
        Ok(())
    }

    /// Windowed traffic metrics for one view of an environment
    ///
    /// `sample_period_ms` and `duration_ms` are milliseconds. Passing a
    /// previous response's `window.start` as `start` continues retrieval from
    /// where that window began.
    pub fn view_metrics(
        &self,
        environment_key: &str,
        view_index: &str,
        sample_period_ms: u64,
        duration_ms: u64,
        start: Option<DateTime<Utc>>,
    ) -> Result<MetricsResponse> {
        let mut url = self.api_url(METRICS_PATH)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("assemblyKey", environment_key);
            query.append_pair("channel", view_index);
            query.append_pair("samplePeriod", &sample_period_ms.to_string());
            query.append_pair("duration", &duration_ms.to_string());
            if let Some(start) = start {
                query.append_pair("start", &start.to_rfc3339());
            }
        }
        let response = check_status("get metrics", self.http.get(url).send()?)?;
        Ok(response.json()?)
    }

    /// Submit a commit against the versioned channel endpoint
    ///
    /// Update and delete carry the version token read most recently; the
    /// service is the sole arbiter of conflict detection. Delete returns no
    /// body, create and update return the committed view.
    fn commit(
        &self,
        environment_key: &str,
        action: CommitAction,
        channel: ViewSnapshot,
        last_commit_id: Option<String>,
    ) -> Result<Option<View>> {
        let url = self.api_url(COMMIT_PATH)?;
        let payload = CommitPayload {
            assembly_key: environment_key.to_string(),
            action,
            channel,
            last_commit_id,
        };
        log::debug!(
            "commit action {} for assembly {}",
            payload.action.code(),
            environment_key
        );
        let response = check_status("commit view", self.http.post(url).json(&payload).send()?)?;
        if action == CommitAction::Delete {
            return Ok(None);
        }
        Ok(Some(response.json()?))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommitPayload {
    assembly_key: String,
    action: CommitAction,
    channel: ViewSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_commit_id: Option<String>,
}

/// Derive the `app.`-prefixed API domain from the base domain
fn api_domain_for(base_domain: &Url) -> Result<Url> {
    let host = base_domain
        .host_str()
        .ok_or_else(|| Error::InvalidUrl(format!("base domain has no host: {}", base_domain)))?;
    let mut api_domain = base_domain.clone();
    api_domain
        .set_host(Some(&format!("app.{}", host)))
        .map_err(|e| Error::InvalidUrl(format!("cannot derive api domain: {}", e)))?;
    Ok(api_domain)
}

/// Map a non-success response onto the error taxonomy, consuming the body as
/// failure detail
fn check_status(operation: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    // redirects are disabled on the session client; an API endpoint bouncing
    // us elsewhere means the session is gone
    if status.is_redirection() {
        return Err(Error::Auth(format!(
            "{}: session expired or not logged in",
            operation
        )));
    }
    let body = response.text().unwrap_or_default();
    Err(classify_status(operation, status, &body))
}

fn classify_status(operation: &str, status: StatusCode, body: &str) -> Error {
    let detail = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.trim().to_string()
    };
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::Auth(format!("{}: {}", operation, detail))
        }
        StatusCode::NOT_FOUND => Error::NotFound(format!("{}: {}", operation, detail)),
        StatusCode::CONFLICT => Error::Conflict(format!("{}: {}", operation, detail)),
        _ => Error::Api {
            status: status.as_u16(),
            message: format!("{}: {}", operation, detail),
        },
    }
}

/// Extract the user-facing message a failed login embeds in its redirect
fn decode_login_error(jwt: &str) -> String {
    decode_jwt_message(jwt)
        .unwrap_or_else(|| "login rejected (unreadable jwt message)".to_string())
}

fn decode_jwt_message(jwt: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct Envelope {
        msg: Message,
    }
    #[derive(Deserialize)]
    struct Message {
        text: String,
    }

    let payload = jwt.split('.').nth(1)?;
    let bytes = base64_decode_relaxed(payload)?;
    let envelope: Envelope = serde_json::from_slice(&bytes).ok()?;
    Some(envelope.msg.text)
}

// JWT payloads are base64url without padding, but tolerate standard encoding
fn base64_decode_relaxed(input: &str) -> Option<Vec<u8>> {
    use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE_NO_PAD};
    URL_SAFE_NO_PAD
        .decode(input)
        .ok()
        .or_else(|| STANDARD_NO_PAD.decode(input).ok())
        .or_else(|| STANDARD.decode(input).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric_type::MetricType;

    #[test]
    fn test_api_domain_gets_app_prefix() {
        let base = Url::parse("https://glasnostic.com").unwrap();
        let api = api_domain_for(&base).unwrap();
        assert_eq!(api.as_str(), "https://app.glasnostic.com/");
    }

    #[test]
    fn test_api_domain_preserves_scheme_and_port() {
        let base = Url::parse("http://staging.example.com:8443").unwrap();
        let api = api_domain_for(&base).unwrap();
        assert_eq!(api.host_str(), Some("app.staging.example.com"));
        assert_eq!(api.scheme(), "http");
        assert_eq!(api.port(), Some(8443));
    }

    #[test]
    fn test_stale_commit_id_maps_to_conflict() {
        let err = classify_status("commit view", StatusCode::CONFLICT, "stale commit id");
        assert!(matches!(err, Error::Conflict(_)));
        assert!(err.to_string().contains("stale commit id"));
    }

    #[test]
    fn test_unauthorized_maps_to_auth() {
        let err = classify_status("list environments", StatusCode::UNAUTHORIZED, "");
        assert!(matches!(err, Error::Auth(_)));
        let err = classify_status("list environments", StatusCode::FORBIDDEN, "");
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn test_missing_resource_maps_to_not_found() {
        let err = classify_status("commit view", StatusCode::NOT_FOUND, "");
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_other_statuses_map_to_api_error() {
        let err = classify_status("get metrics", StatusCode::BAD_GATEWAY, "upstream down");
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 502);
                assert!(message.contains("get metrics"));
                assert!(message.contains("upstream down"));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_jwt_message() {
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let payload =
            URL_SAFE_NO_PAD.encode(r#"{"msg": {"type": "error", "text": "wrong password"}}"#);
        let jwt = format!("header.{}.signature", payload);
        assert_eq!(
            decode_jwt_message(&jwt),
            Some("wrong password".to_string())
        );
    }

    #[test]
    fn test_decode_jwt_message_garbage() {
        assert!(decode_jwt_message("not-a-jwt").is_none());
        assert!(decode_jwt_message("a.!!!.c").is_none());
        assert_eq!(
            decode_login_error("a.!!!.c"),
            "login rejected (unreadable jwt message)"
        );
    }

    #[test]
    fn test_delete_commit_payload_shape() {
        let view = View {
            clients: "clients*".to_string(),
            services: "services*".to_string(),
            id: Some("view-1".to_string()),
            commit_id: Some("commit-1".to_string()),
            ..Default::default()
        };
        let payload = CommitPayload {
            assembly_key: "env-key".to_string(),
            action: CommitAction::Delete,
            channel: ViewSnapshot::tombstone(&view),
            last_commit_id: view.commit_id.clone(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "assemblyKey": "env-key",
                "action": 3,
                "channel": {"id": "view-1"},
                "lastCommitId": "commit-1"
            })
        );
    }

    #[test]
    fn test_create_commit_payload_has_no_last_commit_id() {
        let payload = CommitPayload {
            assembly_key: "env-key".to_string(),
            action: CommitAction::Create,
            channel: ViewSnapshot::for_create(
                "My Channel",
                "clients*",
                "services*",
                Some(Policies::single(MetricType::Requests, 10000.0)),
            ),
            last_commit_id: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["action"], 1);
        assert!(json.get("lastCommitId").is_none());
        assert_eq!(json["channel"]["name"], "My Channel");
        assert_eq!(
            json["channel"]["policies"]["requests"]["policyValue"],
            10000.0
        );
    }

    #[test]
    fn test_update_commit_payload_carries_version_token() {
        let view: View = serde_json::from_value(serde_json::json!({
            "clients": "clients*",
            "services": "services*",
            "name": "My Channel",
            "id": "view-1",
            "commitId": "commit-1",
            "policyHistory": {"requests": [{"policyValue": 10.0}]}
        }))
        .unwrap();
        let mut snapshot = ViewSnapshot::for_update(&view);
        snapshot.apply(ViewUpdate::new().name("Updated Name"));
        let payload = CommitPayload {
            assembly_key: "env-key".to_string(),
            action: CommitAction::Update,
            channel: snapshot,
            last_commit_id: view.commit_id.clone(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["action"], 2);
        assert_eq!(json["lastCommitId"], "commit-1");
        assert_eq!(json["channel"]["name"], "Updated Name");
        assert_eq!(json["channel"]["clients"], "clients*");
        assert_eq!(
            json["channel"]["policies"]["requests"]["policyValue"],
            10.0
        );
    }

    #[test]
    fn test_login_rejects_empty_credentials() {
        let console = GlasnosticConsole::new().unwrap();
        assert!(matches!(
            console.login("", "secret"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            console.login("user", ""),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_default_console_domains() {
        let console = GlasnosticConsole::new().unwrap();
        assert_eq!(console.base_domain().as_str(), "https://glasnostic.com/");
        assert_eq!(
            console.api_domain().as_str(),
            "https://app.glasnostic.com/"
        );
    }
}
