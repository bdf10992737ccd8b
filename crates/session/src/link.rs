//! One-time action link validation (signup completion, password flows).
//!
//! Each flow is keyed by the `(kind, id, token)` triple taken from the URL.
//! The key is the staleness mechanism: any async completion or timer fire
//! carries the key (or timer id) it was issued under, and is discarded when
//! it no longer matches; a slow response for an old link can never
//! overwrite a fresher state.

use std::rc::Rc;

use chrono::{TimeZone, Utc};
use serde::Deserialize;
use tracing::debug;

use portal_auth::decode_payload;

use crate::clock::Clock;
use crate::ports::{AuthBackend, BackendError, LinkGrant, LinkKind};
use crate::timer::{TimerId, TimerScheduler};

/// Fixed user-facing message for any rejected or incomplete link.
pub const INVALID_LINK_MESSAGE: &str = "Link inválido ou expirado";

/// `id`/`token` query parameters of a link URL (empty when absent).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkParams {
    pub id: String,
    pub token: String,
}

impl LinkParams {
    pub fn new(id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            token: token.into(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.id.is_empty() && !self.token.is_empty()
    }
}

/// Extract `id` and `token` from a URL query string (with or without the
/// leading `?`). Missing parameters come back empty.
pub fn parse_link_params(query: &str) -> LinkParams {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut params = LinkParams::default();

    for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match name.as_ref() {
            "id" => params.id = value.into_owned(),
            "token" => params.token = value.into_owned(),
            _ => {}
        }
    }

    params
}

/// Canonicalize the dedicated pre-signup validation URL into the
/// completion-page URL, carrying the same two parameters.
pub fn pre_signup_redirect(query: &str) -> String {
    let params = parse_link_params(query);
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("id", &params.id)
        .append_pair("token", &params.token)
        .finish();

    format!("/complete-signup?{encoded}")
}

/// Identity of one validation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkKey {
    kind: LinkKind,
    id: String,
    token: String,
}

impl LinkKey {
    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Observable state of a link validation flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkValidationState {
    Loading,
    Invalid { message: String },
    /// Link accepted; `token` is the short-lived credential scoped to
    /// completing this one action.
    Valid { id: String, token: String },
}

impl LinkValidationState {
    fn invalid() -> Self {
        Self::Invalid {
            message: INVALID_LINK_MESSAGE.to_string(),
        }
    }
}

/// Expiry-only view of the short-lived token payload.
#[derive(Debug, Deserialize)]
struct ShortLivedClaims {
    #[serde(default)]
    exp: Option<i64>,
}

/// State machine for one validation kind.
pub struct LinkValidationController {
    kind: LinkKind,
    clock: Rc<dyn Clock>,
    timers: Rc<dyn TimerScheduler>,
    key: Option<LinkKey>,
    state: LinkValidationState,
    expiry_timer: Option<TimerId>,
}

impl LinkValidationController {
    pub fn new(kind: LinkKind, clock: Rc<dyn Clock>, timers: Rc<dyn TimerScheduler>) -> Self {
        Self {
            kind,
            clock,
            timers,
            key: None,
            state: LinkValidationState::invalid(),
            expiry_timer: None,
        }
    }

    pub fn state(&self) -> &LinkValidationState {
        &self.state
    }

    /// React to the current URL parameters.
    ///
    /// A changed `(kind, id, token)` key supersedes any in-flight or
    /// completed state. Returns the key to validate under when a backend
    /// call is needed; `None` when the parameters are unchanged or
    /// incomplete.
    pub fn apply_params(&mut self, params: &LinkParams) -> Option<LinkKey> {
        let key = LinkKey {
            kind: self.kind,
            id: params.id.clone(),
            token: params.token.clone(),
        };

        if self.key.as_ref() == Some(&key) {
            return None;
        }

        self.cancel_expiry_timer();
        self.key = Some(key.clone());

        if !params.is_complete() {
            self.state = LinkValidationState::invalid();
            return None;
        }

        self.state = LinkValidationState::Loading;
        Some(key)
    }

    /// Deliver the backend's validation result for `key`.
    ///
    /// A result for a superseded key is discarded without any state change.
    pub fn complete(&mut self, key: &LinkKey, result: Result<LinkGrant, BackendError>) {
        if self.key.as_ref() != Some(key) {
            debug!(kind = key.kind.as_str(), "discarding stale link validation result");
            return;
        }

        match result {
            Ok(grant) => {
                self.arm_expiry_timer(&grant.token);
                self.state = LinkValidationState::Valid {
                    id: grant.id,
                    token: grant.token,
                };
            }
            Err(err) => {
                debug!(kind = key.kind.as_str(), %err, "link validation rejected");
                self.state = LinkValidationState::invalid();
            }
        }
    }

    /// Convenience driver: apply params and run the backend call when one is
    /// needed. The key guard in [`complete`](Self::complete) still applies.
    pub async fn run_validation(&mut self, backend: &dyn AuthBackend, params: &LinkParams) {
        if let Some(key) = self.apply_params(params) {
            let result = backend.validate_link(key.kind, &key.id, &key.token).await;
            self.complete(&key, result);
        }
    }

    /// Short-lived-token expiry timer fired.
    pub fn on_timer(&mut self, id: TimerId) {
        if self.expiry_timer == Some(id) {
            debug!(kind = self.kind.as_str(), "short-lived token expired");
            self.expiry_timer = None;
            self.state = LinkValidationState::invalid();
        }
    }

    /// Arm the expiry timer for a freshly granted short-lived token.
    ///
    /// A token whose `exp` has passed, or that cannot be decoded at all,
    /// expires immediately; one without an `exp` claim never does.
    fn arm_expiry_timer(&mut self, token: &str) {
        self.cancel_expiry_timer();

        let now = self.clock.now();
        let fire_at = match decode_payload::<ShortLivedClaims>(token) {
            Ok(ShortLivedClaims { exp: Some(exp) }) => {
                let expiry = Utc
                    .timestamp_millis_opt(exp.saturating_mul(1000))
                    .single()
                    .unwrap_or_default();
                Some(expiry.max(now))
            }
            Ok(ShortLivedClaims { exp: None }) => None,
            Err(_) => Some(now),
        };

        if let Some(fire_at) = fire_at {
            self.expiry_timer = Some(self.timers.schedule(fire_at));
        }
    }

    fn cancel_expiry_timer(&mut self) {
        if let Some(id) = self.expiry_timer.take() {
            self.timers.cancel(id);
        }
    }
}

impl Drop for LinkValidationController {
    fn drop(&mut self) {
        self.cancel_expiry_timer();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
