//! Backend collaborator ports.
//!
//! Transport mechanics (HTTP, retries, headers) are out of scope; the core
//! consumes backends through these object-safe traits. `?Send` because the
//! whole core runs on a single-threaded event loop.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use portal_auth::PermissionGrant;

/// Message-bearing failure from a backend collaborator.
///
/// The message is surfaced to the user-facing layer as-is; the transport
/// adapter is responsible for producing something presentable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The one-time action link flows supported by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    PreSignup,
    PasswordChange,
    PasswordReset,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::PreSignup => "pre-signup",
            LinkKind::PasswordChange => "password-change",
            LinkKind::PasswordReset => "password-reset",
        }
    }
}

/// Successful link validation: the id plus a short-lived token scoped to
/// completing exactly one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkGrant {
    pub id: String,
    pub token: String,
}

/// Authentication backend (login, self-service account flows).
#[async_trait(?Send)]
pub trait AuthBackend {
    /// Exchange credentials for a raw session credential string.
    async fn login(&self, email: &str, password: &str) -> Result<String, BackendError>;

    /// Start a signup: the backend mails a one-time link.
    async fn pre_signup(&self, username: &str, email: &str) -> Result<(), BackendError>;

    /// Validate a one-time link; fails on invalid/expired parameters.
    async fn validate_link(
        &self,
        kind: LinkKind,
        id: &str,
        token: &str,
    ) -> Result<LinkGrant, BackendError>;

    async fn complete_signup(
        &self,
        id: &str,
        token: &str,
        password: &str,
        date_of_birth: &str,
    ) -> Result<(), BackendError>;

    async fn complete_password_change(
        &self,
        id: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), BackendError>;

    async fn complete_password_reset(
        &self,
        id: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), BackendError>;

    /// Request a password-reset link for `email`.
    async fn request_password_reset(&self, email: &str) -> Result<(), BackendError>;
}

/// Profile as served by the admin backend's `/admin/me` resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub email: String,

    /// Account enabled flag (backend field name is Portuguese).
    #[serde(default, rename = "ativo")]
    pub active: bool,

    /// Raw permission grants, normalized client-side into authority tags.
    #[serde(default)]
    pub permissions: Vec<PermissionGrant>,
}

/// Profile backend (fetched authorities, second source for admin visibility).
#[async_trait(?Send)]
pub trait ProfileBackend {
    async fn get_me(&self) -> Result<Profile, BackendError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
