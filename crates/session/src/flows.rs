//! Self-service account flows (signup, password change, password reset).
//!
//! Thin facade over the auth backend: these operations carry no client-side
//! state beyond what the link validation controller already tracks, so the
//! facade only adds tracing and a single injection point for the backend.

use std::rc::Rc;

use tracing::info;

use crate::ports::{AuthBackend, BackendError};

pub struct AccountFlows {
    backend: Rc<dyn AuthBackend>,
}

impl AccountFlows {
    pub fn new(backend: Rc<dyn AuthBackend>) -> Self {
        Self { backend }
    }

    /// Start a signup; the backend mails the completion link.
    pub async fn pre_signup(&self, username: &str, email: &str) -> Result<(), BackendError> {
        self.backend.pre_signup(username, email).await?;
        info!(username, "signup requested");
        Ok(())
    }

    pub async fn complete_signup(
        &self,
        id: &str,
        token: &str,
        password: &str,
        date_of_birth: &str,
    ) -> Result<(), BackendError> {
        self.backend
            .complete_signup(id, token, password, date_of_birth)
            .await?;
        info!(id, "signup completed");
        Ok(())
    }

    pub async fn complete_password_change(
        &self,
        id: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), BackendError> {
        self.backend
            .complete_password_change(id, token, new_password)
            .await?;
        info!(id, "password changed");
        Ok(())
    }

    pub async fn complete_password_reset(
        &self,
        id: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), BackendError> {
        self.backend
            .complete_password_reset(id, token, new_password)
            .await?;
        info!(id, "password reset completed");
        Ok(())
    }

    /// Request a password-reset link for `email`.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), BackendError> {
        self.backend.request_password_reset(email).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
