//! Immutable session token: raw credential plus validated claims.

use chrono::{DateTime, TimeZone, Utc};

use crate::claims::{Claims, decode_claims};
use crate::error::AuthError;
use crate::user::{Permission, Role, User};

/// A decoded session credential.
///
/// Construction validates the claims the console cannot function without
/// (`username`, `email`, `exp`, `iat`); everything else defaults. The value
/// is never mutated; expiry or logout discards it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    raw: String,
    claims: Claims,
    exp_secs: i64,
    iat_secs: i64,
}

impl SessionToken {
    /// Decode and validate a raw credential string.
    ///
    /// Structural failures surface as [`AuthError::MalformedCredential`];
    /// missing or empty required claims as [`AuthError::InvalidTokenPayload`].
    /// A corrupt persisted credential therefore can never yield a half-valid
    /// session.
    pub fn from_raw(raw: impl Into<String>) -> Result<Self, AuthError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(AuthError::MalformedCredential);
        }

        let claims = decode_claims(&raw)?;

        if claims.username.is_empty() || claims.email.is_empty() {
            return Err(AuthError::InvalidTokenPayload);
        }
        let (Some(exp_secs), Some(iat_secs)) = (claims.exp, claims.iat) else {
            return Err(AuthError::InvalidTokenPayload);
        };

        Ok(Self {
            raw,
            claims,
            exp_secs,
            iat_secs,
        })
    }

    /// The opaque credential string, exactly as issued.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Expiry in seconds since epoch (envelope convention).
    pub fn expires_at_secs(&self) -> i64 {
        self.exp_secs
    }

    /// Issued-at in seconds since epoch.
    pub fn issued_at_secs(&self) -> i64 {
        self.iat_secs
    }

    /// Expiry as a UTC instant, for timer scheduling.
    pub fn expires_at(&self) -> DateTime<Utc> {
        // Guarded by from_raw; an out-of-range exp collapses to the epoch,
        // which reads as "already expired" everywhere downstream.
        Utc.timestamp_millis_opt(self.exp_secs.saturating_mul(1000))
            .single()
            .unwrap_or_default()
    }

    /// True iff `now` (milliseconds) has reached the expiry instant.
    ///
    /// The envelope carries seconds; the comparison is against a millisecond
    /// clock, inclusive on the expiry side.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() >= self.exp_secs.saturating_mul(1000)
    }

    /// Pure projection into the identity view consumed by the UI.
    pub fn to_user(&self) -> User {
        User {
            username: self.claims.username.clone(),
            email: self.claims.email.clone(),
            roles: self.claims.roles.iter().cloned().map(Role::new).collect(),
            permissions: self
                .claims
                .permissions
                .iter()
                .cloned()
                .map(Permission::new)
                .collect(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
