//! Credential envelope decoding (claims extraction only).
//!
//! The bearer credential is the usual three-segment dotted envelope with a
//! base64url JSON payload in the middle. This module only *extracts* claims
//! for UX purposes; signature verification happens server-side.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Claims carried by a session credential.
///
/// All fields are tolerant of absence at the decode layer: a payload that is
/// valid JSON but missing fields still decodes. Enforcing which claims are
/// *required* is [`SessionToken`](crate::SessionToken)'s job, so that a
/// structurally sound credential never fails here on semantic grounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject username.
    #[serde(default)]
    pub username: String,

    /// Subject email.
    #[serde(default)]
    pub email: String,

    /// Role names granted to the subject.
    #[serde(default)]
    pub roles: Vec<String>,

    /// Permission names granted to the subject.
    #[serde(default)]
    pub permissions: Vec<String>,

    /// Expiry, seconds since epoch (envelope convention).
    #[serde(default)]
    pub exp: Option<i64>,

    /// Issued-at, seconds since epoch.
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Decode the payload segment of a credential into an arbitrary claims shape.
///
/// Fails with [`AuthError::MalformedCredential`] when the string does not
/// have exactly three dot-separated segments, or when the middle segment is
/// not base64url JSON. Padded and unpadded payloads are both accepted, since
/// issuers differ on this.
pub fn decode_payload<T: DeserializeOwned>(raw: &str) -> Result<T, AuthError> {
    let segments: Vec<&str> = raw.split('.').collect();
    if segments.len() != 3 {
        return Err(AuthError::MalformedCredential);
    }

    let payload = segments[1].trim_end_matches('=');
    let bytes =
        Base64UrlUnpadded::decode_vec(payload).map_err(|_| AuthError::MalformedCredential)?;

    serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedCredential)
}

/// Decode the session-credential claims from a raw credential string.
pub fn decode_claims(raw: &str) -> Result<Claims, AuthError> {
    decode_payload(raw)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
