//! Error taxonomy for the client-side authorization core.

use thiserror::Error;

/// Result type used across the authorization core.
pub type AuthResult<T> = Result<T, AuthError>;

/// Authorization-core error.
///
/// Decode/claim failures are structural and deterministic; the remaining
/// variants carry whatever the backend collaborator reported. User-facing
/// messages for link and permission failures are fixed strings (the console
/// is Portuguese-first, matching the backend it talks to).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The credential string is not a decodable three-segment envelope.
    #[error("malformed credential")]
    MalformedCredential,

    /// The credential decoded but required claims are missing or empty.
    #[error("invalid token payload")]
    InvalidTokenPayload,

    /// The backend declined a login attempt.
    #[error("{0}")]
    AuthenticationRejected(String),

    /// A one-time action link was rejected, expired, or incomplete.
    #[error("Link inválido ou expirado")]
    LinkInvalidOrExpired,

    /// Mid-session rejection (401) observed on an authenticated request.
    #[error("unauthorized")]
    Unauthorized,

    /// Authenticated but lacking the required authority (403).
    #[error("Acesso negado")]
    Forbidden,
}
