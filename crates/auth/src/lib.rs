//! `portal-auth`: pure authorization domain for the admin console client.
//!
//! This crate is intentionally decoupled from transport, storage, and UI:
//! credential decoding, claim validation, the user projection, and permission
//! normalization are all deterministic functions with no IO. Signature
//! verification is a server responsibility and is absent here; nothing in
//! this crate is a security boundary.

pub mod authority;
pub mod claims;
pub mod error;
pub mod token;
pub mod user;

pub use authority::{
    ADMIN_AUTHORITIES, AdminSection, AuthorityTag, PermissionGrant, admin_menu,
    build_authorities, has_admin_module_access, normalize_action, normalize_resource,
};
pub use claims::{Claims, decode_claims, decode_payload};
pub use error::{AuthError, AuthResult};
pub use token::SessionToken;
pub use user::{Permission, Role, User};
