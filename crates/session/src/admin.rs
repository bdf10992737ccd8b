//! Admin-module visibility: dual-source authority evaluation.
//!
//! Visibility combines two independent sources with OR: authorities embedded
//! in the session token's claims, and authorities normalized from a freshly
//! fetched profile. The embedded token can be stale relative to server-side
//! permission edits, and either source granting access is sufficient.

use portal_auth::{ADMIN_AUTHORITIES, AdminSection, admin_menu, build_authorities};
use tracing::debug;

use crate::controller::SessionController;
use crate::ports::{Profile, ProfileBackend};

/// True iff the admin module should be visible for this identity.
pub fn admin_module_visible(session: &SessionController, profile: Option<&Profile>) -> bool {
    let from_token = ADMIN_AUTHORITIES
        .iter()
        .any(|authority| session.has_permission(authority));

    let from_profile = profile.is_some_and(|me| {
        portal_auth::has_admin_module_access(&build_authorities(&me.permissions))
    });

    from_token || from_profile
}

/// Admin sub-sections visible for a fetched profile.
pub fn visible_admin_sections(profile: &Profile) -> Vec<AdminSection> {
    admin_menu(&build_authorities(&profile.permissions))
}

/// Fetch the profile and evaluate visibility against both sources.
///
/// A failed fetch degrades to the token source alone rather than an error:
/// menu visibility is a UX concern, and the backend still enforces access.
pub async fn resolve_admin_visibility(
    session: &SessionController,
    backend: &dyn ProfileBackend,
) -> bool {
    let profile = match backend.get_me().await {
        Ok(profile) => Some(profile),
        Err(err) => {
            debug!(%err, "profile fetch failed; falling back to token authorities");
            None
        }
    };

    admin_module_visible(session, profile.as_ref())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
