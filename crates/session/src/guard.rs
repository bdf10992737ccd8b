//! Route guards: pure navigation decisions over the session snapshot.
//!
//! Guards never perform IO: they read the controller's current state and
//! answer allow/redirect. Enforcement is advisory (UX); the backend remains
//! the security boundary.

use crate::controller::SessionController;

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(&'static str),
}

/// Generic protected-route guard.
///
/// Unauthenticated users are sent to login; an optionally required
/// permission is checked by exact match.
pub fn guard_route(session: &SessionController, required_permission: Option<&str>) -> RouteDecision {
    if !session.is_authenticated() {
        return RouteDecision::Redirect(LOGIN_PATH);
    }

    if let Some(permission) = required_permission {
        if !session.has_permission(permission) {
            return RouteDecision::Redirect(UNAUTHORIZED_PATH);
        }
    }

    RouteDecision::Allow
}

/// Admin-module guard: the required role, or any one of the listed
/// permissions, grants entry.
pub fn guard_admin_route(
    session: &SessionController,
    required_role: &str,
    required_permissions: &[&str],
) -> RouteDecision {
    if !session.is_authenticated() {
        return RouteDecision::Redirect(LOGIN_PATH);
    }

    let allowed = session.has_role(required_role)
        || required_permissions
            .iter()
            .any(|permission| session.has_permission(permission));

    if allowed {
        RouteDecision::Allow
    } else {
        RouteDecision::Redirect(UNAUTHORIZED_PATH)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
