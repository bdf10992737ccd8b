//! Permission normalization and admin authority resolution.
//!
//! Backend permission grants are free-form `{resource, action}` pairs, with
//! verbs and resource names in mixed English/Portuguese and resources that
//! are sometimes API paths (`/api/v1/users/{id}`). This module collapses that
//! vocabulary into canonical `"<resource>:<action>"` authority tags so the
//! rest of the client can reason over a closed set.
//!
//! Normalization is total: unknown input degrades to a best-effort lowercase
//! tag instead of failing.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Bucket vocabularies (kept as explicit constants for auditability)
// ─────────────────────────────────────────────────────────────────────────────

/// Resource markers, checked in collision-priority order: a resource matching
/// both `user` and `role` markers normalizes to `user`.
const USER_MARKERS: &[&str] = &["user", "usuario", "usuário"];
const ROLE_MARKERS: &[&str] = &["role", "papel", "papeis", "papéis"];
const PERMISSION_MARKERS: &[&str] = &["permission", "permissao", "permissão", "permiss"];

/// Verbs that normalize to the `write` action.
const WRITE_VERBS: &[&str] = &[
    "write", "create", "criar", "manage", "update", "atualiza", "editar", "delete", "excluir",
    "remover",
];

/// Verbs that normalize to the `read` action.
const READ_VERBS: &[&str] = &["read", "list", "lista", "busca", "buscar", "listar"];

/// The six authorities that grant visibility of the admin module.
pub const ADMIN_AUTHORITIES: &[&str] = &[
    "user:read",
    "user:write",
    "role:read",
    "role:write",
    "permission:read",
    "permission:write",
];

static PATH_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{.*?\}").expect("path parameter pattern is valid")
});

// ─────────────────────────────────────────────────────────────────────────────
// Normalization
// ─────────────────────────────────────────────────────────────────────────────

fn contains_any(haystack: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| haystack.contains(marker))
}

/// Normalize a raw resource string into a canonical resource tag.
///
/// Lowercases, then routes into the fixed `user`/`role`/`permission` buckets
/// by substring match; anything else is treated as a path: `{...}` parameter
/// placeholders are stripped, leading slashes removed, and the first
/// `/`-delimited segment wins.
pub fn normalize_resource(raw: &str) -> String {
    let lower = raw.to_lowercase();

    if contains_any(&lower, USER_MARKERS) {
        return "user".to_string();
    }
    if contains_any(&lower, ROLE_MARKERS) {
        return "role".to_string();
    }
    if contains_any(&lower, PERMISSION_MARKERS) {
        return "permission".to_string();
    }

    let stripped = PATH_PARAM.replace_all(&lower, "");
    stripped
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Normalize a raw action verb into `write`, `read`, or its lowercase self.
pub fn normalize_action(raw: &str) -> String {
    let lower = raw.to_lowercase();

    if contains_any(&lower, WRITE_VERBS) {
        return "write".to_string();
    }
    if contains_any(&lower, READ_VERBS) {
        return "read".to_string();
    }

    lower
}

// ─────────────────────────────────────────────────────────────────────────────
// Authority tags
// ─────────────────────────────────────────────────────────────────────────────

/// A raw permission grant as reported by the profile backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub resource: String,
    pub action: String,
}

/// Canonical `"<resource>:<action>"` authority string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AuthorityTag(String);

impl AuthorityTag {
    /// Build a tag from an already-normalized resource/action pair.
    pub fn new(resource: &str, action: &str) -> Self {
        Self(format!("{resource}:{action}"))
    }

    /// Normalize a raw grant into its canonical tag. Total, never fails.
    pub fn from_grant(grant: &PermissionGrant) -> Self {
        Self::new(
            &normalize_resource(&grant.resource),
            &normalize_action(&grant.action),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AuthorityTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a sequence of grants into the set of held authorities.
pub fn build_authorities(grants: &[PermissionGrant]) -> BTreeSet<AuthorityTag> {
    grants.iter().map(AuthorityTag::from_grant).collect()
}

/// True iff the authority set intersects the six admin-module authorities.
pub fn has_admin_module_access(authorities: &BTreeSet<AuthorityTag>) -> bool {
    ADMIN_AUTHORITIES
        .iter()
        .any(|tag| authorities.contains(&AuthorityTag(tag.to_string())))
}

// ─────────────────────────────────────────────────────────────────────────────
// Admin menu derivation
// ─────────────────────────────────────────────────────────────────────────────

/// Admin sub-sections whose visibility is authority-derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminSection {
    Users,
    Roles,
    Permissions,
}

impl AdminSection {
    /// User-facing menu label.
    pub fn label(&self) -> &'static str {
        match self {
            AdminSection::Users => "Usuários",
            AdminSection::Roles => "Roles",
            AdminSection::Permissions => "Permissões",
        }
    }
}

/// Derive the visible admin menu from a set of held authorities.
///
/// Users requires `user:read`; Roles and Permissions accept either `read` or
/// `write` on their resource.
pub fn admin_menu(authorities: &BTreeSet<AuthorityTag>) -> Vec<AdminSection> {
    let holds = |tag: &str| authorities.contains(&AuthorityTag(tag.to_string()));
    let mut sections = Vec::new();

    if holds("user:read") {
        sections.push(AdminSection::Users);
    }
    if holds("role:read") || holds("role:write") {
        sections.push(AdminSection::Roles);
    }
    if holds("permission:read") || holds("permission:write") {
        sections.push(AdminSection::Permissions);
    }

    sections
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(resource: &str, action: &str) -> PermissionGrant {
        PermissionGrant {
            resource: resource.to_string(),
            action: action.to_string(),
        }
    }

    #[test]
    fn resource_buckets_win_over_path_handling() {
        assert_eq!(normalize_resource("/api/v1/users/{id}"), "user");
        assert_eq!(normalize_resource("USER_ACCOUNT"), "user");
        assert_eq!(normalize_resource("GerenciarPapeis"), "role");
        assert_eq!(normalize_resource("Permissões"), "permission");
    }

    #[test]
    fn unbucketed_resource_takes_first_path_segment() {
        assert_eq!(normalize_resource("/reports/{id}/sales"), "reports");
        assert_eq!(normalize_resource("///invoices"), "invoices");
        assert_eq!(normalize_resource("Estoque"), "estoque");
    }

    #[test]
    fn collision_priority_is_user_then_role_then_permission() {
        // Contains both "user" and "role"; "user" must win.
        assert_eq!(normalize_resource("user-role-bindings"), "user");
        assert_eq!(normalize_resource("role-permissions"), "role");
    }

    #[test]
    fn action_verbs_normalize_multilingually() {
        assert_eq!(normalize_action("Atualizar"), "write");
        assert_eq!(normalize_action("EXCLUIR"), "write");
        assert_eq!(normalize_action("manage-all"), "write");
        assert_eq!(normalize_action("Listar"), "read");
        assert_eq!(normalize_action("busca"), "read");
        assert_eq!(normalize_action("approve"), "approve");
    }

    #[test]
    fn builds_authority_set() {
        let authorities = build_authorities(&[
            grant("/api/v1/users/{id}", "Listar"),
            grant("GerenciarPapeis", "Criar"),
            grant("reports/sales", "export"),
        ]);

        assert!(authorities.contains(&AuthorityTag::new("user", "read")));
        assert!(authorities.contains(&AuthorityTag::new("role", "write")));
        assert!(authorities.contains(&AuthorityTag::new("reports", "export")));
    }

    #[test]
    fn admin_access_requires_an_admin_authority() {
        let role_read = build_authorities(&[grant("role", "read")]);
        assert!(has_admin_module_access(&role_read));

        let sales_only = build_authorities(&[grant("report", "read:sales")]);
        // "report" bucket misses; action normalizes to read, tag is
        // "report:read" which is not an admin authority.
        assert!(!has_admin_module_access(&sales_only));

        assert!(!has_admin_module_access(&BTreeSet::new()));
    }

    #[test]
    fn menu_sections_follow_authorities() {
        let authorities = build_authorities(&[
            grant("user", "read"),
            grant("permission", "write"),
        ]);
        assert_eq!(
            admin_menu(&authorities),
            vec![AdminSection::Users, AdminSection::Permissions]
        );

        // user:write alone does not reveal the Users section.
        let write_only = build_authorities(&[grant("user", "write")]);
        assert!(admin_menu(&write_only).is_empty());
    }

    #[test]
    fn section_labels() {
        assert_eq!(AdminSection::Users.label(), "Usuários");
        assert_eq!(AdminSection::Roles.label(), "Roles");
        assert_eq!(AdminSection::Permissions.label(), "Permissões");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: normalization is total and the resulting tag always
            /// has exactly one colon separating non-uppercase halves.
            #[test]
            fn normalization_is_total(resource in ".{0,40}", action in ".{0,40}") {
                let tag = AuthorityTag::from_grant(&PermissionGrant {
                    resource: resource.clone(),
                    action: action.clone(),
                });

                let rendered = tag.as_str();
                prop_assert!(rendered.contains(':'));
                let norm_action = normalize_action(&action);
                prop_assert_eq!(&norm_action, &norm_action.to_lowercase());
            }

            /// Property: bucketed resources always collapse to the bucket
            /// name regardless of surrounding noise.
            #[test]
            fn user_marker_always_buckets(prefix in "[a-z/]{0,10}", suffix in "[a-z/]{0,10}") {
                let raw = format!("{prefix}user{suffix}");
                prop_assert_eq!(normalize_resource(&raw), "user");
            }
        }
    }
}
