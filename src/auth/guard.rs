use serde::Serialize;

use super::Role;

pub const LOGIN_PATH: &str = "/login";
pub const PENDING_PATH: &str = "/pending";
const PUBLIC_PATHS: [&str; 3] = ["/", LOGIN_PATH, "/register"];
const DASHBOARD_PREFIX: &str = "/dashboard";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "target", rename_all = "snake_case")]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
}

/// Decide whether a caller with `role` (None = signed out) may open the
/// front-end `path`, or where to send them instead.
pub fn guard(role: Option<Role>, path: &str) -> GuardDecision {
    let path = normalize(path);

    let role = match role {
        Some(role) => role,
        None if is_public(path) => return GuardDecision::Allow,
        None => return GuardDecision::Redirect(LOGIN_PATH),
    };

    if path == LOGIN_PATH || path == "/register" {
        return GuardDecision::Redirect(role.dashboard_path());
    }

    if role.is_pending() {
        return if path == PENDING_PATH || path == "/" {
            GuardDecision::Allow
        } else {
            GuardDecision::Redirect(PENDING_PATH)
        };
    }

    if path == PENDING_PATH {
        return GuardDecision::Redirect(role.dashboard_path());
    }

    if is_under(path, DASHBOARD_PREFIX) && !role.is_admin() && !is_under(path, role.dashboard_path()) {
        return GuardDecision::Redirect(role.dashboard_path());
    }

    GuardDecision::Allow
}

fn normalize(path: &str) -> &str {
    let path = path.split(|c: char| c == '?' || c == '#').next().unwrap_or("");
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

fn is_under(path: &str, prefix: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}
