use axum::http::HeaderValue;

use crate::models::Role;

// --- Fixed Paths ---

pub const ROOT_PATH: &str = "/";
pub const MAINTENANCE_PATH: &str = "/maintenance";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";
pub const WAITLIST_PREFIX: &str = "/waitlist";
pub const ADMIN_PREFIX: &str = "/admin";

pub const ADMIN_LOGIN: &str = "/admin/login";
pub const COACH_LOGIN: &str = "/coach/login";
pub const EMPLOYEE_LOGIN: &str = "/employee/login";
pub const STUDENT_LOGIN: &str = "/login";

/// Login entry points of the four portals.
pub const LOGIN_PATHS: &[&str] = &[ADMIN_LOGIN, COACH_LOGIN, EMPLOYEE_LOGIN, STUDENT_LOGIN];

/// Paths reachable without a session: the login pages plus first-run setup.
pub const PUBLIC_PATHS: &[&str] = &[
    ADMIN_LOGIN,
    COACH_LOGIN,
    EMPLOYEE_LOGIN,
    STUDENT_LOGIN,
    "/setup",
    "/admin/setup",
];

/// Framework assets, the API namespace, and service internals (health probe,
/// API docs). The gate never looks at these.
pub const BYPASS_PREFIXES: &[&str] = &[
    "/_next",
    "/static",
    "/assets",
    "/api",
    "/health",
    "/swagger-ui",
];

/// ProtectedRouteTable
///
/// Ordered; the first entry whose prefix covers the path decides.
pub const PROTECTED_ROUTES: &[(&str, &[Role])] = &[
    (ADMIN_PREFIX, &[Role::Admin]),
    ("/coach", &[Role::Admin, Role::Professor]),
    ("/employee", &[Role::Admin, Role::Funcionario]),
    ("/user", &[Role::Admin, Role::Aluno]),
];

/// has_prefix
///
/// Segment-aware prefix test: `/admin` covers `/admin` and `/admin/users`
/// but not `/administrator`.
pub fn has_prefix(path: &str, prefix: &str) -> bool {
    if prefix == ROOT_PATH {
        return path.starts_with('/');
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

pub fn is_login_path(path: &str) -> bool {
    LOGIN_PATHS.contains(&path)
}

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Static files, framework internals, and the API namespace.
pub fn is_static_asset(path: &str) -> bool {
    path.contains('.') || BYPASS_PREFIXES.iter().any(|prefix| has_prefix(path, prefix))
}

/// The first protected entry covering `path`, if any.
pub fn protected_route(path: &str) -> Option<(&'static str, &'static [Role])> {
    PROTECTED_ROUTES
        .iter()
        .find(|(prefix, _)| has_prefix(path, prefix))
        .copied()
}

/// Login page for the area a protected prefix belongs to.
pub fn login_path_for(prefix: &str) -> &'static str {
    match prefix {
        ADMIN_PREFIX => ADMIN_LOGIN,
        "/coach" => COACH_LOGIN,
        "/employee" => EMPLOYEE_LOGIN,
        _ => STUDENT_LOGIN,
    }
}

/// `<login>?redirect=<path>`; the original path is carried verbatim so the
/// login page can send the user back after authenticating.
pub fn login_redirect(prefix: &str, original_path: &str) -> String {
    format!("{}?redirect={}", login_path_for(prefix), original_path)
}

/// A maintenance target must be usable as a `Location` header as-is.
pub fn is_redirect_target(target: &str) -> bool {
    !target.trim().is_empty() && HeaderValue::from_str(target).is_ok()
}
