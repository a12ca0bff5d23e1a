use crate::gate::paths::{self, has_prefix};
use crate::models::{GateDecision, RouteSettings, Session};

/// Everything a rule may look at for one request.
#[derive(Debug, Clone, Copy)]
pub struct GateInput<'a> {
    pub path: &'a str,
    pub session: Option<&'a Session>,
    pub settings: &'a RouteSettings,
}

/// Rule
///
/// A named step of the gate. `apply` returns `Some` when the rule decides the
/// request and `None` to hand it to the next rule.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&GateInput<'_>) -> Option<GateDecision>,
}

/// The gate, in precedence order. First rule to decide wins.
pub const RULES: &[Rule] = &[
    Rule {
        name: "static_assets",
        apply: static_assets,
    },
    Rule {
        name: "login_pages",
        apply: login_pages,
    },
    Rule {
        name: "maintenance",
        apply: maintenance,
    },
    Rule {
        name: "public_paths",
        apply: public_paths,
    },
    Rule {
        name: "protected_routes",
        apply: protected_routes,
    },
];

/// Runs the rule list. Returns the name of the deciding rule alongside the
/// decision; requests no rule claims are public.
pub fn evaluate(input: &GateInput<'_>) -> (&'static str, GateDecision) {
    RULES
        .iter()
        .find_map(|rule| (rule.apply)(input).map(|decision| (rule.name, decision)))
        .unwrap_or(("default", GateDecision::Continue))
}

pub fn static_assets(input: &GateInput<'_>) -> Option<GateDecision> {
    paths::is_static_asset(input.path).then_some(GateDecision::Continue)
}

/// Login pages skip every session check. During maintenance this rule steps
/// aside and the maintenance rule redirects them.
pub fn login_pages(input: &GateInput<'_>) -> Option<GateDecision> {
    (paths::is_login_path(input.path) && !input.settings.maintenance_mode)
        .then_some(GateDecision::Continue)
}

pub fn maintenance(input: &GateInput<'_>) -> Option<GateDecision> {
    let settings = input.settings;
    if !settings.maintenance_mode {
        return None;
    }

    let path = input.path;
    let target = settings.maintenance_redirect_target.as_str();
    let redirect = || Some(GateDecision::RedirectTo(target.to_string()));

    if path == paths::ROOT_PATH || paths::is_login_path(path) {
        return redirect();
    }

    if has_prefix(path, paths::WAITLIST_PREFIX) {
        return Some(GateDecision::Continue);
    }

    // The target may carry a query string; only its path can match a request.
    let target_path = target.split('?').next().unwrap_or(target);
    let is_holding_page = has_prefix(path, paths::MAINTENANCE_PATH)
        || (target_path.starts_with('/')
            && target_path != paths::ROOT_PATH
            && has_prefix(path, target_path));

    if has_prefix(path, paths::ADMIN_PREFIX) || is_holding_page {
        return Some(GateDecision::Continue);
    }

    match settings.route_enabled(path) {
        Some(true) => None,
        _ => redirect(),
    }
}

pub fn public_paths(input: &GateInput<'_>) -> Option<GateDecision> {
    paths::is_public_path(input.path).then_some(GateDecision::Continue)
}

pub fn protected_routes(input: &GateInput<'_>) -> Option<GateDecision> {
    let (prefix, allowed) = paths::protected_route(input.path)?;

    let decision = match input.session {
        None => GateDecision::RedirectTo(paths::login_redirect(prefix, input.path)),
        Some(session) if !allowed.contains(&session.role) => GateDecision::Unauthorized,
        Some(_) => GateDecision::Continue,
    };
    Some(decision)
}
