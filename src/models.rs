use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::gate::paths::{self, has_prefix};

// --- Wire Schemas (Settings Provider Contract) ---

/// RouteSettingsPayload
///
/// The JSON document served by the settings endpoint and consumed by the
/// gate's HTTP provider. Every field is optional on the wire; a missing field
/// takes the value from `Default`, which is also the table the gate falls back
/// to when the provider cannot be reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteSettingsPayload {
    pub maintenance_mode: bool,
    #[schema(example = "/maintenance")]
    pub maintenance_redirect_url: String,
    pub route_home_enabled: bool,
    pub route_user_enabled: bool,
    pub route_coach_enabled: bool,
    pub route_employee_enabled: bool,
    pub route_shopping_enabled: bool,
    pub route_events_enabled: bool,
    pub route_services_enabled: bool,
    pub route_contact_enabled: bool,
    pub route_waitlist_enabled: bool,
}

impl Default for RouteSettingsPayload {
    fn default() -> Self {
        Self {
            maintenance_mode: false,
            maintenance_redirect_url: paths::MAINTENANCE_PATH.to_string(),
            route_home_enabled: true,
            route_user_enabled: false,
            route_coach_enabled: false,
            route_employee_enabled: false,
            route_shopping_enabled: false,
            route_events_enabled: true,
            route_services_enabled: false,
            route_contact_enabled: true,
            route_waitlist_enabled: true,
        }
    }
}

impl RouteSettingsPayload {
    /// Applies a partial update in place. Fields absent from the update keep
    /// their current value.
    pub fn apply(&mut self, update: RouteSettingsUpdate) {
        if let Some(v) = update.maintenance_mode {
            self.maintenance_mode = v;
        }
        if let Some(v) = update.maintenance_redirect_url {
            self.maintenance_redirect_url = v;
        }
        if let Some(v) = update.route_home_enabled {
            self.route_home_enabled = v;
        }
        if let Some(v) = update.route_user_enabled {
            self.route_user_enabled = v;
        }
        if let Some(v) = update.route_coach_enabled {
            self.route_coach_enabled = v;
        }
        if let Some(v) = update.route_employee_enabled {
            self.route_employee_enabled = v;
        }
        if let Some(v) = update.route_shopping_enabled {
            self.route_shopping_enabled = v;
        }
        if let Some(v) = update.route_events_enabled {
            self.route_events_enabled = v;
        }
        if let Some(v) = update.route_services_enabled {
            self.route_services_enabled = v;
        }
        if let Some(v) = update.route_contact_enabled {
            self.route_contact_enabled = v;
        }
        if let Some(v) = update.route_waitlist_enabled {
            self.route_waitlist_enabled = v;
        }
    }
}

/// RouteSettingsUpdate
///
/// Partial update payload for the admin settings endpoint
/// (PUT /api/admin/settings/routes). Only the provided fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RouteSettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_home_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_user_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_coach_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_employee_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_shopping_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_events_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_services_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_contact_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_waitlist_enabled: Option<bool>,
}

/// GateCheckResponse
///
/// Body of the forward-auth endpoint (GET /api/gate/check).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct GateCheckResponse {
    /// "continue" | "redirect" | "unauthorized"
    pub decision: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

// --- Gate Domain Types ---

/// RouteSettings
///
/// The gate's view of the remote configuration: the maintenance switch, where
/// to send visitors while it is on, and which top-level areas are enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSettings {
    pub maintenance_mode: bool,
    pub maintenance_redirect_target: String,
    /// Path prefix -> enabled. `/` only ever matches the root path itself.
    pub route_flags: BTreeMap<String, bool>,
}

impl RouteSettings {
    /// Builds settings from raw parts, normalising an empty or unusable target
    /// to `/maintenance` and enabling `/waitlist` when the map omits it.
    pub fn new(
        maintenance_mode: bool,
        maintenance_redirect_target: impl Into<String>,
        mut route_flags: BTreeMap<String, bool>,
    ) -> Self {
        let target = maintenance_redirect_target.into();
        let maintenance_redirect_target = if paths::is_redirect_target(&target) {
            target
        } else {
            if !target.trim().is_empty() {
                tracing::warn!(
                    redirect_target = ?target,
                    "Maintenance target is not a valid Location, using /maintenance"
                );
            }
            paths::MAINTENANCE_PATH.to_string()
        };
        route_flags
            .entry(paths::WAITLIST_PREFIX.to_string())
            .or_insert(true);

        Self {
            maintenance_mode,
            maintenance_redirect_target,
            route_flags,
        }
    }

    /// route_enabled
    ///
    /// Longest-prefix lookup of the flag governing `path`. The exact root
    /// path only matches the `/` entry; `/` never acts as a catch-all prefix.
    /// Returns `None` when no entry covers the path.
    pub fn route_enabled(&self, path: &str) -> Option<bool> {
        if path == paths::ROOT_PATH {
            return self.route_flags.get(paths::ROOT_PATH).copied();
        }

        self.route_flags
            .iter()
            .filter(|(prefix, _)| prefix.as_str() != paths::ROOT_PATH && has_prefix(path, prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, enabled)| *enabled)
    }
}

impl Default for RouteSettings {
    fn default() -> Self {
        RouteSettingsPayload::default().into()
    }
}

impl From<RouteSettingsPayload> for RouteSettings {
    fn from(payload: RouteSettingsPayload) -> Self {
        let flags = [
            (paths::ROOT_PATH, payload.route_home_enabled),
            ("/user", payload.route_user_enabled),
            ("/coach", payload.route_coach_enabled),
            ("/employee", payload.route_employee_enabled),
            ("/shopping", payload.route_shopping_enabled),
            ("/events", payload.route_events_enabled),
            ("/services", payload.route_services_enabled),
            ("/contact", payload.route_contact_enabled),
            (paths::WAITLIST_PREFIX, payload.route_waitlist_enabled),
        ]
        .into_iter()
        .map(|(prefix, enabled)| (prefix.to_string(), enabled))
        .collect();

        RouteSettings::new(
            payload.maintenance_mode,
            payload.maintenance_redirect_url,
            flags,
        )
    }
}

/// Role
///
/// The closed set of portal roles. Token claims are parsed into this enum at
/// the verifier boundary; anything outside the set (including different
/// casing) becomes `Unrecognized`, which no protected route allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Professor,
    Funcionario,
    Aluno,
    Unrecognized,
}

impl Role {
    pub fn from_claim(raw: &str) -> Self {
        match raw {
            "admin" => Role::Admin,
            "professor" => Role::Professor,
            "funcionario" => Role::Funcionario,
            "aluno" => Role::Aluno,
            _ => Role::Unrecognized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Professor => "professor",
            Role::Funcionario => "funcionario",
            Role::Aluno => "aluno",
            Role::Unrecognized => "unrecognized",
        }
    }
}

/// Session
///
/// The verified identity behind a request. Only the token verifier builds
/// one; an unverifiable credential yields no session at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

/// GateDecision
///
/// The single outcome of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Continue,
    RedirectTo(String),
    /// Valid session, insufficient role. Rendered as a redirect to the
    /// unauthorized page.
    Unauthorized,
}

impl GateDecision {
    /// Where the client should be sent, if anywhere.
    pub fn location(&self) -> Option<&str> {
        match self {
            GateDecision::Continue => None,
            GateDecision::RedirectTo(url) => Some(url.as_str()),
            GateDecision::Unauthorized => Some(paths::UNAUTHORIZED_PATH),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GateDecision::Continue => "continue",
            GateDecision::RedirectTo(_) => "redirect",
            GateDecision::Unauthorized => "unauthorized",
        }
    }
}

impl From<&GateDecision> for GateCheckResponse {
    fn from(decision: &GateDecision) -> Self {
        Self {
            decision: decision.label().to_string(),
            location: decision.location().map(str::to_string),
        }
    }
}
