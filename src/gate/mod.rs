//! Request Gate
//!
//! Decides, for every inbound page request, whether it passes through, goes
//! to a login page, goes to the unauthorized page, or goes to the
//! maintenance / waitlist page.
//!
//! The decision itself is a pure function of (path, session, settings) and
//! lives in `rules`. This module wires the collaborators that produce those
//! inputs: the settings cache and the token verifier.

use axum::http::HeaderMap;
use std::sync::Arc;

use crate::{
    auth::{VerifierState, extract_credential},
    cache::SettingsCache,
    clock::ClockState,
    models::{GateDecision, RouteSettings, Session},
};

/// Static route tables and path predicates.
pub mod paths;

/// The ordered rule list.
pub mod rules;

pub use rules::{GateInput, RULES, Rule, evaluate};

pub struct RequestGate {
    cache: SettingsCache,
    verifier: VerifierState,
    clock: ClockState,
    cookie_name: String,
}

impl RequestGate {
    pub fn new(
        cache: SettingsCache,
        verifier: VerifierState,
        clock: ClockState,
        cookie_name: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            verifier,
            clock,
            cookie_name: cookie_name.into(),
        }
    }

    /// decide
    ///
    /// Evaluates one request. Never fails: settings problems resolve to
    /// cached or default settings, credential problems resolve to "no
    /// session".
    pub async fn decide(&self, path: &str, credential: Option<&str>) -> GateDecision {
        // Assets never need settings; skip the fetch entirely.
        if paths::is_static_asset(path) {
            return GateDecision::Continue;
        }

        let settings = self.current_settings().await;
        let session = self.session_for(credential);

        let input = GateInput {
            path,
            session: session.as_ref(),
            settings: &settings,
        };
        let (rule, decision) = evaluate(&input);

        tracing::debug!(
            path = %path,
            rule,
            decision = decision.label(),
            location = decision.location().unwrap_or(""),
            authenticated = session.is_some(),
            maintenance = settings.maintenance_mode,
            "Gate decision"
        );

        decision
    }

    /// Same as `decide`, reading the credential from the request headers.
    pub async fn decide_for(&self, path: &str, headers: &HeaderMap) -> GateDecision {
        let credential = extract_credential(headers, &self.cookie_name);
        self.decide(path, credential.as_deref()).await
    }

    /// The settings snapshot this request would see.
    pub async fn current_settings(&self) -> RouteSettings {
        self.cache.get(self.clock.now()).await
    }

    /// Forces the next request to refetch settings.
    pub async fn invalidate_settings(&self) {
        self.cache.invalidate().await;
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn session_for(&self, credential: Option<&str>) -> Option<Session> {
        let token = credential?;
        match self.verifier.verify(token) {
            Ok(session) => Some(session),
            Err(e) => {
                // The reason stays in the logs; the caller only sees "no session".
                tracing::debug!(error = %e, "Credential rejected, treating request as anonymous");
                None
            }
        }
    }
}

/// GateState
///
/// The shared handle stored in the application state.
pub type GateState = Arc<RequestGate>;
