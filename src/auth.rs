use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, StatusCode, header, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    config::AppConfig,
    error::{GateError, GateResult},
    models::{Role, Session},
};

/// Claims
///
/// The payload carried inside a session token (HS256 JWT).
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's identifier.
    pub sub: String,
    pub email: String,
    /// Raw role claim. Parsed into `Role` by the verifier and never used
    /// as a string after that.
    pub role: String,
    /// Expiration Time (exp): tokens are rejected from this instant on.
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// TokenVerifier
///
/// Turns a session token into a `Session`. Every rejection (expired,
/// malformed, wrong signature, missing claim) is an `Err`, never a panic.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> GateResult<Session>;
}

/// VerifierState
///
/// The shared handle to the verifier in use.
pub type VerifierState = Arc<dyn TokenVerifier>;

/// JwtVerifier
///
/// Validates HS256 tokens signed with the configured secret. Expiry is
/// checked with zero leeway.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> GateResult<Session> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        let claims = token_data.claims;

        if claims.sub.trim().is_empty() {
            return Err(GateError::CredentialInvalid("empty subject".to_string()));
        }

        Ok(Session {
            user_id: claims.sub,
            email: claims.email,
            role: Role::from_claim(&claims.role),
        })
    }
}

/// extract_credential
///
/// Finds the session token on a request: an `Authorization: Bearer` header
/// first, then the named cookie. An Authorization header that is not a
/// non-empty bearer token does not shadow the cookie.
pub fn extract_credential(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
    {
        return Some(token.to_string());
    }

    let cookie_prefix = format!("{}=", cookie_name);
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(cookie_prefix.as_str()))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// AuthUser Extractor Result
///
/// The verified identity of a caller of an authenticated API endpoint.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

/// AuthUser Extractor Implementation
///
/// Reads the bearer header or session cookie and verifies it with the shared
/// `TokenVerifier`. The API namespace is not gated, so endpoints that need an
/// identity take this extractor directly.
///
/// Rejection: StatusCode::UNAUTHORIZED (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    VerifierState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verifier = VerifierState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let token = extract_credential(&parts.headers, &config.session_cookie_name)
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let session = verifier.verify(&token).map_err(|e| {
            tracing::debug!(error = %e, "API credential rejected");
            StatusCode::UNAUTHORIZED
        })?;

        Ok(AuthUser {
            id: session.user_id,
            email: session.email,
            role: session.role,
        })
    }
}
