use thiserror::Error;

/// GateError
///
/// Failures raised by the gate's collaborators. None of them escape
/// `RequestGate::decide`: a `ConfigFetch` falls back to cached or default
/// settings, a `CredentialInvalid` collapses to "no session".
///
/// A role mismatch and an unknown path are not errors at all; they are the
/// `Unauthorized` and `Continue` decisions respectively.
#[derive(Debug, Error)]
pub enum GateError {
    /// The settings provider was unreachable, timed out, answered non-2xx,
    /// or returned a body that does not decode as route settings.
    #[error("settings fetch failed: {0}")]
    ConfigFetch(String),

    /// The session token is missing a claim, malformed, expired, or signed
    /// with a different secret. The reason is only ever logged.
    #[error("credential rejected: {0}")]
    CredentialInvalid(String),
}

impl From<reqwest::Error> for GateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GateError::ConfigFetch("settings provider timed out".to_string())
        } else {
            GateError::ConfigFetch(err.to_string())
        }
    }
}

impl From<jsonwebtoken::errors::Error> for GateError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        GateError::CredentialInvalid(err.to_string())
    }
}

pub type GateResult<T> = Result<T, GateError>;
