/// Router Module Index
///
/// Groups the API endpoints by who may call them. The API namespace is never
/// gated by the request gate, so each endpoint authenticates on its own.

/// Routes accessible to anyone: health, the settings read endpoint, and the
/// forward-auth check.
pub mod public;

/// Routes that change gate configuration. Handlers require an admin session.
pub mod admin;
