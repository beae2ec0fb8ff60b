//! Identity types shared between the gate and downstream handlers.

use serde::Deserialize;

/// Identity resolved from the auth service's profile endpoint.
///
/// Both fields are required when decoding, so a body missing either one never
/// produces a partially populated user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
    pub email: String,
    pub role: String,
}

/// Per-request identity published into request extensions by the gate.
/// `CurrentUser(None)` marks a request whose profile could not be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentUser(pub Option<AuthUser>);
