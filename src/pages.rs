//! Placeholder pages served behind the gate.
//!
//! They only report the identity the gate published, so the gate can be run
//! and exercised end to end. Real page rendering lives elsewhere.

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::auth::OptionalAuth;
use crate::gate::{HOME_PATH, found};

pub async fn login_page(OptionalAuth(user): OptionalAuth) -> String {
    match user {
        Some(user) => format!("login: {}", user.email),
        None => "login".to_string(),
    }
}

/// The gate has already vetted the session, so a missing profile renders an
/// anonymous view instead of bouncing back to `/login`.
pub async fn panel_page(OptionalAuth(user): OptionalAuth, uri: Uri) -> String {
    match user {
        Some(user) => format!("{} ({}) {}", user.email, user.role, uri.path()),
        None => format!("anonymous {}", uri.path()),
    }
}

pub async fn root() -> Response {
    found(HOME_PATH)
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
