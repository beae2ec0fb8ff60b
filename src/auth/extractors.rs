//! Axum extractors exposing the identity the gate published for this request.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::types::{AuthUser, CurrentUser};

fn published_user(parts: &Parts) -> Option<AuthUser> {
    parts
        .extensions
        .get::<CurrentUser>()
        .and_then(|current| current.0.clone())
}

/// Optional identity extractor - never fails.
/// Yields `None` for anonymous visitors and for routes outside the gate.
pub struct OptionalAuth(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(published_user(parts)))
    }
}
