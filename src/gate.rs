//! Request-time access gate.
//!
//! Runs before every page handler: resolves the visitor's profile, performs the
//! refresh exchange, then either redirects or forwards the request. The
//! resolved identity is published as a [`CurrentUser`] request extension before
//! any decision is made.

use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{
    AUTH_COOKIE_NAME, AuthUser, CurrentUser, REFRESH_COOKIE_NAME, RolePermissions,
    append_cookies, get_cookie,
};
use crate::upstream::{RefreshResponse, UpstreamClient};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/panel/inicio";
pub const PANEL_PREFIX: &str = "/panel";

/// Where a request ends up after the gate has evaluated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Session is invalid; send the visitor to the login page.
    RedirectLogin,
    /// Session is valid but the visitor asked for the login page.
    RedirectHome,
    /// The visitor's role may not see this part of the panel.
    Unauthorized,
    Forward,
}

impl GateDecision {
    pub fn location(&self) -> Option<&'static str> {
        match self {
            Self::RedirectLogin => Some(LOGIN_PATH),
            Self::RedirectHome | Self::Unauthorized => Some(HOME_PATH),
            Self::Forward => None,
        }
    }
}

/// Decide the outcome for a request.
///
/// A 401 from the refresh exchange wins over a resolved profile; the role check
/// only applies to `/panel` paths and only when a profile was resolved.
pub fn decide(
    path: &str,
    user: Option<&AuthUser>,
    refresh: &RefreshResponse,
    permissions: &RolePermissions,
) -> GateDecision {
    if path != LOGIN_PATH && refresh.is_unauthenticated() {
        return GateDecision::RedirectLogin;
    }

    if refresh.is_ok() && path == LOGIN_PATH {
        return GateDecision::RedirectHome;
    }

    if let Some(user) = user {
        if path.starts_with(PANEL_PREFIX) && !permissions.allows(&user.role, path) {
            return GateDecision::Unauthorized;
        }
    }

    GateDecision::Forward
}

/// Shared state for the gate middleware.
#[derive(Clone)]
pub struct GateState {
    pub upstream: UpstreamClient,
    pub permissions: Arc<RolePermissions>,
    /// Whether re-issued cookies carry the `Secure` attribute
    pub secure_cookies: bool,
}

/// Build a 302 response with an empty body.
pub fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Middleware enforcing authentication and the role allow-list.
pub async fn access_gate(
    State(gate): State<GateState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let auth_token = get_cookie(request.headers(), AUTH_COOKIE_NAME)
        .unwrap_or_default()
        .to_string();
    let refresh_token = get_cookie(request.headers(), REFRESH_COOKIE_NAME)
        .unwrap_or_default()
        .to_string();

    let user = gate.upstream.resolve_profile(&auth_token).await;
    request.extensions_mut().insert(CurrentUser(user.clone()));

    let refresh = gate.upstream.exchange_refresh_token(&refresh_token).await;

    let decision = decide(&path, user.as_ref(), &refresh, &gate.permissions);
    match decision {
        GateDecision::RedirectLogin => {
            warn!(path = %path, "Visitor not authenticated, redirecting to login")
        }
        GateDecision::RedirectHome => info!("Visitor already authenticated, redirecting to panel"),
        GateDecision::Unauthorized => {
            let role = user.as_ref().map(|u| u.role.as_str()).unwrap_or_default();
            warn!(path = %path, role = %role, "Role not allowed on this path");
        }
        GateDecision::Forward => {}
    }

    let mut response = match decision.location() {
        Some(location) => found(location),
        None => next.run(request).await,
    };

    append_cookies(response.headers_mut(), &refresh.cookies, gate.secure_cookies);
    response
}
