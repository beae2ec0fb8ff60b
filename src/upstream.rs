//! Client for the auth service.
//!
//! Two calls are made per request: the profile lookup, authenticated with the
//! `auth_token` as a bearer token, and the refresh exchange, which forwards the
//! `refresh_token` cookie. Neither call surfaces errors to the caller; failures
//! are logged and mapped to "no identity" and "unauthenticated" respectively.

use axum::http::StatusCode;
use reqwest::{Response, header};
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

use crate::auth::{
    AuthUser, ForwardedCookie, REFRESH_COOKIE_NAME, UpstreamError, parse_set_cookie,
};

/// Extra profile attempts made after a 401.
pub const PROFILE_RETRIES: u32 = 1;

/// Default per-call timeout for auth service requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a refresh exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshResponse {
    /// Upstream status, or a synthetic 401 when upstream could not be reached.
    pub status: StatusCode,
    /// Cookies upstream asked us to set, in the order received.
    pub cookies: Vec<ForwardedCookie>,
}

impl RefreshResponse {
    fn unauthenticated() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            cookies: Vec::new(),
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }
}

/// HTTP client bound to one auth service base URL.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    profile_url: Url,
    refresh_url: Url,
}

impl UpstreamClient {
    /// Create a client whose requests all give up after `timeout`.
    pub fn new(backend_url: &Url, timeout: Duration) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            profile_url: endpoint(backend_url, "auth/profile")?,
            refresh_url: endpoint(backend_url, "auth/refresh")?,
        })
    }

    /// Resolve the identity behind an auth token.
    ///
    /// A 401 is retried `PROFILE_RETRIES` times. Any other failure, including a
    /// non-2xx status or a body that is not a complete profile, yields `None`.
    pub async fn resolve_profile(&self, auth_token: &str) -> Option<AuthUser> {
        match self.fetch_profile(auth_token).await {
            Ok(user) => Some(user),
            Err(e) if e.is_unauthorized() => {
                debug!("Profile request unauthorized after retry");
                None
            }
            Err(e) => {
                error!(error = %e, "Profile fetch failed");
                None
            }
        }
    }

    async fn fetch_profile(&self, auth_token: &str) -> Result<AuthUser, UpstreamError> {
        let mut response = self.request_profile(auth_token).await?;

        for attempt in 1..=PROFILE_RETRIES {
            if response.status() != StatusCode::UNAUTHORIZED {
                break;
            }
            warn!(attempt, "Authenticated user unavailable, retrying profile request");
            response = self.request_profile(auth_token).await?;
        }

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        response.json::<AuthUser>().await.map_err(UpstreamError::Decode)
    }

    async fn request_profile(&self, auth_token: &str) -> Result<Response, UpstreamError> {
        let response = self
            .http
            .get(self.profile_url.clone())
            .bearer_auth(auth_token)
            .send()
            .await?;
        Ok(response)
    }

    /// Exchange the refresh token with the auth service.
    ///
    /// Cookies from every `Set-Cookie` header are collected for the caller to
    /// re-issue. If the service can't be reached the result is a 401, so the
    /// visitor is treated exactly like one with an invalid session.
    pub async fn exchange_refresh_token(&self, refresh_token: &str) -> RefreshResponse {
        let result = self
            .http
            .get(self.refresh_url.clone())
            .header(
                header::COOKIE,
                format!("{}={}", REFRESH_COOKIE_NAME, refresh_token),
            )
            .send()
            .await;

        match result {
            Ok(response) => {
                let cookies = response
                    .headers()
                    .get_all(header::SET_COOKIE)
                    .iter()
                    .filter_map(|value| value.to_str().ok())
                    .flat_map(parse_set_cookie)
                    .collect();
                RefreshResponse {
                    status: response.status(),
                    cookies,
                }
            }
            Err(e) => {
                error!(error = %e, "Error refreshing token");
                RefreshResponse::unauthenticated()
            }
        }
    }
}

/// Append a path to the backend URL, keeping any path the backend already has.
fn endpoint(backend_url: &Url, path: &str) -> Result<Url, UpstreamError> {
    let base = backend_url.as_str().trim_end_matches('/');
    Ok(Url::parse(&format!("{}/{}", base, path))?)
}
