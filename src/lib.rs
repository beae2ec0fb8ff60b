pub mod auth;
pub mod cli;
pub mod gate;
pub mod pages;
pub mod upstream;

use auth::{RolePermissions, UpstreamError};
use axum::{Router, middleware, routing::get};
use gate::{GateState, access_gate};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use upstream::UpstreamClient;
use url::Url;

pub struct ServerConfig {
    /// Base URL of the auth service (profile and refresh endpoints live below it)
    pub backend_url: Url,
    /// Timeout applied to each auth service call
    pub upstream_timeout: Duration,
    /// Role allow-list for `/panel` paths
    pub permissions: RolePermissions,
    /// Whether to set Secure flag on cookies re-issued from the auth service
    pub secure_cookies: bool,
}

/// Build the gate state from the configuration.
pub fn create_gate_state(config: &ServerConfig) -> Result<GateState, UpstreamError> {
    let upstream = UpstreamClient::new(&config.backend_url, config.upstream_timeout)?;
    Ok(GateState {
        upstream,
        permissions: Arc::new(config.permissions.clone()),
        secure_cookies: config.secure_cookies,
    })
}

/// Create the application router with every route behind the access gate.
pub fn create_app(config: &ServerConfig) -> Result<Router, UpstreamError> {
    let state = create_gate_state(config)?;

    let panel_subpaths = format!("{}/{{*path}}", gate::PANEL_PREFIX);

    let router = Router::new()
        .route("/", get(pages::root))
        .route(gate::LOGIN_PATH, get(pages::login_page))
        .route(gate::PANEL_PREFIX, get(pages::panel_page))
        .route(&panel_subpaths, get(pages::panel_page))
        .fallback(pages::not_found)
        .layer(middleware::from_fn_with_state(state, access_gate));

    Ok(router)
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(app: Router, listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}
