//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::auth::RolePermissions;
use clap::Parser;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};
use url::Url;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "panel-gate",
    about = "Access gate for the panel: session refresh and role-based path checks"
)]
pub struct Args {
    /// Base URL of the auth service (e.g., "http://localhost:3000")
    #[arg(long, env = "URL_BACKEND")]
    pub backend_url: String,

    /// Port to listen on
    #[arg(short, long, default_value = "4321")]
    pub port: u16,

    /// Seconds to wait for each auth service call
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    pub upstream_timeout: u64,

    /// JSON file mapping roles to allowed path prefixes. Uses the built-in table if omitted
    #[arg(long)]
    pub permissions_file: Option<String>,

    /// Set the Secure flag on cookies re-issued from the auth service
    #[arg(long)]
    pub secure_cookies: bool,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Parse and validate the auth service base URL.
/// Returns None and logs an error if validation fails.
pub fn validate_backend_url(backend_url: &str) -> Option<Url> {
    let url = match Url::parse(backend_url) {
        Ok(url) => url,
        Err(e) => {
            error!(url = %backend_url, error = %e, "Invalid backend URL");
            return None;
        }
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        error!(url = %backend_url, "Backend URL must use http or https");
        return None;
    }

    if url.query().is_some() || url.fragment().is_some() {
        error!(url = %backend_url, "Backend URL must not have a query or fragment");
        return None;
    }

    Some(url)
}

/// Load the role permission table from a file, or fall back to the built-in one.
/// Returns None and logs an error if the file cannot be used.
pub fn load_permissions(path: Option<&str>) -> Option<RolePermissions> {
    let Some(path) = path else {
        return Some(RolePermissions::builtin());
    };

    match RolePermissions::load(Path::new(path)) {
        Ok(permissions) => {
            info!(path = %path, roles = permissions.role_count(), "Permissions loaded");
            Some(permissions)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to load permissions");
            None
        }
    }
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    backend_url: Url,
    upstream_timeout_secs: u64,
    permissions: RolePermissions,
    secure_cookies: bool,
) -> ServerConfig {
    ServerConfig {
        backend_url,
        upstream_timeout: Duration::from_secs(upstream_timeout_secs),
        permissions,
        secure_cookies,
    }
}
