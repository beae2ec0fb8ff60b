use clap::Parser;
use panel_gate::cli::{Args, build_config, init_logging, load_permissions, validate_backend_url};
use panel_gate::{create_app, run_server};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(backend_url) = validate_backend_url(&args.backend_url) else {
        std::process::exit(1);
    };

    let Some(permissions) = load_permissions(args.permissions_file.as_deref()) else {
        std::process::exit(1);
    };

    let config = build_config(
        backend_url,
        args.upstream_timeout,
        permissions,
        args.secure_cookies,
    );

    let app = create_app(&config).unwrap_or_else(|e| {
        error!(error = %e, "Failed to create auth service client");
        std::process::exit(1);
    });

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    match listener.local_addr() {
        Ok(local_addr) => info!(address = %local_addr, backend = %config.backend_url, "Listening"),
        Err(e) => error!(error = %e, "Failed to read local address"),
    }

    if let Err(e) = run_server(app, listener).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
