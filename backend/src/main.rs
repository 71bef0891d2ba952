use std::{process::ExitCode, sync::Arc};

use axum::http::HeaderValue;
use taskdeck_server::{
    app_state::{AppState, SharedState},
    data_access::data_context::DataContext,
    map_routes,
    settings::Settings,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // ── Configuration ──────────────────────────────────────────
    let _ = dotenvy::dotenv();
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load settings: {e}");
            return ExitCode::FAILURE;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &settings.loaded_from {
        Some(path) => tracing::info!(path = %path.display(), "settings loaded"),
        None => tracing::warn!("no settings file found, using defaults"),
    }

    let addr = match settings.socket_addr() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(error = %e, "invalid listen address");
            return ExitCode::FAILURE;
        }
    };

    // ── Store ──────────────────────────────────────────────────
    let data_context = match DataContext::open(&settings.database_path) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!(path = %settings.database_path, error = %e, "database connection failed");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(path = %settings.database_path, "database opened");

    // ── Shared state ───────────────────────────────────────────
    let state: SharedState = Arc::new(AppState { data_context });

    // ── Router ─────────────────────────────────────────────────
    let app = map_routes(state)
        .fallback_service(ServeDir::new(&settings.static_dir).append_index_html_on_directories(true))
        .layer(cors_layer(&settings))
        .layer(TraceLayer::new_for_http());

    // ── Start ──────────────────────────────────────────────────
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Server running on http://{addr}");
    tracing::info!("  API:    http://{addr}/api");
    tracing::info!("  Health: http://{addr}/api/health");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }

    tracing::info!("server stopped");
    ExitCode::SUCCESS
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match settings.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => layer.allow_origin(origin),
        Some(Err(_)) => {
            tracing::warn!("frontend_url is not a valid origin, allowing any origin");
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
