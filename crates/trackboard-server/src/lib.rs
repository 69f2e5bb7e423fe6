#![doc = include_str!("../../../docs/trackboard-server.md")]
//! trackboard-server: Axum web server rendering the dashboard and a
//! read-only JSON API.

pub mod api;
pub mod chart;
pub mod dashboard;
pub mod html;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use trackboard_core::{DashContext, MlflowClient};

use crate::state::AppState;

pub use state::ServerConfig;

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(dashboard::dashboard))
        // API routes
        .nest("/api", api::router())
        // Static assets embedded in the binary
        .fallback(api::serve_assets)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Connect to the tracking service and start the server on the configured
/// address. Fails before binding if the tracking service cannot be reached.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let dashboard = config.dashboard.clone();
    let client = tokio::task::spawn_blocking(move || -> trackboard_core::Result<MlflowClient> {
        let client = MlflowClient::new(&dashboard)?;
        client.probe()?;
        Ok(client)
    })
    .await??;
    info!(tracking_uri = %config.dashboard.tracking_uri, "tracking service reachable");

    let ctx = DashContext::from_config(Arc::new(client), &config.dashboard);
    let state = AppState::new(ctx).with_tracking_uri(config.dashboard.tracking_uri.as_str());
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Trackboard dashboard at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutting down"),
        Err(err) => {
            warn!(error = %err, "cannot listen for ctrl-c, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
