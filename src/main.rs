// Main entry point - Dependency injection and dashboard host setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::refresh_coordinator::{RefreshCoordinator, RefreshIntervals};
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_api::HttpDashboardApi;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    current_view, health_check, refresh_charts, set_focus, set_visibility, task_status,
};
use crate::presentation::page_view::PageView;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (RUST_LOG, default info)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Backend client (infrastructure layer)
    let api = Arc::new(HttpDashboardApi::new(
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_secs),
    )?);

    // Rendered page and coordinator (application layer)
    let page = Arc::new(PageView::new());
    let coordinator =
        RefreshCoordinator::new(api, page.clone(), RefreshIntervals::from(&config.refresh));
    coordinator.start();

    let state = Arc::new(AppState {
        coordinator: coordinator.clone(),
        page,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/view", get(current_view))
        .route("/status", get(task_status))
        .route("/visibility", post(set_visibility))
        .route("/focus", post(set_focus))
        .route("/charts", post(refresh_charts))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config.server.listen.parse()?;
    tracing::info!(
        %addr,
        backend = %config.api.base_url,
        "Starting pitchside dashboard host"
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    coordinator.destroy();
    tracing::info!("Dashboard host stopped");

    Ok(())
}
