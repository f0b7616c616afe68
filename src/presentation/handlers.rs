// HTTP request handlers
use crate::application::refresh_coordinator::{RefreshOutcome, TaskStatus};
use crate::presentation::app_state::AppState;
use crate::presentation::page_view::PageState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct VisibilityChange {
    pub visible: bool,
}

#[derive(Deserialize)]
pub struct FocusChange {
    pub focused: bool,
}

#[derive(Deserialize)]
pub struct PeriodQuery {
    pub period: Option<u32>,
}

#[derive(Serialize)]
pub struct ChartRefreshResponse {
    pub period: u32,
    pub outcome: &'static str,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// The page as currently rendered
pub async fn current_view(State(state): State<Arc<AppState>>) -> Json<PageState> {
    Json(state.page.snapshot())
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub running: bool,
    pub tasks: Vec<TaskStatus>,
}

/// Per-task scheduling status
pub async fn task_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: state.coordinator.is_running(),
        tasks: state.coordinator.status(),
    })
}

pub async fn set_visibility(
    State(state): State<Arc<AppState>>,
    Json(change): Json<VisibilityChange>,
) -> StatusCode {
    tracing::debug!(visible = change.visible, "Page visibility changed");
    state.coordinator.set_visibility(change.visible);
    StatusCode::NO_CONTENT
}

pub async fn set_focus(
    State(state): State<Arc<AppState>>,
    Json(change): Json<FocusChange>,
) -> StatusCode {
    tracing::debug!(focused = change.focused, "Window focus changed");
    state.coordinator.set_focus(change.focused);
    StatusCode::NO_CONTENT
}

/// Redraw charts for a new period (days)
pub async fn refresh_charts(
    Query(query): Query<PeriodQuery>,
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ChartRefreshResponse>) {
    let period = query
        .period
        .unwrap_or_else(|| state.coordinator.chart_period_days());
    let outcome = state.coordinator.refresh_charts(period).await;

    let (status, label) = match outcome {
        RefreshOutcome::Applied => (StatusCode::OK, "applied"),
        RefreshOutcome::Failed => (StatusCode::BAD_GATEWAY, "failed"),
        RefreshOutcome::Skipped => (StatusCode::CONFLICT, "skipped"),
        RefreshOutcome::Discarded => (StatusCode::CONFLICT, "discarded"),
    };

    (
        status,
        Json(ChartRefreshResponse {
            period,
            outcome: label,
        }),
    )
}
