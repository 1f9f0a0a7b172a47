//! Bug reports and the development-only seed/reset endpoints.

use axum::{
    Router,
    extract::{Json, State},
    http::StatusCode,
    routing::{get, post},
};
use models::BugReport;
use tracing::info;

use crate::{error::ApiError, seed, state::MockState};

pub async fn report_bug(
    State(state): State<MockState>,
    Json(report): Json<BugReport>,
) -> Result<StatusCode, ApiError> {
    if report.title.trim().is_empty() {
        return Err(ApiError::InvalidInput("bug report title is required".into()));
    }
    info!(reporter = %report.name, title = %report.title, "Received bug report");
    state.store.write().await.bug_reports.push(report);
    Ok(StatusCode::OK)
}

pub async fn create_dummy_exhibits(State(state): State<MockState>) -> StatusCode {
    let mut store = state.store.write().await;
    seed::populate(&mut store);
    info!(
        exhibits = store.exhibits.len(),
        parts = store.parts.len(),
        jotforms = store.jotforms.len(),
        "Seeded dummy data"
    );
    StatusCode::OK
}

pub async fn reset(State(state): State<MockState>) -> StatusCode {
    state.store.write().await.clear();
    info!("Cleared all tables");
    StatusCode::OK
}

pub fn router() -> Router<MockState> {
    Router::new()
        .route("/report-bug", post(report_bug))
        .route("/create-dummy-exhibits", get(create_dummy_exhibits))
        .route("/reset", get(reset))
}
