use axum::{
    Router,
    extract::{Json, Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post},
};
use models::{Jotform, JotformStatus, StatusChange};
use tracing::info;

use crate::{error::ApiError, state::MockState};

pub async fn list_jotforms(State(state): State<MockState>) -> ResponseJson<Vec<Jotform>> {
    ResponseJson(state.store.read().await.jotforms.clone())
}

pub async fn get_jotform(
    State(state): State<MockState>,
    Path(id): Path<String>,
) -> Result<ResponseJson<Jotform>, ApiError> {
    let mut store = state.store.write().await;
    Ok(ResponseJson(store.jotform_mut(&id)?.clone()))
}

pub async fn change_status(
    State(state): State<MockState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusChange<JotformStatus>>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    let jotform = store.jotform_mut(&id)?;
    info!(jotform_id = %id, from = %jotform.status, to = %payload.new_status, "Jotform status changed");
    jotform.status = payload.new_status;
    Ok(StatusCode::OK)
}

pub async fn delete_jotform(
    State(state): State<MockState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    let before = store.jotforms.len();
    store.jotforms.retain(|j| j.id != id);
    if store.jotforms.len() == before {
        return Err(ApiError::not_found("Jotform", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<MockState> {
    Router::new()
        .route("/jotforms", get(list_jotforms))
        .route("/jotforms/{id}", get(get_jotform).delete(delete_jotform))
        .route("/jotforms/{id}/status", post(change_status))
}
