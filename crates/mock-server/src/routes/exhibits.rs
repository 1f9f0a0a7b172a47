use axum::{
    Router,
    extract::{Json, Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post},
};
use models::{AddPartRequest, Exhibit, ExhibitStatus, NewExhibit, StatusChange, UpdateExhibit};
use tracing::info;

use crate::{error::ApiError, state::MockState};

pub async fn list_exhibits(State(state): State<MockState>) -> ResponseJson<Vec<Exhibit>> {
    ResponseJson(state.store.read().await.exhibits.clone())
}

pub async fn get_exhibit(
    State(state): State<MockState>,
    Path(id): Path<String>,
) -> Result<ResponseJson<Exhibit>, ApiError> {
    let mut store = state.store.write().await;
    Ok(ResponseJson(store.exhibit_mut(&id)?.clone()))
}

pub async fn random_exhibit(
    State(state): State<MockState>,
) -> Result<ResponseJson<Exhibit>, ApiError> {
    state
        .store
        .write()
        .await
        .random_exhibit()
        .map(ResponseJson)
        .ok_or_else(|| ApiError::not_found("Exhibit", "random"))
}

pub async fn create_exhibit(
    State(state): State<MockState>,
    Json(payload): Json<NewExhibit>,
) -> Result<ResponseJson<String>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::InvalidInput("exhibit name is required".into()));
    }
    let mut store = state.store.write().await;
    let id = store.next_id();
    store.exhibits.push(Exhibit {
        id: id.clone(),
        name: payload.name,
        cluster: payload.cluster,
        location: payload.location,
        status: payload.status,
        part_ids: payload.part_ids,
        notes: payload.notes,
        image_url: payload.image_url,
        sponsorship: payload.sponsorship,
    });
    info!(exhibit_id = %id, "Created exhibit");
    Ok(ResponseJson(id))
}

pub async fn update_exhibit(
    State(state): State<MockState>,
    Path(id): Path<String>,
    Json(changes): Json<UpdateExhibit>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    let exhibit = store.exhibit_mut(&id)?;
    if let Some(name) = changes.name {
        exhibit.name = name;
    }
    if let Some(cluster) = changes.cluster {
        exhibit.cluster = cluster;
    }
    if let Some(location) = changes.location {
        exhibit.location = location;
    }
    if let Some(image_url) = changes.image_url {
        exhibit.image_url = Some(image_url);
    }
    Ok(StatusCode::OK)
}

pub async fn delete_exhibit(
    State(state): State<MockState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    let before = store.exhibits.len();
    store.exhibits.retain(|e| e.id != id);
    if store.exhibits.len() == before {
        return Err(ApiError::not_found("Exhibit", id));
    }
    for part in &mut store.parts {
        part.exhibit_ids.retain(|exhibit_id| *exhibit_id != id);
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_part(
    State(state): State<MockState>,
    Path(id): Path<String>,
    Json(payload): Json<AddPartRequest>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    store.part_mut(&payload.part_id)?;
    let exhibit = store.exhibit_mut(&id)?;
    if !exhibit.has_part(&payload.part_id) {
        exhibit.part_ids.push(payload.part_id.clone());
    }
    let part = store.part_mut(&payload.part_id)?;
    if !part.belongs_to(&id) {
        part.exhibit_ids.push(id.clone());
    }
    Ok(StatusCode::OK)
}

pub async fn change_status(
    State(state): State<MockState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusChange<ExhibitStatus>>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    store.exhibit_mut(&id)?.status = payload.new_status;
    Ok(StatusCode::OK)
}

pub fn router() -> Router<MockState> {
    Router::new()
        .route("/exhibits", get(list_exhibits).post(create_exhibit))
        .route("/exhibits/random", get(random_exhibit))
        .route(
            "/exhibits/{id}",
            get(get_exhibit).put(update_exhibit).delete(delete_exhibit),
        )
        .route("/exhibits/{id}/add_part", post(add_part))
        .route("/exhibits/{id}/status", post(change_status))
}
