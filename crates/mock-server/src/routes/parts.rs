use axum::{
    Router,
    extract::{Json, Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post},
};
use models::{NewPart, Part, UpdatePart};
use tracing::info;

use crate::{error::ApiError, state::MockState};

pub async fn list_parts(State(state): State<MockState>) -> ResponseJson<Vec<Part>> {
    ResponseJson(state.store.read().await.parts.clone())
}

pub async fn get_part(
    State(state): State<MockState>,
    Path(id): Path<String>,
) -> Result<ResponseJson<Part>, ApiError> {
    let mut store = state.store.write().await;
    Ok(ResponseJson(store.part_mut(&id)?.clone()))
}

/// Parts matching the requested ids, in request order. Unknown ids are skipped.
pub async fn batch_parts(
    State(state): State<MockState>,
    Json(ids): Json<Vec<String>>,
) -> ResponseJson<Vec<Part>> {
    let store = state.store.read().await;
    let parts = ids
        .iter()
        .filter_map(|id| store.parts.iter().find(|p| &p.id == id).cloned())
        .collect();
    ResponseJson(parts)
}

pub async fn create_part(
    State(state): State<MockState>,
    Json(payload): Json<NewPart>,
) -> Result<ResponseJson<String>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::InvalidInput("part name is required".into()));
    }
    let mut store = state.store.write().await;
    let id = store.next_id();

    if state.options.link_on_create {
        for exhibit in store
            .exhibits
            .iter_mut()
            .filter(|e| payload.exhibit_ids.contains(&e.id))
        {
            if !exhibit.has_part(&id) {
                exhibit.part_ids.push(id.clone());
            }
        }
    }

    store.parts.push(Part {
        id: id.clone(),
        name: payload.name,
        link: payload.link,
        exhibit_ids: payload.exhibit_ids,
        notes: payload.notes,
    });
    info!(part_id = %id, "Created part");
    Ok(ResponseJson(id))
}

pub async fn update_part(
    State(state): State<MockState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePart>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    let part = store.part_mut(&id)?;
    part.name = payload.name;
    part.link = payload.link;
    part.exhibit_ids = payload.exhibit_ids;
    Ok(StatusCode::OK)
}

pub async fn delete_part(
    State(state): State<MockState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    let before = store.parts.len();
    store.parts.retain(|p| p.id != id);
    if store.parts.len() == before {
        return Err(ApiError::not_found("Part", id));
    }
    for exhibit in &mut store.exhibits {
        exhibit.part_ids.retain(|part_id| *part_id != id);
    }
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<MockState> {
    Router::new()
        .route("/parts", get(list_parts).post(create_part))
        .route("/parts/batch", post(batch_parts))
        .route(
            "/parts/{id}",
            get(get_part).put(update_part).delete(delete_part),
        )
}
