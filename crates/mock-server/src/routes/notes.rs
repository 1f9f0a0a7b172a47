//! Note sub-resources, shared by exhibits and parts.

use axum::{
    Router,
    extract::{Json, Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use chrono::Local;
use models::{NewNote, Note, NoteOwner, NoteTimestamp};

use crate::{error::ApiError, state::MockState};

async fn list(state: &MockState, owner: NoteOwner) -> Result<ResponseJson<Vec<Note>>, ApiError> {
    let mut store = state.store.write().await;
    Ok(ResponseJson(store.notes_mut(&owner)?.clone()))
}

async fn get_one(
    state: &MockState,
    owner: NoteOwner,
    note_id: String,
) -> Result<ResponseJson<Note>, ApiError> {
    let mut store = state.store.write().await;
    store
        .notes_mut(&owner)?
        .iter()
        .find(|n| n.id == note_id)
        .cloned()
        .map(ResponseJson)
        .ok_or_else(|| ApiError::not_found("Note", note_id))
}

async fn create(state: &MockState, owner: NoteOwner, payload: NewNote) -> Result<StatusCode, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(ApiError::InvalidInput("note message is required".into()));
    }
    let mut store = state.store.write().await;
    let id = store.next_id();
    let now = Local::now();
    store.notes_mut(&owner)?.push(Note {
        id,
        timestamp: NoteTimestamp::new(
            now.format("%Y-%m-%d").to_string(),
            now.format("%H:%M:%S").to_string(),
        ),
        submitter: payload.submitter,
        message: payload.message,
    });
    Ok(StatusCode::OK)
}

async fn delete(state: &MockState, owner: NoteOwner, note_id: String) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    let notes = store.notes_mut(&owner)?;
    let before = notes.len();
    notes.retain(|n| n.id != note_id);
    if notes.len() == before {
        return Err(ApiError::not_found("Note", note_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_exhibit_notes(
    State(state): State<MockState>,
    Path(id): Path<String>,
) -> Result<ResponseJson<Vec<Note>>, ApiError> {
    list(&state, NoteOwner::exhibit(id)).await
}

pub async fn create_exhibit_note(
    State(state): State<MockState>,
    Path(id): Path<String>,
    Json(payload): Json<NewNote>,
) -> Result<StatusCode, ApiError> {
    create(&state, NoteOwner::exhibit(id), payload).await
}

pub async fn get_exhibit_note(
    State(state): State<MockState>,
    Path((id, note_id)): Path<(String, String)>,
) -> Result<ResponseJson<Note>, ApiError> {
    get_one(&state, NoteOwner::exhibit(id), note_id).await
}

pub async fn delete_exhibit_note(
    State(state): State<MockState>,
    Path((id, note_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    delete(&state, NoteOwner::exhibit(id), note_id).await
}

pub async fn list_part_notes(
    State(state): State<MockState>,
    Path(id): Path<String>,
) -> Result<ResponseJson<Vec<Note>>, ApiError> {
    list(&state, NoteOwner::part(id)).await
}

pub async fn create_part_note(
    State(state): State<MockState>,
    Path(id): Path<String>,
    Json(payload): Json<NewNote>,
) -> Result<StatusCode, ApiError> {
    create(&state, NoteOwner::part(id), payload).await
}

pub async fn get_part_note(
    State(state): State<MockState>,
    Path((id, note_id)): Path<(String, String)>,
) -> Result<ResponseJson<Note>, ApiError> {
    get_one(&state, NoteOwner::part(id), note_id).await
}

pub async fn delete_part_note(
    State(state): State<MockState>,
    Path((id, note_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    delete(&state, NoteOwner::part(id), note_id).await
}

pub fn router() -> Router<MockState> {
    Router::new()
        .route(
            "/exhibits/{id}/notes",
            get(list_exhibit_notes).post(create_exhibit_note),
        )
        .route(
            "/exhibits/{id}/notes/{note_id}",
            get(get_exhibit_note).delete(delete_exhibit_note),
        )
        .route(
            "/parts/{id}/notes",
            get(list_part_notes).post(create_part_note),
        )
        .route(
            "/parts/{id}/notes/{note_id}",
            get(get_part_note).delete(delete_part_note),
        )
}
