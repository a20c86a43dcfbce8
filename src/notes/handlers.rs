use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::{AdminUser, AuthUser, MaybeAuthUser},
    error::ApiError,
    notes::{
        dto::{
            AdminNotesResponse, MessageResponse, NotePayload, NoteResponse, NotesResponse,
            TitleFilter,
        },
        repo::Note,
    },
    state::AppState,
};

pub fn note_routes() -> Router<AppState> {
    Router::new()
        .route("/create-note", post(create_note))
        .route("/get-user-notes", get(get_user_notes))
        .route("/get-note/:id", get(get_note))
        .route("/update-note/:id", patch(update_note))
        .route("/delete-note/:id", delete(delete_note))
        .route("/get-admin-all-notes", get(get_admin_all_notes))
}

fn validate_payload(payload: NotePayload) -> Result<(String, String), ApiError> {
    let title = payload.title.trim().to_string();
    let description = payload.description.trim().to_string();
    if title.is_empty() || description.is_empty() {
        return Err(ApiError::Validation(
            "Please enter title and description".into(),
        ));
    }
    Ok((title, description))
}

#[instrument(skip(state, user, payload))]
pub async fn create_note(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<NotePayload>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let (title, description) = validate_payload(payload)?;
    Note::create(&state.db, user.id, &title, &description)
        .await
        .map_err(ApiError::Internal)?;
    info!(user_id = %user.id, "note created");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::ok("Note created successfully")),
    ))
}

#[instrument(skip(state, user))]
pub async fn get_user_notes(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(filter): Query<TitleFilter>,
) -> Result<Json<NotesResponse>, ApiError> {
    let notes = Note::list_by_owner(&state.db, user.id, filter.title.as_deref())
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(NotesResponse {
        success: true,
        notes,
    }))
}

/// Reads are public by default. With `public_note_reads` off, a bearer token
/// is required and other users' notes hide behind the same 404 as missing
/// ones.
#[instrument(skip(state, caller))]
pub async fn get_note(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<NoteResponse>, ApiError> {
    let note = Note::find_by_id(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound("Note not found".into()))?;

    if !state.config.public_note_reads {
        let user = caller.ok_or_else(|| {
            ApiError::Unauthenticated("Authentication expired, please login".into())
        })?;
        if note.user_id != user.id {
            return Err(ApiError::NotFound("Note not found".into()));
        }
    }

    Ok(Json(NoteResponse {
        success: true,
        note,
    }))
}

#[instrument(skip(state, user, payload))]
pub async fn update_note(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<NotePayload>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (title, description) = validate_payload(payload)?;
    let updated = Note::update_owned(&state.db, user.id, id, &title, &description)
        .await
        .map_err(ApiError::Internal)?;
    if !updated {
        return Err(ApiError::NotFound("Note not found".into()));
    }
    info!(user_id = %user.id, note_id = %id, "note updated");
    Ok(Json(MessageResponse::ok("Note updated successfully")))
}

#[instrument(skip(state, user))]
pub async fn delete_note(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = Note::delete_owned(&state.db, user.id, id)
        .await
        .map_err(ApiError::Internal)?;
    if !deleted {
        return Err(ApiError::NotFound("Note not found".into()));
    }
    info!(user_id = %user.id, note_id = %id, "note deleted");
    Ok(Json(MessageResponse::ok("Note deleted successfully")))
}

#[instrument(skip(state, _admin))]
pub async fn get_admin_all_notes(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(filter): Query<TitleFilter>,
) -> Result<Json<AdminNotesResponse>, ApiError> {
    let notes = Note::list_all(&state.db, filter.title.as_deref())
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(AdminNotesResponse {
        success: true,
        notes,
    }))
}
