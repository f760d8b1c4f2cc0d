//! Handlers for `/notes` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/notes` | Optional `?skip=&limit=`; the requester's notes only |
//! | `POST`   | `/notes` | Body: `{"title":"…","content":"…"}`; returns 201 |
//! | `GET`    | `/notes/:id` | 404 if absent or owned by someone else |
//! | `PUT`    | `/notes/:id` | Body as for `POST`; records the previous state as a version |
//! | `DELETE` | `/notes/:id` | Removes the note and its history; returns 204 |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use quill_core::{
  note::{Note, NoteDraft},
  store::{AccountStore, NoteStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  auth::Principal,
  error::{ApiError, store_error},
  extract::{ApiJson, ApiPath, ApiQuery},
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub skip:  usize,
  pub limit: Option<usize>,
}

/// `GET /notes[?skip=<n>][&limit=<n>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Principal(requester): Principal,
  ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<Note>>, ApiError>
where
  S: NoteStore + AccountStore + 'static,
{
  let page = state.paging.page(params.skip, params.limit)?;
  let notes = state
    .store
    .list_notes(requester, page)
    .await
    .map_err(store_error)?;
  Ok(Json(notes))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /notes` — returns 201 + the stored note.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Principal(requester): Principal,
  ApiJson(draft): ApiJson<NoteDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NoteStore + AccountStore + 'static,
{
  let note = state
    .store
    .create_note(requester, draft)
    .await
    .map_err(store_error)?;
  Ok((StatusCode::CREATED, Json(note)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /notes/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Principal(requester): Principal,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Note>, ApiError>
where
  S: NoteStore + AccountStore + 'static,
{
  let note = state
    .store
    .get_note(id, requester)
    .await
    .map_err(store_error)?;
  Ok(Json(note))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /notes/:id` — replaces title and content, returns the updated note.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Principal(requester): Principal,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(draft): ApiJson<NoteDraft>,
) -> Result<Json<Note>, ApiError>
where
  S: NoteStore + AccountStore + 'static,
{
  let note = state
    .store
    .update_note(id, requester, draft)
    .await
    .map_err(store_error)?;
  Ok(Json(note))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /notes/:id`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Principal(requester): Principal,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: NoteStore + AccountStore + 'static,
{
  state
    .store
    .delete_note(id, requester)
    .await
    .map_err(store_error)?;
  Ok(StatusCode::NO_CONTENT)
}
