//! Handlers for `/notes/:id/versions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/notes/:id/versions` | Most recent first |
//! | `GET`  | `/notes/:id/versions/:version_id` | 404 unless the version belongs to the note |
//! | `POST` | `/notes/:id/versions/:version_id/restore` | Returns the restored note |

use axum::{Json, extract::State};
use quill_core::{
  note::{Note, NoteVersion},
  store::{AccountStore, NoteStore},
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::Principal,
  error::{ApiError, store_error},
  extract::ApiPath,
};

/// `GET /notes/:id/versions`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Principal(requester): Principal,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<NoteVersion>>, ApiError>
where
  S: NoteStore + AccountStore + 'static,
{
  let versions = state
    .store
    .list_versions(id, requester)
    .await
    .map_err(store_error)?;
  Ok(Json(versions))
}

/// `GET /notes/:id/versions/:version_id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Principal(requester): Principal,
  ApiPath((id, version_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<NoteVersion>, ApiError>
where
  S: NoteStore + AccountStore + 'static,
{
  let version = state
    .store
    .get_version(id, version_id, requester)
    .await
    .map_err(store_error)?;
  Ok(Json(version))
}

/// `POST /notes/:id/versions/:version_id/restore`
///
/// The state being replaced is itself recorded as a new version first.
pub async fn restore<S>(
  State(state): State<AppState<S>>,
  Principal(requester): Principal,
  ApiPath((id, version_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<Note>, ApiError>
where
  S: NoteStore + AccountStore + 'static,
{
  let note = state
    .store
    .restore_version(id, version_id, requester)
    .await
    .map_err(store_error)?;
  Ok(Json(note))
}
