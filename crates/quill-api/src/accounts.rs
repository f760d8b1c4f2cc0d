//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/register` | Body: `{"email","username","password","password2"}`; returns 201 |
//! | `POST` | `/auth/login` | Body: `{"username","password"}`; 401 on bad credentials |
//!
//! No tokens are issued: every other endpoint takes HTTP Basic credentials.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use quill_core::{
  account::{Account, NewAccount, Registration},
  store::AccountStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::{authenticate, hash_password},
  error::{ApiError, store_error},
  extract::ApiJson,
};

/// Response body for both registration and login.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
  pub message: &'static str,
  pub user:    Account,
}

// ─── Register ─────────────────────────────────────────────────────────────────

/// `POST /auth/register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<Registration>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AccountStore + 'static,
{
  body.validate()?;

  let password = body.password;
  let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
    .await
    .map_err(|e| ApiError::Internal(Box::new(e)))?
    .map_err(|e| ApiError::Internal(e.to_string().into()))?;

  let user = state
    .store
    .create_account(NewAccount {
      username: body.username,
      email: body.email,
      password_hash,
    })
    .await
    .map_err(store_error)?;

  Ok((
    StatusCode::CREATED,
    Json(AccountResponse { message: "User registered successfully", user }),
  ))
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

/// `POST /auth/login` — checks credentials and returns the account.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<LoginBody>,
) -> Result<Json<AccountResponse>, ApiError>
where
  S: AccountStore + 'static,
{
  let user = authenticate(state.store.as_ref(), &body.username, &body.password).await?;
  Ok(Json(AccountResponse { message: "Login successful", user }))
}
