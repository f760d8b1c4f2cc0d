//! JSON REST API for Quill.
//!
//! Exposes an axum [`Router`] backed by any store implementing
//! [`NoteStore`] and [`AccountStore`]. TLS, CORS and tracing layers are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", quill_api::api_router(state))
//! ```

pub mod accounts;
pub mod auth;
pub mod error;
pub mod extract;
pub mod notes;
pub mod versions;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use quill_core::{
  note::Page,
  store::{AccountStore, NoteStore},
};
pub use error::ApiError;

// ─── Paging ───────────────────────────────────────────────────────────────────

/// Limits applied to `?skip=&limit=` on list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
  /// Used when the client omits `limit`.
  pub default_limit: usize,
  /// Larger requested limits are clamped to this value.
  pub max_limit:     usize,
}

impl Paging {
  pub fn page(&self, skip: usize, limit: Option<usize>) -> quill_core::Result<Page> {
    let limit = limit.unwrap_or(self.default_limit).min(self.max_limit);
    Page::new(skip, limit)
  }
}

impl Default for Paging {
  fn default() -> Self {
    Self { default_limit: Page::DEFAULT_LIMIT, max_limit: 1000 }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub paging: Paging,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), paging: self.paging }
  }
}

impl<S> AppState<S> {
  pub fn new(store: S) -> Self {
    Self { store: Arc::new(store), paging: Paging::default() }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: NoteStore + AccountStore + 'static,
{
  Router::new()
    // Accounts
    .route("/auth/register", post(accounts::register::<S>))
    .route("/auth/login", post(accounts::login::<S>))
    // Notes
    .route("/notes", get(notes::list::<S>).post(notes::create::<S>))
    .route(
      "/notes/{id}",
      get(notes::get_one::<S>)
        .put(notes::update::<S>)
        .delete(notes::delete::<S>),
    )
    // Versions
    .route("/notes/{id}/versions", get(versions::list::<S>))
    .route("/notes/{id}/versions/{version_id}", get(versions::get_one::<S>))
    .route(
      "/notes/{id}/versions/{version_id}/restore",
      post(versions::restore::<S>),
    )
    .with_state(state)
}

#[cfg(test)]
mod tests;
