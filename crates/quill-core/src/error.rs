//! Error taxonomy shared by every Quill crate.
//!
//! Storage backends convert their own errors into this type so that the HTTP
//! layer can map them onto responses without knowing the backend.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// The note does not exist, or it is not owned by the requester. The two
  /// cases are never distinguished.
  #[error("note not found: {0}")]
  NoteNotFound(Uuid),

  /// The version does not exist, or it belongs to a different note.
  #[error("version not found: {0}")]
  VersionNotFound(Uuid),

  #[error("validation failed: {0}")]
  Validation(String),

  /// The store is unavailable or the transaction was aborted.
  #[error("persistence failure: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::NoteNotFound(_) | Self::VersionNotFound(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
