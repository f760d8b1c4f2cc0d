//! Error type for `quill-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] quill_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored value is outside the range the domain allows.
  #[error("corrupt row: {0}")]
  Corrupt(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Domain errors pass through untouched; everything else is a persistence
/// failure as far as callers are concerned.
impl From<Error> for quill_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => core,
      other => quill_core::Error::Persistence(Box::new(other)),
    }
  }
}
