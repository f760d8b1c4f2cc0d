//! The `NoteStore` and `AccountStore` traits.
//!
//! The traits are implemented by storage backends (e.g. `quill-store-sqlite`).
//! Higher layers (`quill-api`, `quill-server`) depend on this abstraction, not
//! on any concrete backend.
//!
//! Every note-scoped operation takes the requesting account's id and resolves
//! the note with that id as part of the same lookup. A note owned by someone
//! else is reported exactly like a note that does not exist.

use std::future::Future;

use uuid::Uuid;

use crate::{
  account::{Account, Credentials, NewAccount},
  note::{Note, NoteDraft, NoteVersion, Page},
};

/// Shared error plumbing for store backends.
///
/// Backends keep their own error type but must be able to express it in the
/// core taxonomy, so callers can tell "not found" apart from a persistence
/// failure without knowing the backend.
pub trait Store: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;
}

// ─── Notes ───────────────────────────────────────────────────────────────────

/// Abstraction over the note and version ledger.
///
/// Versions are append-only. They are written only as a side effect of
/// [`update_note`](NoteStore::update_note) and
/// [`restore_version`](NoteStore::restore_version), each of which snapshots
/// the pre-mutation state and applies the mutation in one atomic unit.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait NoteStore: Store {
  // ── Current state ─────────────────────────────────────────────────────

  /// Create a note owned by `owner_id`, with an empty version history.
  fn create_note(
    &self,
    owner_id: Uuid,
    draft: NoteDraft,
  ) -> impl Future<Output = Result<Note, Self::Error>> + Send + '_;

  /// Fetch a note owned by `requester_id`.
  fn get_note(
    &self,
    note_id: Uuid,
    requester_id: Uuid,
  ) -> impl Future<Output = Result<Note, Self::Error>> + Send + '_;

  /// List the notes owned by `owner_id`, oldest first.
  fn list_notes(
    &self,
    owner_id: Uuid,
    page: Page,
  ) -> impl Future<Output = Result<Vec<Note>, Self::Error>> + Send + '_;

  /// Delete a note and every version recorded for it.
  fn delete_note(
    &self,
    note_id: Uuid,
    requester_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Versioned mutations ───────────────────────────────────────────────

  /// Snapshot the note's current state as the next version, then replace
  /// its title and content with `draft`. Returns the updated note.
  fn update_note(
    &self,
    note_id: Uuid,
    requester_id: Uuid,
    draft: NoteDraft,
  ) -> impl Future<Output = Result<Note, Self::Error>> + Send + '_;

  /// Snapshot the note's current state as the next version, then copy the
  /// title and content of `version_id` back onto the note. Returns the
  /// restored note.
  fn restore_version(
    &self,
    note_id: Uuid,
    version_id: Uuid,
    requester_id: Uuid,
  ) -> impl Future<Output = Result<Note, Self::Error>> + Send + '_;

  // ── History ───────────────────────────────────────────────────────────

  /// All versions of a note, most recent (highest number) first.
  fn list_versions(
    &self,
    note_id: Uuid,
    requester_id: Uuid,
  ) -> impl Future<Output = Result<Vec<NoteVersion>, Self::Error>> + Send + '_;

  /// A single version, which must belong to `note_id`.
  fn get_version(
    &self,
    note_id: Uuid,
    version_id: Uuid,
    requester_id: Uuid,
  ) -> impl Future<Output = Result<NoteVersion, Self::Error>> + Send + '_;
}

// ─── Accounts ────────────────────────────────────────────────────────────────

/// Abstraction over account persistence, used for registration and identity
/// resolution.
pub trait AccountStore: Store {
  /// Persist a new account. Fails with a validation error if the email or
  /// username is already registered.
  fn create_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  /// Look up an account and its password hash by exact username.
  fn find_credentials<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + 'a;
}
