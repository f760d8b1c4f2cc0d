//! [`SqliteStore`] — the SQLite implementation of [`NoteStore`] and
//! [`AccountStore`].

use std::path::Path;

use chrono::{SubsecRound as _, Utc};
use quill_core::{
  account::{Account, Credentials, NewAccount},
  note::{Note, NoteDraft, NoteVersion, Page},
  store::{AccountStore, NoteStore, Store},
};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use crate::{
  encode::{
    encode_dt, encode_uuid, RawAccount, RawNote, RawVersion, ACCOUNT_COLUMNS,
    NOTE_COLUMNS, VERSION_COLUMNS,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Quill note store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  #[cfg(test)]
  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Lookups ─────────────────────────────────────────────────────────────────

/// Result of a lookup that can miss on the note or on one of its versions.
enum Lookup<T> {
  Found(T),
  NoteMissing,
  VersionMissing,
}

impl<T> Lookup<T> {
  fn resolve(self, note_id: Uuid, version_id: Uuid) -> Result<T> {
    match self {
      Lookup::Found(t) => Ok(t),
      Lookup::NoteMissing => Err(quill_core::Error::NoteNotFound(note_id).into()),
      Lookup::VersionMissing => {
        Err(quill_core::Error::VersionNotFound(version_id).into())
      }
    }
  }
}

/// Resolve a note id for `owner_id`. Ownership is part of the predicate, so a
/// note owned by someone else is simply absent.
fn owned_note(
  conn:     &rusqlite::Connection,
  note_id:  &str,
  owner_id: &str,
) -> rusqlite::Result<Option<RawNote>> {
  conn
    .query_row(
      &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE note_id = ?1 AND owner_id = ?2"),
      rusqlite::params![note_id, owner_id],
      RawNote::from_row,
    )
    .optional()
}

/// Fetch a version by id, only if it belongs to `note_id`.
fn note_version(
  conn:       &rusqlite::Connection,
  note_id:    &str,
  version_id: &str,
) -> rusqlite::Result<Option<RawVersion>> {
  conn
    .query_row(
      &format!(
        "SELECT {VERSION_COLUMNS} FROM note_versions WHERE version_id = ?1 AND note_id = ?2"
      ),
      rusqlite::params![version_id, note_id],
      RawVersion::from_row,
    )
    .optional()
}

// ─── Versioning steps ────────────────────────────────────────────────────────

/// Append `note`'s current title and content as the next version and return
/// the number it was given.
///
/// The number is derived from the history length read inside `tx`, which must
/// be an immediate transaction that goes on to mutate the note.
fn append_snapshot(
  tx:        &rusqlite::Transaction<'_>,
  note:      &RawNote,
  editor_id: &str,
  at:        &str,
) -> rusqlite::Result<i64> {
  let count: i64 = tx.query_row(
    "SELECT COUNT(*) FROM note_versions WHERE note_id = ?1",
    rusqlite::params![note.note_id],
    |row| row.get(0),
  )?;
  let next = count + 1;

  tx.execute(
    "INSERT INTO note_versions (
       version_id, note_id, version_number, title, content, editor_id, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    rusqlite::params![
      encode_uuid(Uuid::new_v4()),
      note.note_id,
      next,
      note.title,
      note.content,
      editor_id,
      at,
    ],
  )?;

  Ok(next)
}

/// Replace a note's title and content and return the row as stored.
fn overwrite_note(
  tx:      &rusqlite::Transaction<'_>,
  note_id: &str,
  title:   &str,
  content: &str,
  at:      &str,
) -> rusqlite::Result<RawNote> {
  tx.execute(
    "UPDATE notes SET title = ?2, content = ?3, updated_at = ?4 WHERE note_id = ?1",
    rusqlite::params![note_id, title, content, at],
  )?;
  tx.query_row(
    &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE note_id = ?1"),
    rusqlite::params![note_id],
    RawNote::from_row,
  )
}

fn sql_count(n: usize) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

// ─── NoteStore impl ──────────────────────────────────────────────────────────

impl Store for SqliteStore {
  type Error = Error;
}

impl NoteStore for SqliteStore {
  // ── Current state ─────────────────────────────────────────────────────────

  async fn create_note(&self, owner_id: Uuid, draft: NoteDraft) -> Result<Note> {
    // Truncated to the stored precision so the returned note equals a re-read.
    let now = Utc::now().trunc_subsecs(6);
    let note = Note {
      note_id:    Uuid::new_v4(),
      title:      draft.title,
      content:    draft.content,
      owner_id,
      created_at: now,
      updated_at: now,
    };

    let id_str    = encode_uuid(note.note_id);
    let owner_str = encode_uuid(owner_id);
    let at_str    = encode_dt(now);
    let title     = note.title.clone();
    let content   = note.content.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notes (note_id, owner_id, title, content, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![id_str, owner_str, title, content, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(note_id = %note.note_id, %owner_id, "note created");
    Ok(note)
  }

  async fn get_note(&self, note_id: Uuid, requester_id: Uuid) -> Result<Note> {
    let note_str      = encode_uuid(note_id);
    let requester_str = encode_uuid(requester_id);

    let raw: Option<RawNote> = self
      .conn
      .call(move |conn| Ok(owned_note(conn, &note_str, &requester_str)?))
      .await?;

    raw
      .ok_or(quill_core::Error::NoteNotFound(note_id))?
      .into_note()
  }

  async fn list_notes(&self, owner_id: Uuid, page: Page) -> Result<Vec<Note>> {
    let owner_str  = encode_uuid(owner_id);
    let limit_val  = sql_count(page.limit);
    let offset_val = sql_count(page.offset);

    let raws: Vec<RawNote> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {NOTE_COLUMNS} FROM notes
           WHERE owner_id = ?1
           ORDER BY created_at, note_id
           LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![owner_str, limit_val, offset_val],
            RawNote::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNote::into_note).collect()
  }

  #[tracing::instrument(skip(self))]
  async fn delete_note(&self, note_id: Uuid, requester_id: Uuid) -> Result<()> {
    let note_str      = encode_uuid(note_id);
    let requester_str = encode_uuid(requester_id);

    let removed: Option<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let versions: i64 = tx.query_row(
          "SELECT COUNT(*) FROM note_versions WHERE note_id = ?1",
          rusqlite::params![note_str],
          |row| row.get(0),
        )?;

        // Versions go with the note through ON DELETE CASCADE.
        let deleted = tx.execute(
          "DELETE FROM notes WHERE note_id = ?1 AND owner_id = ?2",
          rusqlite::params![note_str, requester_str],
        )?;
        if deleted == 0 {
          return Ok(None);
        }

        tx.commit()?;
        Ok(Some(versions))
      })
      .await?;

    let versions = removed.ok_or(quill_core::Error::NoteNotFound(note_id))?;
    tracing::info!(versions_removed = versions, "note deleted");
    Ok(())
  }

  // ── Versioned mutations ───────────────────────────────────────────────────

  #[tracing::instrument(skip(self, draft))]
  async fn update_note(
    &self,
    note_id:      Uuid,
    requester_id: Uuid,
    draft:        NoteDraft,
  ) -> Result<Note> {
    let note_str      = encode_uuid(note_id);
    let requester_str = encode_uuid(requester_id);

    let outcome: Option<(i64, RawNote)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        // Stamped under the write lock so timestamps follow version order.
        let at_str = encode_dt(Utc::now());

        let Some(current) = owned_note(&tx, &note_str, &requester_str)? else {
          return Ok(None);
        };

        let number = append_snapshot(&tx, &current, &requester_str, &at_str)?;
        let updated =
          overwrite_note(&tx, &note_str, &draft.title, &draft.content, &at_str)?;

        tx.commit()?;
        Ok(Some((number, updated)))
      })
      .await?;

    let (number, raw) = outcome.ok_or(quill_core::Error::NoteNotFound(note_id))?;
    tracing::info!(version_number = number, "note updated");
    raw.into_note()
  }

  #[tracing::instrument(skip(self))]
  async fn restore_version(
    &self,
    note_id:      Uuid,
    version_id:   Uuid,
    requester_id: Uuid,
  ) -> Result<Note> {
    let note_str      = encode_uuid(note_id);
    let version_str   = encode_uuid(version_id);
    let requester_str = encode_uuid(requester_id);

    let outcome: Lookup<(i64, RawNote)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let at_str = encode_dt(Utc::now());

        let Some(current) = owned_note(&tx, &note_str, &requester_str)? else {
          return Ok(Lookup::NoteMissing);
        };
        let Some(target) = note_version(&tx, &note_str, &version_str)? else {
          return Ok(Lookup::VersionMissing);
        };

        // The state being overwritten becomes history too.
        let number = append_snapshot(&tx, &current, &requester_str, &at_str)?;
        let restored =
          overwrite_note(&tx, &note_str, &target.title, &target.content, &at_str)?;

        tx.commit()?;
        Ok(Lookup::Found((number, restored)))
      })
      .await?;

    let (number, raw) = outcome.resolve(note_id, version_id)?;
    tracing::info!(version_number = number, "note restored");
    raw.into_note()
  }

  // ── History ───────────────────────────────────────────────────────────────

  async fn list_versions(
    &self,
    note_id:      Uuid,
    requester_id: Uuid,
  ) -> Result<Vec<NoteVersion>> {
    let note_str      = encode_uuid(note_id);
    let requester_str = encode_uuid(requester_id);

    let raws: Option<Vec<RawVersion>> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if owned_note(&tx, &note_str, &requester_str)?.is_none() {
          return Ok(None);
        }

        let rows = {
          let mut stmt = tx.prepare(&format!(
            "SELECT {VERSION_COLUMNS} FROM note_versions
             WHERE note_id = ?1
             ORDER BY version_number DESC"
          ))?;
          stmt
            .query_map(rusqlite::params![note_str], RawVersion::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        tx.commit()?;
        Ok(Some(rows))
      })
      .await?;

    raws
      .ok_or(quill_core::Error::NoteNotFound(note_id))?
      .into_iter()
      .map(RawVersion::into_version)
      .collect()
  }

  async fn get_version(
    &self,
    note_id:      Uuid,
    version_id:   Uuid,
    requester_id: Uuid,
  ) -> Result<NoteVersion> {
    let note_str      = encode_uuid(note_id);
    let version_str   = encode_uuid(version_id);
    let requester_str = encode_uuid(requester_id);

    let outcome: Lookup<RawVersion> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if owned_note(&tx, &note_str, &requester_str)?.is_none() {
          return Ok(Lookup::NoteMissing);
        }
        let found = match note_version(&tx, &note_str, &version_str)? {
          Some(raw) => Lookup::Found(raw),
          None => Lookup::VersionMissing,
        };

        tx.commit()?;
        Ok(found)
      })
      .await?;

    outcome.resolve(note_id, version_id)?.into_version()
  }
}

// ─── AccountStore impl ───────────────────────────────────────────────────────

impl AccountStore for SqliteStore {
  async fn create_account(&self, input: NewAccount) -> Result<Account> {
    let account = Account {
      account_id: Uuid::new_v4(),
      username:   input.username,
      email:      input.email,
      is_active:  true,
      created_at: Utc::now().trunc_subsecs(6),
    };

    let id_str   = encode_uuid(account.account_id);
    let at_str   = encode_dt(account.created_at);
    let username = account.username.clone();
    let email    = account.email.clone();
    let hash     = input.password_hash;

    let conflict: Option<&'static str> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let email_taken = tx
          .query_row(
            "SELECT 1 FROM accounts WHERE email = ?1",
            rusqlite::params![email],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if email_taken {
          return Ok(Some("The user with this email already exists in the system"));
        }

        let username_taken = tx
          .query_row(
            "SELECT 1 FROM accounts WHERE username = ?1",
            rusqlite::params![username],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if username_taken {
          return Ok(Some("The user with this username already exists in the system"));
        }

        tx.execute(
          "INSERT INTO accounts (account_id, username, email, password_hash, is_active, created_at)
           VALUES (?1, ?2, ?3, ?4, 1, ?5)",
          rusqlite::params![id_str, username, email, hash, at_str],
        )?;
        tx.commit()?;
        Ok(None)
      })
      .await?;

    if let Some(msg) = conflict {
      return Err(quill_core::Error::validation(msg).into());
    }

    tracing::info!(account_id = %account.account_id, username = %account.username, "account registered");
    Ok(account)
  }

  async fn find_credentials<'a>(
    &'a self,
    username: &'a str,
  ) -> Result<Option<Credentials>> {
    let username = username.to_owned();

    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = ?1"),
              rusqlite::params![username],
              RawAccount::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_credentials).transpose()
  }
}
