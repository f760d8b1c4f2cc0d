//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond
//! precision, so lexical order matches chronological order. UUIDs are stored
//! as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use quill_core::{
  account::{Account, Credentials},
  note::{Note, NoteVersion},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawNote::from_row`].
pub const NOTE_COLUMNS: &str =
  "note_id, title, content, owner_id, created_at, updated_at";

/// Raw values read directly from a `notes` row.
pub struct RawNote {
  pub note_id:    String,
  pub title:      String,
  pub content:    String,
  pub owner_id:   String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawNote {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      note_id:    row.get(0)?,
      title:      row.get(1)?,
      content:    row.get(2)?,
      owner_id:   row.get(3)?,
      created_at: row.get(4)?,
      updated_at: row.get(5)?,
    })
  }

  pub fn into_note(self) -> Result<Note> {
    Ok(Note {
      note_id:    decode_uuid(&self.note_id)?,
      title:      self.title,
      content:    self.content,
      owner_id:   decode_uuid(&self.owner_id)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawVersion::from_row`].
pub const VERSION_COLUMNS: &str =
  "version_id, note_id, version_number, title, content, editor_id, created_at";

/// Raw values read directly from a `note_versions` row.
pub struct RawVersion {
  pub version_id:     String,
  pub note_id:        String,
  pub version_number: i64,
  pub title:          String,
  pub content:        String,
  pub editor_id:      Option<String>,
  pub created_at:     String,
}

impl RawVersion {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      version_id:     row.get(0)?,
      note_id:        row.get(1)?,
      version_number: row.get(2)?,
      title:          row.get(3)?,
      content:        row.get(4)?,
      editor_id:      row.get(5)?,
      created_at:     row.get(6)?,
    })
  }

  pub fn into_version(self) -> Result<NoteVersion> {
    let version_number = u32::try_from(self.version_number)
      .ok()
      .filter(|n| *n > 0)
      .ok_or_else(|| {
        Error::Corrupt(format!("version number {} out of range", self.version_number))
      })?;

    Ok(NoteVersion {
      version_id: decode_uuid(&self.version_id)?,
      note_id: decode_uuid(&self.note_id)?,
      version_number,
      title: self.title,
      content: self.content,
      editor_id: self.editor_id.as_deref().map(decode_uuid).transpose()?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawAccount::from_row`].
pub const ACCOUNT_COLUMNS: &str =
  "account_id, username, email, is_active, created_at, password_hash";

/// Raw values read directly from an `accounts` row.
pub struct RawAccount {
  pub account_id:    String,
  pub username:      String,
  pub email:         String,
  pub is_active:     bool,
  pub created_at:    String,
  pub password_hash: String,
}

impl RawAccount {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      account_id:    row.get(0)?,
      username:      row.get(1)?,
      email:         row.get(2)?,
      is_active:     row.get(3)?,
      created_at:    row.get(4)?,
      password_hash: row.get(5)?,
    })
  }

  pub fn into_credentials(self) -> Result<Credentials> {
    Ok(Credentials {
      account:       Account {
        account_id: decode_uuid(&self.account_id)?,
        username:   self.username,
        email:      self.email,
        is_active:  self.is_active,
        created_at: decode_dt(&self.created_at)?,
      },
      password_hash: self.password_hash,
    })
  }
}
