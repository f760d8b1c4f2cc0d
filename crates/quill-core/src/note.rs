//! Notes and their version history.
//!
//! A [`Note`] holds only the latest state. Every earlier state lives in the
//! append-only ledger of [`NoteVersion`] snapshots, so the two together form
//! a complete timeline with no gaps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Note ────────────────────────────────────────────────────────────────────

/// The current, live state of a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
  pub note_id:    Uuid,
  pub title:      String,
  pub content:    String,
  /// Set at creation; ownership never transfers.
  pub owner_id:   Uuid,
  pub created_at: DateTime<Utc>,
  /// Refreshed by every update and restore.
  pub updated_at: DateTime<Utc>,
}

/// Title and content supplied by a client, used both to create a note and to
/// replace the contents of an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
  pub title:   String,
  pub content: String,
}

impl NoteDraft {
  pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
    Self { title: title.into(), content: content.into() }
  }
}

// ─── Version ─────────────────────────────────────────────────────────────────

/// An immutable snapshot of a note's title and content, taken immediately
/// before a content-changing mutation.
///
/// For a given note, `version_number` runs 1, 2, 3, … in creation order with
/// no gaps and no repeats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteVersion {
  pub version_id:     Uuid,
  pub note_id:        Uuid,
  pub version_number: u32,
  pub title:          String,
  pub content:        String,
  /// The account whose mutation produced this snapshot. `None` for
  /// system-generated snapshots.
  pub editor_id:      Option<Uuid>,
  pub created_at:     DateTime<Utc>,
}

// ─── Paging ──────────────────────────────────────────────────────────────────

/// An offset/limit window over a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
  pub offset: usize,
  pub limit:  usize,
}

impl Page {
  pub const DEFAULT_LIMIT: usize = 100;

  /// Build a page, rejecting a zero `limit`.
  pub fn new(offset: usize, limit: usize) -> Result<Self> {
    if limit == 0 {
      return Err(Error::validation("limit must be greater than zero"));
    }
    Ok(Self { offset, limit })
  }
}

impl Default for Page {
  fn default() -> Self { Self { offset: 0, limit: Self::DEFAULT_LIMIT } }
}
