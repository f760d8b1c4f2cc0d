//! SQL schema for the Quill SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;

CREATE TABLE IF NOT EXISTS accounts (
    account_id    TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,        -- argon2 PHC string
    is_active     INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS notes (
    note_id    TEXT PRIMARY KEY,
    owner_id   TEXT NOT NULL REFERENCES accounts(account_id),
    title      TEXT NOT NULL,
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL,           -- ISO 8601 UTC; server-assigned
    updated_at TEXT NOT NULL
);

-- Snapshots of earlier note states. Rows are inserted and, through the
-- cascade, deleted with their note; they are never updated.
CREATE TABLE IF NOT EXISTS note_versions (
    version_id     TEXT PRIMARY KEY,
    note_id        TEXT NOT NULL REFERENCES notes(note_id) ON DELETE CASCADE,
    version_number INTEGER NOT NULL CHECK (version_number > 0),
    title          TEXT NOT NULL,
    content        TEXT NOT NULL,
    editor_id      TEXT REFERENCES accounts(account_id),
    created_at     TEXT NOT NULL,
    UNIQUE (note_id, version_number)
);

CREATE TRIGGER IF NOT EXISTS note_versions_immutable
BEFORE UPDATE ON note_versions
BEGIN
    SELECT RAISE(ABORT, 'note versions are immutable');
END;

CREATE INDEX IF NOT EXISTS notes_owner_idx ON notes(owner_id, created_at);

PRAGMA user_version = 1;
";
