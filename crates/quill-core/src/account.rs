//! Accounts — the principals that own notes.
//!
//! The versioning core only ever sees an account's id. The remaining fields
//! exist for registration and login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A registered account, safe to return to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
  pub account_id: Uuid,
  pub username:   String,
  pub email:      String,
  pub is_active:  bool,
  pub created_at: DateTime<Utc>,
}

/// An account together with its stored password hash. Never serialised.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub account:       Account,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// A registration request as submitted by a client.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
  pub email:     String,
  pub username:  String,
  pub password:  String,
  pub password2: String,
}

impl Registration {
  /// Check the request is well-formed. Uniqueness is checked by the store.
  pub fn validate(&self) -> Result<()> {
    if self.username.trim().is_empty() {
      return Err(Error::validation("username must not be empty"));
    }
    if self.username.contains(':') {
      return Err(Error::validation("username must not contain ':'"));
    }
    let email_ok = self
      .email
      .split_once('@')
      .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !email_ok {
      return Err(Error::validation("email address is not valid"));
    }
    if self.password.is_empty() {
      return Err(Error::validation("password must not be empty"));
    }
    if self.password != self.password2 {
      return Err(Error::validation("Passwords do not match"));
    }
    Ok(())
  }
}

/// A validated account ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub username:      String,
  pub email:         String,
  pub password_hash: String,
}
