//! HTTP Basic identity resolution and argon2 password handling.
//!
//! Handlers that take a [`Principal`] only run for requests carrying valid
//! credentials for an active account. The versioning core sees nothing but
//! the resulting account id.

use std::sync::LazyLock;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use quill_core::{account::Account, store::AccountStore};
use rand_core::OsRng;
use uuid::Uuid;

use crate::{
  AppState,
  error::{ApiError, store_error},
};

const BAD_CREDENTIALS: &str = "Incorrect username or password";
const MISSING_CREDENTIALS: &str = "authentication required";

/// Verified in place of a real hash when the username is unknown, so a miss
/// costs the same argon2 work as a wrong password.
static DUMMY_PHC: LazyLock<Option<String>> =
  LazyLock::new(|| hash_password("quill-unknown-account").ok());

/// The authenticated account making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal(pub Uuid);

/// Extract the username and password from an `Authorization: Basic` header.
pub fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ApiError> {
  let unauthenticated = || ApiError::Unauthenticated(MISSING_CREDENTIALS);

  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(unauthenticated)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or_else(unauthenticated)?;

  let decoded = B64.decode(encoded).map_err(|_| unauthenticated())?;
  let creds   = String::from_utf8(decoded).map_err(|_| unauthenticated())?;

  let (username, password) = creds.split_once(':').ok_or_else(unauthenticated)?;
  Ok((username.to_owned(), password.to_owned()))
}

/// Hash `password` into an argon2 PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

/// Check `password` against a stored PHC string. Malformed hashes never verify.
pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
    .is_ok()
}

/// Check `password` against `phc`, or against a dummy hash when there is no
/// account. A missing account never verifies.
fn verify_or_dummy(password: &str, phc: Option<&str>) -> bool {
  match phc {
    Some(phc) => verify_password(password, phc),
    None => {
      if let Some(dummy) = DUMMY_PHC.as_deref() {
        verify_password(password, dummy);
      }
      false
    }
  }
}

/// Resolve a username/password pair to an active account.
///
/// Lookup is by exact username only.
pub async fn authenticate<S>(
  store:    &S,
  username: &str,
  password: &str,
) -> Result<Account, ApiError>
where
  S: AccountStore,
{
  let creds = store.find_credentials(username).await.map_err(store_error)?;

  let password = password.to_owned();
  let hash     = creds.as_ref().map(|c| c.password_hash.clone());
  // argon2 is deliberately slow; keep it off the async workers.
  let verified =
    tokio::task::spawn_blocking(move || verify_or_dummy(&password, hash.as_deref()))
      .await
      .map_err(|e| ApiError::Internal(Box::new(e)))?;

  match creds {
    Some(creds) if verified && creds.account.is_active => Ok(creds.account),
    Some(_) => {
      tracing::debug!(%username, "rejected credentials");
      Err(ApiError::Unauthenticated(BAD_CREDENTIALS))
    }
    None => {
      tracing::debug!(%username, "login for unknown username");
      Err(ApiError::Unauthenticated(BAD_CREDENTIALS))
    }
  }
}

impl<S> FromRequestParts<AppState<S>> for Principal
where
  S: AccountStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let (username, password) = basic_credentials(&parts.headers)?;
    let account = authenticate(state.store.as_ref(), &username, &password).await?;
    Ok(Principal(account.account_id))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::{HeaderValue, Request};
  use quill_core::account::NewAccount;
  use quill_store_sqlite::SqliteStore;

  async fn make_state(password: &str) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store
      .create_account(NewAccount {
        username:      "user".into(),
        email:         "user@example.com".into(),
        password_hash: hash_password(password).unwrap(),
      })
      .await
      .unwrap();
    AppState::new(store)
  }

  async fn extract(
    req: Request<axum::body::Body>,
    state: &AppState<SqliteStore>,
  ) -> Result<Principal, ApiError> {
    let (mut parts, _) = req.into_parts();
    Principal::from_request_parts(&mut parts, state).await
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  #[test]
  fn hash_then_verify() {
    let phc = hash_password("secret").unwrap();
    assert!(phc.starts_with("$argon2"));
    assert!(verify_password("secret", &phc));
    assert!(!verify_password("wrong", &phc));
    assert!(!verify_password("secret", "not a phc string"));
  }

  #[test]
  fn unknown_account_still_runs_a_full_verify() {
    let dummy = DUMMY_PHC.as_deref().unwrap();
    let real = hash_password("secret").unwrap();
    let dummy_params = argon2::Params::try_from(&PasswordHash::new(dummy).unwrap()).unwrap();
    let real_params = argon2::Params::try_from(&PasswordHash::new(&real).unwrap()).unwrap();
    assert_eq!(dummy_params, real_params);
    assert_eq!(dummy.split('$').nth(1), real.split('$').nth(1));

    assert!(!verify_or_dummy("quill-unknown-account", None));
    assert!(verify_or_dummy("secret", Some(&real)));
  }

  #[test]
  fn password_may_contain_colons() {
    let mut headers = HeaderMap::new();
    headers.insert(
      header::AUTHORIZATION,
      HeaderValue::from_str(&basic("user", "a:b:c")).unwrap(),
    );
    let (user, pass) = basic_credentials(&headers).unwrap();
    assert_eq!(user, "user");
    assert_eq!(pass, "a:b:c");
  }

  #[tokio::test]
  async fn correct_credentials() {
    let state = make_state("secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("user", "secret"))
      .body(axum::body::Body::empty()).unwrap();
    assert!(extract(req, &state).await.is_ok());
  }

  #[tokio::test]
  async fn wrong_password() {
    let state = make_state("secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("user", "wrong"))
      .body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(ApiError::Unauthenticated(_))));
  }

  #[tokio::test]
  async fn unknown_user() {
    let state = make_state("secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("nobody", "secret"))
      .body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(ApiError::Unauthenticated(_))));
  }

  #[tokio::test]
  async fn missing_header() {
    let state = make_state("secret").await;
    let req = Request::builder().body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(ApiError::Unauthenticated(_))));
  }

  #[tokio::test]
  async fn invalid_base64() {
    let state = make_state("secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, "Basic !!!not-base64!!!")
      .body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(ApiError::Unauthenticated(_))));
  }
}
