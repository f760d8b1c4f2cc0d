//! HTTP server assembly for Quill.
//!
//! Loads [`ServerConfig`], then wraps the [`quill_api`] router with tracing,
//! CORS and trailing-slash normalisation.

use std::path::{Path, PathBuf};

use axum::{
  Router,
  http::{HeaderValue, Method, header},
};
use quill_api::{AppState, Paging};
use quill_core::store::{AccountStore, NoteStore};
use serde::Deserialize;
use tower::Layer as _;
use tower_http::{
  cors::{Any, CorsLayer},
  normalize_path::{NormalizePath, NormalizePathLayer},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `QUILL_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  #[serde(default = "default_store_path")]
  pub store_path:         PathBuf,
  /// Allowed CORS origins; `"*"` allows any.
  #[serde(default = "default_cors_origins")]
  pub cors_origins:       Vec<String>,
  #[serde(default = "default_page_limit")]
  pub default_page_limit: usize,
  #[serde(default = "max_page_limit")]
  pub max_page_limit:     usize,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8000 }

fn default_store_path() -> PathBuf { PathBuf::from("quill.db") }

fn default_cors_origins() -> Vec<String> {
  [
    "http://localhost:3000",
    "http://localhost:3001",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:3001",
  ]
  .map(str::to_owned)
  .to_vec()
}

fn default_page_limit() -> usize { Paging::default().default_limit }

fn max_page_limit() -> usize { Paging::default().max_limit }

impl ServerConfig {
  /// Read the optional TOML file at `path`, then overlay `QUILL_*` variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("QUILL")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("cors_origins"),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn paging(&self) -> Paging {
    Paging {
      default_limit: self.default_page_limit,
      max_limit:     self.max_page_limit,
    }
  }

  /// `store_path` with a leading `~` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Application ──────────────────────────────────────────────────────────────

fn cors_layer(origins: &[String]) -> CorsLayer {
  let layer = CorsLayer::new()
    .allow_methods([
      Method::GET,
      Method::POST,
      Method::PUT,
      Method::DELETE,
      Method::OPTIONS,
    ])
    .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

  if origins.iter().any(|o| o == "*") {
    return layer.allow_origin(Any);
  }

  let mut parsed = Vec::new();
  for origin in origins {
    match HeaderValue::from_str(origin) {
      Ok(value) => parsed.push(value),
      Err(err) => tracing::warn!("ignoring invalid CORS origin '{origin}': {err}"),
    }
  }
  layer.allow_origin(parsed)
}

/// Build the full router: the API nested under `/api`, with tracing and CORS.
pub fn router<S>(config: &ServerConfig, store: S) -> Router
where
  S: NoteStore + AccountStore + 'static,
{
  let mut state = AppState::new(store);
  state.paging = config.paging();

  Router::new()
    .nest("/api", quill_api::api_router(state))
    .layer(TraceLayer::new_for_http())
    .layer(cors_layer(&config.cors_origins))
}

/// [`router`] behind trailing-slash normalisation, so `/api/notes/` and
/// `/api/notes` reach the same handler.
pub fn service<S>(config: &ServerConfig, store: S) -> NormalizePath<Router>
where
  S: NoteStore + AccountStore + 'static,
{
  NormalizePathLayer::trim_trailing_slash().layer(router(config, store))
}
