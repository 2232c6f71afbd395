//! Runtime configuration, read from the environment (and `.env` if present)

use std::env;
use std::path::PathBuf;
use url::Url;

const DEFAULT_API_BASE: &str = "http://localhost:8000";
const DEFAULT_DB_PATH: &str = "nutrition-log.db";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid NUTRITION_API_BASE '{value}': {reason}")]
  InvalidApiBase { value: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  /// Root of the backend API, without a trailing slash
  pub api_base_url: Url,
  /// Local SQLite file holding the session
  pub db_path: PathBuf,
  /// `tracing` filter directive, e.g. "info" or "nutrition_log_lib=debug"
  pub log_filter: String,
  /// Used to log in when no session is stored
  pub email: Option<String>,
  pub password: Option<String>,
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();

    let raw_base =
      non_empty_var("NUTRITION_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    let api_base_url = parse_api_base(&raw_base)?;

    let db_path = non_empty_var("NUTRITION_DB_PATH")
      .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
      .into();

    let log_filter =
      non_empty_var("NUTRITION_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    Ok(Self {
      api_base_url,
      db_path,
      log_filter,
      email: non_empty_var("NUTRITION_EMAIL"),
      password: non_empty_var("NUTRITION_PASSWORD"),
    })
  }
}

/// Unset and blank variables are treated the same
fn non_empty_var(key: &str) -> Option<String> {
  env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Endpoint paths are appended to the base, so it never keeps a trailing slash
fn parse_api_base(raw: &str) -> Result<Url, ConfigError> {
  let invalid = |reason: String| ConfigError::InvalidApiBase {
    value: raw.to_string(),
    reason,
  };

  let url = Url::parse(raw.trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
  if !matches!(url.scheme(), "http" | "https") {
    return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
  }
  Ok(url)
}
