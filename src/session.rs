//! Session context and its local store
//!
//! The bearer token and e-mail travel as an explicit `Session` value. The
//! store keeps the current one in a single-row SQLite table so it survives
//! restarts.

use crate::db::DbPool;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ---------------------------------------------------------------------------
/// Session
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
  pub token: String,
  pub email: String,
}

impl Session {
  pub fn new(token: impl Into<String>, email: impl Into<String>) -> Self {
    Self {
      token: token.into(),
      email: email.into(),
    }
  }

  pub fn bearer(&self) -> String {
    format!("Bearer {}", self.token)
  }
}

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
}

impl Serialize for SessionError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Session Store
/// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct SessionStore {
  db: DbPool,
}

impl SessionStore {
  pub fn new(db: DbPool) -> Self {
    Self { db }
  }

  /// Replace whatever session was stored before
  pub async fn save(&self, session: &Session) -> Result<(), SessionError> {
    sqlx::query(
      r#"
      INSERT INTO session (id, token, email, saved_at)
      VALUES (1, ?1, ?2, ?3)
      ON CONFLICT(id) DO UPDATE SET
        token = excluded.token,
        email = excluded.email,
        saved_at = excluded.saved_at
      "#,
    )
    .bind(&session.token)
    .bind(&session.email)
    .bind(Utc::now())
    .execute(&self.db)
    .await?;

    tracing::info!(email = %session.email, "Session saved");
    Ok(())
  }

  pub async fn load(&self) -> Result<Option<Session>, SessionError> {
    let row: Option<(String, String)> =
      sqlx::query_as("SELECT token, email FROM session WHERE id = 1")
        .fetch_optional(&self.db)
        .await?;

    Ok(row.map(|(token, email)| Session { token, email }))
  }

  /// When the stored session was last written
  pub async fn saved_at(&self) -> Result<Option<DateTime<Utc>>, SessionError> {
    let saved: Option<DateTime<Utc>> =
      sqlx::query_scalar("SELECT saved_at FROM session WHERE id = 1")
        .fetch_optional(&self.db)
        .await?;
    Ok(saved)
  }

  /// Forget the session, e.g. on logout or after the backend answered 401
  pub async fn clear(&self) -> Result<(), SessionError> {
    sqlx::query("DELETE FROM session")
      .execute(&self.db)
      .await?;

    tracing::info!("Session cleared");
    Ok(())
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
