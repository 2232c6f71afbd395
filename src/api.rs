//! Client for the nutrition backend
//!
//! Plain JSON over HTTP. Every authenticated call takes the caller's
//! `Session` explicitly; nothing is read from ambient state.

use crate::models::{
  AcceptSuggestion, Activity, ActivityUpdate, AiStats, ChatReply, ChatRequest, Favorite, Goals,
  LogEntry, Meal, Profile, ProfileUpdate, ProgressSummary, TopMeal, WeeklyCoach,
};
use crate::session::Session;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error("Invalid URL: {0}")]
  InvalidUrl(#[from] url::ParseError),

  #[error("HTTP request failed: {0}")]
  Request(#[from] reqwest::Error),

  /// The token is missing, expired or rejected. The session should be cleared.
  #[error("Not authenticated with the backend")]
  Unauthorized,

  #[error("Backend returned {status}: {body}")]
  Status { status: u16, body: String },

  /// 2xx response that reports `"ok": false`
  #[error("Backend rejected the request: {0}")]
  Rejected(String),

  #[error("Parse error: {0}")]
  Parse(String),
}

impl Serialize for ApiError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Wire Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct Credentials<'a> {
  email: &'a str,
  password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
  access_token: String,
}

/// `{"ok": true}` / `{"ok": false, "error": "..."}` acknowledgements
#[derive(Debug, Deserialize)]
struct Ack {
  ok: bool,
  #[serde(default)]
  error: Option<String>,
}

/// ---------------------------------------------------------------------------
/// Backend Client
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BackendClient {
  client: Client,
  base_url: Url,
}

impl BackendClient {
  pub fn new(base_url: Url) -> Self {
    Self {
      client: Client::new(),
      base_url,
    }
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  /// Join `path` onto the base. Paths never carry a trailing slash.
  fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
    let base = self.base_url.as_str().trim_end_matches('/');
    Ok(Url::parse(&format!("{}{}", base, path))?)
  }

  fn authed(&self, builder: RequestBuilder, session: &Session) -> RequestBuilder {
    builder
      .header("Authorization", session.bearer())
      .header("Content-Type", "application/json")
  }

  /// Send and map non-success statuses onto `ApiError`
  async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
    let response = builder.send().await?;
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
      tracing::warn!("Backend answered 401, session is no longer valid");
      return Err(ApiError::Unauthorized);
    }

    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      tracing::warn!(status = status.as_u16(), "Backend request failed");
      return Err(ApiError::Status {
        status: status.as_u16(),
        body,
      });
    }

    Ok(response)
  }

  async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
      tracing::error!(
        "Failed to parse backend response: {} (first 500 chars: {})",
        e,
        text.chars().take(500).collect::<String>()
      );
      ApiError::Parse(e.to_string())
    })
  }

  async fn read_ack(response: Response) -> Result<(), ApiError> {
    let ack: Ack = Self::read_json(response).await?;
    if ack.ok {
      Ok(())
    } else {
      Err(ApiError::Rejected(
        ack.error.unwrap_or_else(|| "unknown error".to_string()),
      ))
    }
  }

  async fn get_json<T: DeserializeOwned>(
    &self,
    session: &Session,
    url: Url,
  ) -> Result<T, ApiError> {
    let response = self
      .send(self.authed(self.client.get(url), session))
      .await?;
    Self::read_json(response).await
  }

  /// -------------------------------------------------------------------------
  /// Auth
  /// -------------------------------------------------------------------------

  /// Exchange credentials for a session
  pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
    let url = self.endpoint("/auth/login")?;
    let response = self
      .send(self.client.post(url).json(&Credentials { email, password }))
      .await?;

    let token: TokenResponse = Self::read_json(response).await?;
    tracing::info!(email, "Logged in");
    Ok(Session::new(token.access_token, email))
  }

  pub async fn register(&self, email: &str, password: &str) -> Result<(), ApiError> {
    let url = self.endpoint("/auth/register")?;
    self
      .send(self.client.post(url).json(&Credentials { email, password }))
      .await?;
    tracing::info!(email, "Registered");
    Ok(())
  }

  /// -------------------------------------------------------------------------
  /// Meals and Logs
  /// -------------------------------------------------------------------------

  pub async fn list_meals(&self, session: &Session) -> Result<Vec<Meal>, ApiError> {
    let meals: Vec<Meal> = self.get_json(session, self.endpoint("/meals")?).await?;
    tracing::debug!(count = meals.len(), "Fetched meal catalog");
    Ok(meals)
  }

  pub async fn list_log_entries(
    &self,
    session: &Session,
    date: NaiveDate,
  ) -> Result<Vec<LogEntry>, ApiError> {
    let mut url = self.endpoint("/logs")?;
    url
      .query_pairs_mut()
      .append_pair("log_date", &date.to_string());

    let entries: Vec<LogEntry> = self.get_json(session, url).await?;
    tracing::debug!(%date, count = entries.len(), "Fetched log entries");
    Ok(entries)
  }

  /// Record that `portion` of a meal was eaten on `date`
  pub async fn add_log_entry(
    &self,
    session: &Session,
    meal_id: i64,
    portion: f64,
    date: NaiveDate,
  ) -> Result<(), ApiError> {
    let mut url = self.endpoint("/logs")?;
    url
      .query_pairs_mut()
      .append_pair("meal_id", &meal_id.to_string())
      .append_pair("portion", &portion.to_string())
      .append_pair("log_date", &date.to_string());

    let response = self.send(self.authed(self.client.post(url), session)).await?;
    Self::read_ack(response).await?;
    tracing::info!(meal_id, portion, %date, "Log entry added");
    Ok(())
  }

  pub async fn delete_log_entry(&self, session: &Session, log_id: i64) -> Result<(), ApiError> {
    let url = self.endpoint(&format!("/logs/{}", log_id))?;
    let response = self
      .send(self.authed(self.client.delete(url), session))
      .await?;
    Self::read_ack(response).await?;
    tracing::info!(log_id, "Log entry deleted");
    Ok(())
  }

  /// -------------------------------------------------------------------------
  /// Goals
  /// -------------------------------------------------------------------------

  /// `None` when the user has no goals yet
  pub async fn get_goals(&self, session: &Session) -> Result<Option<Goals>, ApiError> {
    match self.get_json(session, self.endpoint("/user/goals")?).await {
      Ok(goals) => Ok(Some(goals)),
      Err(ApiError::Status { status: 404, .. }) => Ok(None),
      Err(e) => Err(e),
    }
  }

  /// Overwrite the goals wholesale; returns what the backend stored
  pub async fn save_goals(&self, session: &Session, goals: &Goals) -> Result<Goals, ApiError> {
    let url = self.endpoint("/user/goals")?;
    let response = self
      .send(self.authed(self.client.post(url), session).json(goals))
      .await?;
    let saved: Goals = Self::read_json(response).await?;
    tracing::info!(goal_type = %saved.goal_type, "Goals saved");
    Ok(saved)
  }

  /// -------------------------------------------------------------------------
  /// Favorites
  /// -------------------------------------------------------------------------

  pub async fn list_favorites(&self, session: &Session) -> Result<Vec<Favorite>, ApiError> {
    self.get_json(session, self.endpoint("/favorites")?).await
  }

  pub async fn add_favorite(&self, session: &Session, meal_id: i64) -> Result<(), ApiError> {
    let mut url = self.endpoint("/favorites")?;
    url
      .query_pairs_mut()
      .append_pair("meal_id", &meal_id.to_string());

    let response = self.send(self.authed(self.client.post(url), session)).await?;
    Self::read_ack(response).await
  }

  pub async fn remove_favorite(&self, session: &Session, meal_id: i64) -> Result<(), ApiError> {
    let url = self.endpoint(&format!("/favorites/{}", meal_id))?;
    let response = self
      .send(self.authed(self.client.delete(url), session))
      .await?;
    Self::read_ack(response).await
  }

  /// -------------------------------------------------------------------------
  /// AI Coaching
  /// -------------------------------------------------------------------------

  /// Weekly coaching text generated by the backend
  pub async fn weekly_coach(&self, session: &Session) -> Result<WeeklyCoach, ApiError> {
    self
      .get_json(session, self.endpoint("/ai/weekly-coach")?)
      .await
  }

  pub async fn chat(
    &self,
    session: &Session,
    request: &ChatRequest,
  ) -> Result<ChatReply, ApiError> {
    let url = self.endpoint("/ai/chat")?;
    let response = self
      .send(self.authed(self.client.post(url), session).json(request))
      .await?;
    Self::read_json(response).await
  }

  /// Tell the backend a suggested meal was taken up
  pub async fn accept_suggestion(
    &self,
    session: &Session,
    ai_interaction_id: i64,
    meal_id: i64,
  ) -> Result<(), ApiError> {
    let url = self.endpoint("/ai/accept")?;
    let body = AcceptSuggestion {
      ai_interaction_id,
      meal_id,
    };
    let response = self
      .send(self.authed(self.client.post(url), session).json(&body))
      .await?;
    Self::read_ack(response).await
  }

  pub async fn ai_stats(&self, session: &Session) -> Result<AiStats, ApiError> {
    self.get_json(session, self.endpoint("/ai/stats")?).await
  }

  /// Up to five meals whose suggestions were accepted most often
  pub async fn top_ai_meals(&self, session: &Session) -> Result<Vec<TopMeal>, ApiError> {
    self.get_json(session, self.endpoint("/ai/top-meals")?).await
  }

  /// Before/after progress around the first AI interaction.
  /// `None` while the user has no goals or has not used the assistant yet.
  pub async fn progress(&self, session: &Session) -> Result<Option<ProgressSummary>, ApiError> {
    let body: serde_json::Value = self
      .get_json(session, self.endpoint("/analysis/progress")?)
      .await?;

    if let Some(reason) = body.get("error").and_then(|e| e.as_str()) {
      tracing::info!(reason, "No progress report available yet");
      return Ok(None);
    }

    serde_json::from_value(body)
      .map(Some)
      .map_err(|e| ApiError::Parse(e.to_string()))
  }

  /// -------------------------------------------------------------------------
  /// Profile and Activity
  /// -------------------------------------------------------------------------

  pub async fn get_profile(&self, session: &Session) -> Result<Profile, ApiError> {
    self.get_json(session, self.endpoint("/profile")?).await
  }

  pub async fn save_profile(
    &self,
    session: &Session,
    profile: &ProfileUpdate,
  ) -> Result<Profile, ApiError> {
    let url = self.endpoint("/profile")?;
    let response = self
      .send(self.authed(self.client.post(url), session).json(profile))
      .await?;
    let saved: Profile = Self::read_json(response).await?;
    tracing::info!(bmr = ?saved.bmr, "Profile saved");
    Ok(saved)
  }

  /// Record a day's step count. The backend answers 400 until a profile exists.
  pub async fn log_activity(
    &self,
    session: &Session,
    activity: &ActivityUpdate,
  ) -> Result<Activity, ApiError> {
    let url = self.endpoint("/profile/activity")?;
    let response = self
      .send(self.authed(self.client.post(url), session).json(activity))
      .await?;
    let logged: Activity = Self::read_json(response).await?;
    tracing::info!(
      steps = logged.steps,
      level = %logged.activity_level,
      target_calories = logged.target_calories,
      "Activity logged"
    );
    Ok(logged)
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
