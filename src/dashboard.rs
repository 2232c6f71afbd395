//! Dashboard refresh: fetch, aggregate, evaluate
//!
//! All backend data for a refresh is fetched first. Aggregation and rule
//! evaluation only run once every input is in hand.

use crate::aggregate::{
  aggregate_window, group_by_date, DailyMacros, MealCatalog, WeeklyStats, WeeklyWindow,
};
use crate::api::{ApiError, BackendClient};
use crate::feedback::evaluate;
use crate::models::{FeedbackMessage, Goals, LogEntry, Meal};
use crate::session::Session;
use chrono::NaiveDate;
use serde::Serialize;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
  /// Backend answered 401; the stored session must be cleared
  #[error("Session expired, please log in again")]
  SessionExpired,

  #[error("Failed to load {stage}: {source}")]
  Fetch {
    stage: &'static str,
    #[source]
    source: ApiError,
  },
}

impl RefreshError {
  fn fetch(stage: &'static str) -> impl FnOnce(ApiError) -> Self {
    move |source| match source {
      ApiError::Unauthorized => Self::SessionExpired,
      source => Self::Fetch { stage, source },
    }
  }
}

impl Serialize for RefreshError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Snapshot
/// ---------------------------------------------------------------------------

/// Everything the dashboard shows for one date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
  pub date: NaiveDate,
  pub today: DailyMacros,
  pub window: WeeklyWindow,
  pub weekly_stats: WeeklyStats,
  pub goals: Option<Goals>,
  pub feedback: Vec<FeedbackMessage>,
}

impl DashboardSnapshot {
  pub fn build(
    meals: Vec<Meal>,
    entries: Vec<LogEntry>,
    goals: Option<Goals>,
    date: NaiveDate,
  ) -> Self {
    let catalog = MealCatalog::new(meals);
    let by_date = group_by_date(entries);

    let window = aggregate_window(&catalog, &by_date, date);
    let today = window.days[window.days.len() - 1].macros;
    let weekly_stats = WeeklyStats::compute(&window);
    let feedback = evaluate(&today, goals.as_ref(), &window);

    Self {
      date,
      today,
      window,
      weekly_stats,
      goals,
      feedback,
    }
  }
}

/// Load meals, the seven days of logs ending at `date` and the goals,
/// then build a snapshot.
pub async fn refresh(
  client: &BackendClient,
  session: &Session,
  date: NaiveDate,
) -> Result<DashboardSnapshot, RefreshError> {
  let meals = client
    .list_meals(session)
    .await
    .map_err(RefreshError::fetch("meals"))?;

  let mut entries = Vec::new();
  for day in WeeklyWindow::dates_ending(date) {
    let day_entries = client
      .list_log_entries(session, day)
      .await
      .map_err(RefreshError::fetch("log entries"))?;
    entries.extend(day_entries);
  }

  let goals = client
    .get_goals(session)
    .await
    .map_err(RefreshError::fetch("goals"))?;

  tracing::info!(
    %date,
    meals = meals.len(),
    entries = entries.len(),
    has_goals = goals.is_some(),
    "Dashboard data loaded"
  );

  Ok(DashboardSnapshot::build(meals, entries, goals, date))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_approx_eq;
  use crate::feedback::ALL_CLEAR_RULE;
  use crate::models::{GoalType, Severity};
  use crate::test_utils::{date, log_entry, mock_goals, mock_meals, mock_session};
  use mockito::Matcher;
  use url::Url;

  #[test]
  fn test_build_without_goals_has_no_feedback() {
    let day = date(2025, 3, 10);
    let snapshot = DashboardSnapshot::build(
      mock_meals(),
      vec![log_entry(1, 1, 1.0, day)],
      None,
      day,
    );

    assert_approx_eq!(snapshot.today.calories, 600.0, 1e-9);
    assert!(snapshot.feedback.is_empty());
    assert_eq!(snapshot.weekly_stats.days_with_data, 1);
  }

  #[test]
  fn test_build_evaluates_today_against_goals() {
    let day = date(2025, 3, 10);
    // 2 chicken bowls + 1 oatmeal: 1500 kcal, 100 g protein
    let entries = vec![
      log_entry(1, 1, 2.0, day),
      log_entry(2, 2, 1.0, day),
      log_entry(3, 2, 1.0, date(2025, 3, 9)),
    ];
    let snapshot = DashboardSnapshot::build(
      mock_meals(),
      entries,
      Some(mock_goals(GoalType::Maintain)),
      day,
    );

    assert_approx_eq!(snapshot.today.calories, 1500.0, 1e-9);
    assert_approx_eq!(snapshot.today.protein, 100.0, 1e-9);
    assert_eq!(snapshot.window.days_with_data_count(), 2);

    let rules: Vec<&str> = snapshot.feedback.iter().map(|m| m.rule.as_str()).collect();
    assert_eq!(rules, vec!["protein_on_target"]);
    assert_ne!(rules[0], ALL_CLEAR_RULE);
    assert_eq!(snapshot.feedback[0].severity, Severity::Success);
  }

  #[tokio::test]
  async fn test_refresh_fetches_week_and_goals() {
    let mut server = mockito::Server::new_async().await;
    let meals = server
      .mock("GET", "/meals")
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(
        r#"[{"meal_id": 1, "meal_name": "Chicken bowl", "calories": 600,
             "protein_g": 45, "carbs_g": 60, "fat_g": 14}]"#,
      )
      .create_async()
      .await;
    let today_logs = server
      .mock("GET", "/logs")
      .match_query(Matcher::UrlEncoded("log_date".into(), "2025-03-10".into()))
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(r#"[{"id": 1, "meal_id": 1, "portion": 2, "log_date": "2025-03-10"}]"#)
      .create_async()
      .await;
    let other_logs = server
      .mock("GET", "/logs")
      .match_query(Matcher::Regex("log_date=2025-03-0[4-9]".into()))
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body("[]")
      .expect(6)
      .create_async()
      .await;
    server
      .mock("GET", "/user/goals")
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(r#"{"daily_calorie_target": 2000, "daily_protein_target": 100, "goal_type": "koruma"}"#)
      .create_async()
      .await;

    let client = BackendClient::new(Url::parse(&server.url()).unwrap());
    let snapshot = refresh(&client, &mock_session(), date(2025, 3, 10))
      .await
      .unwrap();

    assert_approx_eq!(snapshot.today.calories, 1200.0, 1e-9);
    assert_eq!(snapshot.goals, Some(mock_goals(GoalType::Maintain)));
    assert_eq!(snapshot.weekly_stats.days_with_data, 1);

    meals.assert_async().await;
    today_logs.assert_async().await;
    other_logs.assert_async().await;
  }

  #[tokio::test]
  async fn test_refresh_maps_401_to_session_expired() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/meals")
      .with_status(401)
      .with_body(r#"{"detail": "Could not validate credentials"}"#)
      .create_async()
      .await;

    let client = BackendClient::new(Url::parse(&server.url()).unwrap());
    let err = refresh(&client, &mock_session(), date(2025, 3, 10))
      .await
      .unwrap_err();

    assert!(matches!(err, RefreshError::SessionExpired));
  }

  #[tokio::test]
  async fn test_refresh_reports_failing_stage() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/meals")
      .with_status(200)
      .with_body("[]")
      .create_async()
      .await;
    server
      .mock("GET", "/logs")
      .match_query(Matcher::Any)
      .with_status(500)
      .with_body("database is down")
      .create_async()
      .await;

    let client = BackendClient::new(Url::parse(&server.url()).unwrap());
    let err = refresh(&client, &mock_session(), date(2025, 3, 10))
      .await
      .unwrap_err();

    match err {
      RefreshError::Fetch { stage, source } => {
        assert_eq!(stage, "log entries");
        assert!(matches!(source, ApiError::Status { status: 500, .. }));
      }
      other => panic!("expected Fetch, got {:?}", other),
    }
  }
}
