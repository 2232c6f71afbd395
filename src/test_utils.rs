//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock data factories
//! - Helper assertions

use crate::aggregate::{DailyMacros, MealCatalog, WeeklyWindow, WINDOW_DAYS};
use crate::models::{GoalType, Goals, LogEntry, Meal};
use crate::session::Session;
use chrono::NaiveDate;
use sqlx::SqlitePool;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

fn meal(meal_id: i64, name: &str, calories: f64, protein: f64, carbs: f64, fat: f64) -> Meal {
  Meal {
    meal_id,
    meal_name: name.to_string(),
    calories,
    protein_g: protein,
    carbs_g: carbs,
    fat_g: fat,
  }
}

/// Four meals:
/// 1 chicken bowl (600 kcal, 45p / 60c / 14f)
/// 2 oatmeal (300 kcal, 10p / 39c / 7f)
/// 3 greek yogurt (150 kcal, 15p / 8c / 4f)
/// 4 lentil soup (320 kcal, 18p / 40c / 9f)
pub fn mock_meals() -> Vec<Meal> {
  vec![
    meal(1, "Chicken bowl", 600.0, 45.0, 60.0, 14.0),
    meal(2, "Oatmeal", 300.0, 10.0, 39.0, 7.0),
    meal(3, "Greek yogurt", 150.0, 15.0, 8.0, 4.0),
    meal(4, "Lentil soup", 320.0, 18.0, 40.0, 9.0),
  ]
}

pub fn mock_catalog() -> MealCatalog {
  MealCatalog::new(mock_meals())
}

pub fn log_entry(id: i64, meal_id: i64, portion: f64, log_date: NaiveDate) -> LogEntry {
  LogEntry {
    id,
    meal_id,
    portion,
    log_date,
  }
}

/// Totals with only calories and protein set
pub fn macros(calories: f64, protein: f64) -> DailyMacros {
  DailyMacros {
    calories,
    protein,
    ..Default::default()
  }
}

/// 2000 kcal / 100 g protein
pub fn mock_goals(goal_type: GoalType) -> Goals {
  Goals {
    daily_calorie_target: 2000,
    daily_protein_target: 100,
    goal_type,
  }
}

/// Window ending at `end` from (calories, protein) pairs, oldest first
pub fn window_from(end: NaiveDate, days: [(f64, f64); WINDOW_DAYS]) -> WeeklyWindow {
  WeeklyWindow::from_macros(end, days.map(|(calories, protein)| macros(calories, protein)))
}

pub fn mock_session() -> Session {
  Session::new("test-token", "test@example.com")
}

/// ---------------------------------------------------------------------------
/// Assertion Helpers
/// ---------------------------------------------------------------------------

/// Assert that two floating point values are approximately equal
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_creates_session_table() {
    let pool = setup_test_db().await;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM session")
      .fetch_one(&pool)
      .await
      .unwrap();
    assert_eq!(count, 0);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_catalog_is_non_negative() {
    let catalog = mock_catalog();
    assert_eq!(catalog.len(), 4);
    for id in 1..=4 {
      let meal = catalog.get(id).unwrap();
      assert!(meal.calories >= 0.0 && meal.protein_g >= 0.0);
      assert!(meal.carbs_g >= 0.0 && meal.fat_g >= 0.0);
    }
  }

  #[test]
  fn test_window_from_keeps_order() {
    let mut days = [(0.0, 0.0); WINDOW_DAYS];
    days[6] = (1500.0, 80.0);
    let window = window_from(date(2025, 3, 10), days);

    assert_eq!(window.days[6].date, date(2025, 3, 10));
    assert_eq!(window.days[6].macros, macros(1500.0, 80.0));
    assert_eq!(window.days_with_data_count(), 1);
  }

  #[test]
  fn test_assert_approx_eq_macro() {
    assert_approx_eq!(1.0_f64, 1.0001_f64, 0.001);
  }

  #[test]
  #[should_panic(expected = "Values not approximately equal")]
  fn test_assert_approx_eq_macro_fails() {
    assert_approx_eq!(1.0_f64, 1.1_f64, 0.001);
  }
}
