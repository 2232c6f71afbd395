//! Macro aggregation over logged meals
//!
//! Joins log entries against the meal catalog and sums macros per day.
//! Nothing here rounds; rounding belongs to whoever displays the numbers.

use crate::models::{LogEntry, Meal};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of days in a weekly window
pub const WINDOW_DAYS: usize = 7;

/// ---------------------------------------------------------------------------
/// Meal Catalog
/// ---------------------------------------------------------------------------

/// Meals keyed by id for the log join
#[derive(Debug, Clone, Default)]
pub struct MealCatalog {
  meals: HashMap<i64, Meal>,
}

impl MealCatalog {
  pub fn new(meals: impl IntoIterator<Item = Meal>) -> Self {
    Self {
      meals: meals.into_iter().map(|m| (m.meal_id, m)).collect(),
    }
  }

  pub fn get(&self, meal_id: i64) -> Option<&Meal> {
    self.meals.get(&meal_id)
  }

  pub fn len(&self) -> usize {
    self.meals.len()
  }

  pub fn is_empty(&self) -> bool {
    self.meals.is_empty()
  }
}

/// ---------------------------------------------------------------------------
/// Daily Totals
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DailyMacros {
  pub calories: f64,
  pub protein: f64,
  pub carbs: f64,
  pub fat: f64,
}

impl DailyMacros {
  /// A day counts as logged when it has any calories
  pub fn has_data(&self) -> bool {
    self.calories > 0.0
  }

  fn add_portion(&mut self, meal: &Meal, portion: f64) {
    self.calories += meal.calories * portion;
    self.protein += meal.protein_g * portion;
    self.carbs += meal.carbs_g * portion;
    self.fat += meal.fat_g * portion;
  }
}

/// Sum the macros of `entries`. Entries pointing at unknown meals add nothing.
pub fn aggregate(catalog: &MealCatalog, entries: &[LogEntry]) -> DailyMacros {
  let mut totals = DailyMacros::default();

  for entry in entries {
    match catalog.get(entry.meal_id) {
      Some(meal) => totals.add_portion(meal, entry.portion),
      None => tracing::debug!(
        meal_id = entry.meal_id,
        log_id = entry.id,
        "Skipping log entry with unknown meal"
      ),
    }
  }

  totals
}

/// Group log entries by their calendar date
pub fn group_by_date(
  entries: impl IntoIterator<Item = LogEntry>,
) -> HashMap<NaiveDate, Vec<LogEntry>> {
  let mut grouped: HashMap<NaiveDate, Vec<LogEntry>> = HashMap::new();
  for entry in entries {
    grouped.entry(entry.log_date).or_default().push(entry);
  }
  grouped
}

/// ---------------------------------------------------------------------------
/// Weekly Window
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayTotals {
  pub date: NaiveDate,
  pub macros: DailyMacros,
}

/// Seven consecutive days ending at `end_date`, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyWindow {
  pub end_date: NaiveDate,
  pub days: [DayTotals; WINDOW_DAYS],
}

impl WeeklyWindow {
  /// First calendar date covered by a window ending at `end_date`
  pub fn start_for(end_date: NaiveDate) -> NaiveDate {
    end_date - Duration::days(WINDOW_DAYS as i64 - 1)
  }

  /// All dates of a window ending at `end_date`, ascending
  pub fn dates_ending(end_date: NaiveDate) -> [NaiveDate; WINDOW_DAYS] {
    let start = Self::start_for(end_date);
    std::array::from_fn(|i| start + Duration::days(i as i64))
  }

  /// Build a window from per-day totals already in ascending order
  pub fn from_macros(end_date: NaiveDate, macros: [DailyMacros; WINDOW_DAYS]) -> Self {
    let dates = Self::dates_ending(end_date);
    Self {
      end_date,
      days: std::array::from_fn(|i| DayTotals {
        date: dates[i],
        macros: macros[i],
      }),
    }
  }

  /// An all-zero window
  pub fn empty(end_date: NaiveDate) -> Self {
    Self::from_macros(end_date, [DailyMacros::default(); WINDOW_DAYS])
  }

  pub fn start_date(&self) -> NaiveDate {
    self.days[0].date
  }

  /// Days that have logged calories, oldest first
  pub fn days_with_data(&self) -> impl Iterator<Item = &DayTotals> + '_ {
    self.days.iter().filter(|d| d.macros.has_data())
  }

  pub fn days_with_data_count(&self) -> usize {
    self.days_with_data().count()
  }
}

/// Aggregate each of the seven days ending at `end_date` independently
pub fn aggregate_window(
  catalog: &MealCatalog,
  entries_by_date: &HashMap<NaiveDate, Vec<LogEntry>>,
  end_date: NaiveDate,
) -> WeeklyWindow {
  let dates = WeeklyWindow::dates_ending(end_date);
  let macros = dates.map(|date| {
    entries_by_date
      .get(&date)
      .map(|entries| aggregate(catalog, entries))
      .unwrap_or_default()
  });

  WeeklyWindow::from_macros(end_date, macros)
}

/// ---------------------------------------------------------------------------
/// Weekly Statistics
/// ---------------------------------------------------------------------------

/// Summary figures for the weekly overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyStats {
  pub days_with_data: usize,
  pub total_calories: f64,
  /// Average over days with data, 0 when nothing was logged
  pub avg_calories: f64,
  pub avg_protein: f64,
  /// Highest-calorie day; the earliest one wins a tie
  pub peak_day: Option<DayTotals>,
}

impl WeeklyStats {
  pub fn compute(window: &WeeklyWindow) -> Self {
    let logged: Vec<&DayTotals> = window.days_with_data().collect();
    let days_with_data = logged.len();

    let total_calories: f64 = window.days.iter().map(|d| d.macros.calories).sum();
    let total_protein: f64 = logged.iter().map(|d| d.macros.protein).sum();

    let (avg_calories, avg_protein) = if days_with_data > 0 {
      (
        total_calories / days_with_data as f64,
        total_protein / days_with_data as f64,
      )
    } else {
      (0.0, 0.0)
    };

    let peak_day = logged.iter().fold(None::<DayTotals>, |best, day| match best {
      Some(b) if b.macros.calories >= day.macros.calories => Some(b),
      _ => Some(**day),
    });

    Self {
      days_with_data,
      total_calories,
      avg_calories,
      avg_protein,
      peak_day,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Display Rounding
/// ---------------------------------------------------------------------------

/// Calories are shown as whole kcal
pub fn round_kcal(value: f64) -> f64 {
  value.round()
}

/// Grams are shown with one decimal
pub fn round_grams(value: f64) -> f64 {
  (value * 10.0).round() / 10.0
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_approx_eq;
  use crate::test_utils::{date, log_entry, mock_catalog};

  #[test]
  fn test_aggregate_applies_portions() {
    let catalog = mock_catalog();
    let day = date(2025, 3, 10);

    // Chicken bowl (600 kcal, 45p) x1.5 + oatmeal (300 kcal, 10p) x1
    let entries = vec![log_entry(1, 1, 1.5, day), log_entry(2, 2, 1.0, day)];
    let totals = aggregate(&catalog, &entries);

    assert_approx_eq!(totals.calories, 1200.0, 1e-9);
    assert_approx_eq!(totals.protein, 77.5, 1e-9);
    assert_approx_eq!(totals.carbs, 129.0, 1e-9);
    assert_approx_eq!(totals.fat, 28.0, 1e-9);
  }

  #[test]
  fn test_aggregate_skips_unknown_meal() {
    let catalog = mock_catalog();
    let day = date(2025, 3, 10);

    let with_unknown = vec![log_entry(1, 2, 1.0, day), log_entry(2, 999, 3.0, day)];
    let without = vec![log_entry(1, 2, 1.0, day)];

    assert_eq!(aggregate(&catalog, &with_unknown), aggregate(&catalog, &without));
    assert_eq!(
      aggregate(&catalog, &[log_entry(3, 999, 1.0, day)]),
      DailyMacros::default()
    );
  }

  #[test]
  fn test_aggregate_is_order_independent() {
    let catalog = mock_catalog();
    let day = date(2025, 3, 10);

    let forward = vec![
      log_entry(1, 1, 0.5, day),
      log_entry(2, 2, 2.0, day),
      log_entry(3, 3, 1.25, day),
    ];
    let mut reversed = forward.clone();
    reversed.reverse();

    let a = aggregate(&catalog, &forward);
    let b = aggregate(&catalog, &reversed);
    assert_approx_eq!(a.calories, b.calories, 1e-9);
    assert_approx_eq!(a.protein, b.protein, 1e-9);
    assert_approx_eq!(a.carbs, b.carbs, 1e-9);
    assert_approx_eq!(a.fat, b.fat, 1e-9);
  }

  #[test]
  fn test_aggregate_non_negative_for_non_negative_inputs() {
    let catalog = mock_catalog();
    let day = date(2025, 3, 10);
    let entries: Vec<LogEntry> = (0..20)
      .map(|i| log_entry(i, (i % 4) + 1, 0.25 * (i as f64 + 1.0), day))
      .collect();

    let totals = aggregate(&catalog, &entries);
    assert!(totals.calories >= 0.0);
    assert!(totals.protein >= 0.0);
    assert!(totals.carbs >= 0.0);
    assert!(totals.fat >= 0.0);
  }

  #[test]
  fn test_aggregate_window_has_seven_ascending_days() {
    let catalog = mock_catalog();
    let end = date(2025, 3, 2);

    // One entry inside the window, one just before it
    let grouped = group_by_date(vec![
      log_entry(1, 2, 1.0, date(2025, 2, 28)),
      log_entry(2, 2, 1.0, date(2025, 2, 23)),
    ]);
    let window = aggregate_window(&catalog, &grouped, end);

    assert_eq!(window.days.len(), WINDOW_DAYS);
    assert_eq!(window.start_date(), date(2025, 2, 24));
    assert_eq!(window.days[6].date, end);
    for pair in window.days.windows(2) {
      assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
    }

    assert_eq!(window.days_with_data_count(), 1);
    assert_approx_eq!(window.days[4].macros.calories, 300.0, 1e-9);
    assert_eq!(window.days[0].macros, DailyMacros::default());
  }

  #[test]
  fn test_aggregate_window_days_are_independent() {
    let catalog = mock_catalog();
    let end = date(2025, 3, 10);

    let grouped = group_by_date(vec![
      log_entry(1, 1, 1.0, date(2025, 3, 8)),
      log_entry(2, 2, 2.0, date(2025, 3, 9)),
    ]);
    let window = aggregate_window(&catalog, &grouped, end);

    assert_approx_eq!(window.days[4].macros.calories, 600.0, 1e-9);
    assert_approx_eq!(window.days[5].macros.calories, 600.0, 1e-9);
    assert_approx_eq!(window.days[5].macros.protein, 20.0, 1e-9);
    assert_eq!(window.days[6].macros, DailyMacros::default());
  }

  #[test]
  fn test_weekly_stats_average_over_logged_days() {
    let end = date(2025, 3, 10);
    let mut macros = [DailyMacros::default(); WINDOW_DAYS];
    macros[1] = DailyMacros { calories: 1800.0, protein: 90.0, ..Default::default() };
    macros[3] = DailyMacros { calories: 2400.0, protein: 110.0, ..Default::default() };
    macros[5] = DailyMacros { calories: 2400.0, protein: 70.0, ..Default::default() };
    let window = WeeklyWindow::from_macros(end, macros);

    let stats = WeeklyStats::compute(&window);

    assert_eq!(stats.days_with_data, 3);
    assert_approx_eq!(stats.total_calories, 6600.0, 1e-9);
    assert_approx_eq!(stats.avg_calories, 2200.0, 1e-9);
    assert_approx_eq!(stats.avg_protein, 90.0, 1e-9);

    // Tie on 2400 kcal resolves to the earlier day
    let peak = stats.peak_day.unwrap();
    assert_eq!(peak.date, date(2025, 3, 7));
  }

  #[test]
  fn test_weekly_stats_empty_window() {
    let stats = WeeklyStats::compute(&WeeklyWindow::empty(date(2025, 3, 10)));

    assert_eq!(stats.days_with_data, 0);
    assert_eq!(stats.avg_calories, 0.0);
    assert_eq!(stats.avg_protein, 0.0);
    assert!(stats.peak_day.is_none());
  }

  #[test]
  fn test_display_rounding() {
    assert_eq!(round_kcal(1199.5), 1200.0);
    assert_eq!(round_kcal(1199.4), 1199.0);
    assert_approx_eq!(round_grams(77.46), 77.5, 1e-9);
    assert_approx_eq!(round_grams(12.04), 12.0, 1e-9);
  }
}
