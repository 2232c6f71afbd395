//! Before/after progress comparison
//!
//! Splits a user's logged days at the date of their first AI interaction
//! and compares protein compliance and calorie stability on each side.
//! The backend publishes the same comparison at `GET /analysis/progress`;
//! `load` fetches it, `ProgressReport::compute` derives it from local history.

use crate::aggregate::DailyMacros;
use crate::api::{ApiError, BackendClient};
use crate::models::{
  AiEffectSummary, CalorieStabilitySummary, Goals, ProgressSummary, ProteinSummary,
};
use crate::session::Session;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Minimum logged days on each side before the comparison means anything
pub const MIN_DAYS_REQUIRED: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinComparison {
  /// Mean of daily protein / target, before the pivot
  pub before: f64,
  pub after: f64,
  pub delta: f64,
}

impl ProteinComparison {
  /// Signed whole-percent change, truncated toward zero, e.g. "+12%" or "-5%"
  pub fn change_pct(&self) -> String {
    let pct = (self.delta * 100.0).trunc() as i64;
    if self.delta > 0.0 {
      format!("+{}%", pct)
    } else {
      format!("{}%", pct)
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalorieStability {
  /// Mean absolute deviation from the calorie target, in kcal
  pub before: f64,
  pub after: f64,
}

impl CalorieStability {
  /// Positive when the deviation shrank
  pub fn improvement(&self) -> f64 {
    self.before - self.after
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionEffect {
  pub accepted_days_protein: f64,
  pub other_days_protein: f64,
  /// Every accepted date, including ones outside the compared days
  pub accepted_count: usize,
  pub other_count: usize,
}

impl SuggestionEffect {
  pub fn is_effective(&self) -> bool {
    self.accepted_days_protein > self.other_days_protein
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
  pub pivot_date: NaiveDate,
  pub before_days: usize,
  pub after_days: usize,
  pub protein: ProteinComparison,
  pub calorie_stability: CalorieStability,
  pub ai_effect: SuggestionEffect,
}

impl ProgressReport {
  /// Compare days before `pivot_date` against the pivot and later.
  /// Days without logged calories are ignored on both sides.
  pub fn compute(
    daily: &BTreeMap<NaiveDate, DailyMacros>,
    goals: &Goals,
    pivot_date: NaiveDate,
    accepted_dates: &HashSet<NaiveDate>,
  ) -> Self {
    let (before, after): (Vec<_>, Vec<_>) = daily
      .iter()
      .filter(|(_, m)| m.has_data())
      .partition(|(date, _)| **date < pivot_date);

    let before_macros: Vec<&DailyMacros> = before.iter().map(|(_, m)| *m).collect();
    let after_macros: Vec<&DailyMacros> = after.iter().map(|(_, m)| *m).collect();

    let protein_before = protein_compliance(&before_macros, goals);
    let protein_after = protein_compliance(&after_macros, goals);

    let (accepted, other): (Vec<_>, Vec<_>) = after
      .iter()
      .partition(|(date, _)| accepted_dates.contains(*date));
    let accepted_macros: Vec<&DailyMacros> = accepted.iter().map(|(_, m)| *m).collect();
    let other_macros: Vec<&DailyMacros> = other.iter().map(|(_, m)| *m).collect();

    Self {
      pivot_date,
      before_days: before.len(),
      after_days: after.len(),
      protein: ProteinComparison {
        before: protein_before,
        after: protein_after,
        delta: protein_after - protein_before,
      },
      calorie_stability: CalorieStability {
        before: calorie_deviation(&before_macros, goals),
        after: calorie_deviation(&after_macros, goals),
      },
      ai_effect: SuggestionEffect {
        accepted_days_protein: protein_compliance(&accepted_macros, goals),
        other_days_protein: protein_compliance(&other_macros, goals),
        accepted_count: accepted_dates.len(),
        other_count: other.len(),
      },
    }
  }

  /// Both sides have enough logged days to compare
  pub fn is_sufficient(&self) -> bool {
    self.before_days >= MIN_DAYS_REQUIRED && self.after_days >= MIN_DAYS_REQUIRED
  }

  /// Same rounding as the backend: ratios to two decimals, kcal truncated
  pub fn summary(&self) -> ProgressSummary {
    let stability = &self.calorie_stability;
    ProgressSummary {
      protein: ProteinSummary {
        before: round2(self.protein.before),
        after: round2(self.protein.after),
        delta: round2(self.protein.delta),
        change_pct: self.protein.change_pct(),
      },
      calorie_stability: CalorieStabilitySummary {
        before: stability.before.trunc() as i64,
        after: stability.after.trunc() as i64,
        improvement: stability.improvement().trunc() as i64,
      },
      ai_effect: AiEffectSummary {
        accepted_days_protein: round2(self.ai_effect.accepted_days_protein),
        other_days_protein: round2(self.ai_effect.other_days_protein),
        accepted_count: self.ai_effect.accepted_count as u32,
        other_count: self.ai_effect.other_count as u32,
      },
    }
  }
}

fn round2(value: f64) -> f64 {
  (value * 100.0).round() / 100.0
}

/// Fetch the backend's progress comparison. `None` until the user has goals
/// and at least one AI interaction.
pub async fn load(
  client: &BackendClient,
  session: &Session,
) -> Result<Option<ProgressSummary>, ApiError> {
  let summary = client.progress(session).await?;
  if let Some(s) = &summary {
    tracing::info!(
      change = %s.protein.change_pct,
      calorie_improvement = s.calorie_stability.improvement,
      "Progress report loaded"
    );
  }
  Ok(summary)
}

fn protein_compliance(days: &[&DailyMacros], goals: &Goals) -> f64 {
  if days.is_empty() || goals.daily_protein_target == 0 {
    return 0.0;
  }
  let target = goals.protein_target();
  days.iter().map(|d| d.protein / target).sum::<f64>() / days.len() as f64
}

fn calorie_deviation(days: &[&DailyMacros], goals: &Goals) -> f64 {
  if days.is_empty() {
    return 0.0;
  }
  let target = goals.calorie_target();
  days.iter().map(|d| (d.calories - target).abs()).sum::<f64>() / days.len() as f64
}
