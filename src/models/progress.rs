use serde::{Deserialize, Serialize};

/// Protein compliance before and after the first AI interaction, as ratios
/// of the daily target rounded to two decimals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinSummary {
  pub before: f64,
  pub after: f64,
  pub delta: f64,
  /// e.g. "+12%" or "-5%"
  pub change_pct: String,
}

/// Mean absolute distance from the calorie target, whole kcal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalorieStabilitySummary {
  pub before: i64,
  pub after: i64,
  pub improvement: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiEffectSummary {
  pub accepted_days_protein: f64,
  pub other_days_protein: f64,
  pub accepted_count: u32,
  pub other_count: u32,
}

/// Shape of `GET /analysis/progress`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
  pub protein: ProteinSummary,
  pub calorie_stability: CalorieStabilitySummary,
  pub ai_effect: AiEffectSummary,
}
