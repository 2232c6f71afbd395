use serde::{Deserialize, Serialize};

/// Response of `GET /ai/weekly-coach`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyCoach {
  pub praise: String,
  pub critique: String,
  pub next_week_goal: String,
  pub motivation: String,
  pub weekly_summary: WeeklyCoachSummary,
}

/// Figures the backend computed before handing them to the coach
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyCoachSummary {
  pub week_range: String,
  pub days_logged: u32,
  pub avg_calorie: f64,
  pub avg_protein: f64,
  pub calorie_target: f64,
  pub protein_target: f64,
  pub consistency_score: f64,
  pub calorie_trend: String,
  pub protein_trend: String,
  pub ai_acceptance_rate: f64,
  pub top_warning: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
  pub user_message: String,
  #[serde(default)]
  pub weekly_calories: Vec<f64>,
  #[serde(default)]
  pub weekly_protein: Vec<f64>,
  #[serde(default)]
  pub favorites: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
  pub reply: String,
  #[serde(default)]
  pub suggested_meals: Vec<String>,
  pub interaction_id: Option<i64>,
}

/// Body of `POST /ai/accept`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptSuggestion {
  pub ai_interaction_id: i64,
  pub meal_id: i64,
}

/// Response of `GET /ai/stats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiStats {
  pub total_interactions: u32,
  pub accepted_count: u32,
  /// accepted / total, 0 when there were no interactions
  pub acceptance_rate: f64,
}

/// One row of `GET /ai/top-meals`, most accepted first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopMeal {
  pub meal_name: String,
  pub count: u32,
}
