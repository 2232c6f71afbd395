use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
}

/// Body of `POST /profile`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
  pub height_cm: u32,
  pub weight_kg: f64,
  pub gender: Gender,
  pub birth_year: i32,
}

/// Body measurements plus the BMR the backend derives from them.
/// Everything but `has_profile` is absent until a profile exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
  #[serde(default = "default_has_profile")]
  pub has_profile: bool,
  pub height_cm: Option<u32>,
  pub weight_kg: Option<f64>,
  pub gender: Option<Gender>,
  pub birth_year: Option<i32>,
  pub age: Option<i32>,
  pub bmr: Option<f64>,
}

// POST /profile answers without the flag
fn default_has_profile() -> bool {
  true
}

/// Body of `POST /profile/activity`. The backend uses today when no date is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityUpdate {
  pub steps: u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub activity_date: Option<NaiveDate>,
}

/// Daily energy figures for the logged step count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
  pub steps: u32,
  /// sedentary, light, moderate or active
  pub activity_level: String,
  pub activity_multiplier: f64,
  #[serde(default)]
  pub bmr: f64,
  pub tdee: f64,
  pub target_calories: i64,
}
