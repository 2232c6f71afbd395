use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Catalog entry as served by `GET /meals`. Macro values are per one portion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
  pub meal_id: i64,
  pub meal_name: String,
  #[serde(default)]
  pub calories: f64,
  #[serde(default)]
  pub protein_g: f64,
  #[serde(default)]
  pub carbs_g: f64,
  #[serde(default)]
  pub fat_g: f64,
}

/// A meal eaten on a given day. Never updated, only created or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
  pub id: i64,
  pub meal_id: i64,
  #[serde(default = "default_portion")]
  pub portion: f64,
  pub log_date: NaiveDate,
}

fn default_portion() -> f64 {
  1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
  #[serde(default)]
  pub id: Option<i64>,
  pub meal_id: i64,
}
