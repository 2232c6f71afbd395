use serde::{Deserialize, Serialize};

/// Dietary objective. The backend stores Turkish tags; English tags are
/// accepted on input as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GoalType {
  #[serde(rename = "kilo_verme", alias = "reduce")]
  Reduce,
  #[default]
  #[serde(rename = "koruma", alias = "maintain")]
  Maintain,
  #[serde(rename = "kilo_alma", alias = "gain")]
  Gain,
}

impl std::fmt::Display for GoalType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Reduce => write!(f, "reduce"),
      Self::Maintain => write!(f, "maintain"),
      Self::Gain => write!(f, "gain"),
    }
  }
}

impl std::str::FromStr for GoalType {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "reduce" | "kilo_verme" => Ok(Self::Reduce),
      "maintain" | "koruma" => Ok(Self::Maintain),
      "gain" | "kilo_alma" => Ok(Self::Gain),
      _ => Err(format!("Unknown goal type: {}", s)),
    }
  }
}

/// The single active goal record of a user, overwritten wholesale on edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goals {
  pub daily_calorie_target: u32,
  pub daily_protein_target: u32,
  #[serde(default)]
  pub goal_type: GoalType,
}

impl Default for Goals {
  fn default() -> Self {
    Self {
      daily_calorie_target: 2000,
      daily_protein_target: 100,
      goal_type: GoalType::Maintain,
    }
  }
}

impl Goals {
  pub fn calorie_target(&self) -> f64 {
    self.daily_calorie_target as f64
  }

  pub fn protein_target(&self) -> f64 {
    self.daily_protein_target as f64
  }

  /// Both targets must be positive for any ratio to make sense
  pub fn has_targets(&self) -> bool {
    self.daily_calorie_target > 0 && self.daily_protein_target > 0
  }
}
