//! Deterministic daily feedback
//!
//! A fixed, ordered table of threshold rules evaluated against today's
//! totals, the weekly window and the user's goals. Every rule that fires
//! contributes one message, in table order. The backend coach interprets
//! these numbers; this module never calls out to it.

use crate::aggregate::{DailyMacros, DayTotals, WeeklyWindow};
use crate::models::{FeedbackMessage, GoalType, Goals, Severity};

/// ---------------------------------------------------------------------------
/// Thresholds
/// ---------------------------------------------------------------------------

pub const PROTEIN_LOW_RATIO: f64 = 0.5;
pub const PROTEIN_TARGET_BAND: (f64, f64) = (0.9, 1.1);
pub const CALORIE_OVER_RATIO: f64 = 1.2;
pub const CALORIE_UNDER_RATIO: f64 = 0.5;
pub const STREAK_DAYS: usize = 3;
pub const STREAK_PROTEIN_RATIO: f64 = 0.7;
pub const VOLATILITY_MIN_DAYS: usize = 3;
pub const VOLATILITY_RATIO: f64 = 0.3;
pub const GAIN_UNDER_RATIO: f64 = 0.8;
pub const WEEKLY_PROTEIN_MIN_DAYS: usize = 5;
pub const WEEKLY_PROTEIN_RATIO: f64 = 0.9;

/// Rule name of the message emitted when nothing else fires
pub const ALL_CLEAR_RULE: &str = "all_clear";

/// ---------------------------------------------------------------------------
/// Rule Input
/// ---------------------------------------------------------------------------

/// Everything a rule may look at, with the shared ratios computed once
pub struct RuleInput<'a> {
  pub today: &'a DailyMacros,
  pub goals: &'a Goals,
  pub window: &'a WeeklyWindow,
  pub protein_ratio: f64,
  pub calorie_ratio: f64,
  logged_days: Vec<&'a DayTotals>,
}

impl<'a> RuleInput<'a> {
  pub fn new(today: &'a DailyMacros, goals: &'a Goals, window: &'a WeeklyWindow) -> Self {
    Self {
      today,
      goals,
      window,
      protein_ratio: today.protein / goals.protein_target(),
      calorie_ratio: today.calories / goals.calorie_target(),
      logged_days: window.days_with_data().collect(),
    }
  }

  /// Window days with logged calories, oldest first
  pub fn logged_days(&self) -> &[&'a DayTotals] {
    &self.logged_days
  }

  /// The most recent `n` logged days, or `None` if there are fewer
  fn last_logged(&self, n: usize) -> Option<&[&'a DayTotals]> {
    let len = self.logged_days.len();
    if len < n {
      return None;
    }
    Some(&self.logged_days[len - n..])
  }

  /// Mean absolute calorie deviation from target over logged days
  pub fn calorie_deviation(&self) -> Option<f64> {
    if self.logged_days.is_empty() {
      return None;
    }
    let target = self.goals.calorie_target();
    let total: f64 = self
      .logged_days
      .iter()
      .map(|d| (d.macros.calories - target).abs())
      .sum();
    Some(total / self.logged_days.len() as f64)
  }

  /// Mean protein over logged days as a fraction of the target
  pub fn weekly_protein_ratio(&self) -> Option<f64> {
    if self.logged_days.is_empty() {
      return None;
    }
    let total: f64 = self.logged_days.iter().map(|d| d.macros.protein).sum();
    Some(total / self.logged_days.len() as f64 / self.goals.protein_target())
  }
}

/// Percentage for display, rounded only at the very end
fn pct(ratio: f64) -> i64 {
  (ratio * 100.0).round() as i64
}

/// ---------------------------------------------------------------------------
/// Rule Table
/// ---------------------------------------------------------------------------

/// One declarative rule: when `applies` holds, emit `message` at `severity`
pub struct Rule {
  pub name: &'static str,
  pub severity: Severity,
  pub applies: fn(&RuleInput) -> bool,
  pub message: fn(&RuleInput) -> String,
  pub note: Option<&'static str>,
}

impl Rule {
  fn evaluate(&self, input: &RuleInput) -> Option<FeedbackMessage> {
    if !(self.applies)(input) {
      return None;
    }
    Some(FeedbackMessage {
      rule: self.name.to_string(),
      severity: self.severity,
      message: (self.message)(input),
      note: self.note.map(str::to_string),
    })
  }
}

/// Evaluation order is the order of this table
pub static RULES: &[Rule] = &[
  Rule {
    name: "protein_low",
    severity: Severity::Warning,
    applies: |i| i.protein_ratio < PROTEIN_LOW_RATIO && i.today.protein > 0.0,
    message: |i| {
      format!(
        "You're only at {}% of your protein target today.",
        pct(i.protein_ratio)
      )
    },
    note: Some("A high-protein dinner would close most of the gap."),
  },
  Rule {
    name: "protein_on_target",
    severity: Severity::Success,
    applies: |i| {
      let (low, high) = PROTEIN_TARGET_BAND;
      i.protein_ratio >= low && i.protein_ratio <= high
    },
    message: |i| format!("You're close to your protein target! ({}%)", pct(i.protein_ratio)),
    note: None,
  },
  Rule {
    name: "calorie_over",
    severity: Severity::Danger,
    applies: |i| i.calorie_ratio > CALORIE_OVER_RATIO,
    message: |i| {
      format!(
        "You're {}% over your calorie target.",
        pct(i.calorie_ratio - 1.0)
      )
    },
    note: Some("Try lighter meals tomorrow."),
  },
  Rule {
    name: "calorie_under",
    severity: Severity::Info,
    applies: |i| i.calorie_ratio < CALORIE_UNDER_RATIO && i.today.calories > 0.0,
    message: |i| {
      format!(
        "You've reached {}% of your daily calorie target so far.",
        pct(i.calorie_ratio)
      )
    },
    note: None,
  },
  Rule {
    name: "protein_streak_low",
    severity: Severity::Danger,
    applies: |i| {
      let floor = i.goals.protein_target() * STREAK_PROTEIN_RATIO;
      i.last_logged(STREAK_DAYS)
        .is_some_and(|days| days.iter().all(|d| d.macros.protein < floor))
    },
    message: |_| "Protein has been below target 3 days running.".to_string(),
    note: Some("Below 70% of the protein target on each of the last 3 logged days."),
  },
  Rule {
    name: "calorie_volatility",
    severity: Severity::Warning,
    applies: |i| {
      i.logged_days().len() >= VOLATILITY_MIN_DAYS
        && i
          .calorie_deviation()
          .is_some_and(|dev| dev > i.goals.calorie_target() * VOLATILITY_RATIO)
    },
    message: |i| {
      format!(
        "Your daily calories swing by about {} kcal from your target.",
        i.calorie_deviation().unwrap_or_default().round() as i64
      )
    },
    note: Some("Mean absolute deviation from the calorie target over logged days."),
  },
  Rule {
    name: "reduce_over_target",
    severity: Severity::Info,
    applies: |i| i.goals.goal_type == GoalType::Reduce && i.calorie_ratio > 1.0,
    message: |_| "You're aiming to lose weight, keep an eye on calories.".to_string(),
    note: None,
  },
  Rule {
    name: "gain_under_target",
    severity: Severity::Info,
    applies: |i| {
      i.goals.goal_type == GoalType::Gain
        && i.calorie_ratio < GAIN_UNDER_RATIO
        && i.today.calories > 0.0
    },
    message: |_| "You're aiming to gain weight, try to eat a bit more.".to_string(),
    note: None,
  },
  Rule {
    name: "weekly_protein_on_track",
    severity: Severity::Success,
    applies: |i| {
      i.logged_days().len() >= WEEKLY_PROTEIN_MIN_DAYS
        && i
          .weekly_protein_ratio()
          .is_some_and(|ratio| ratio >= WEEKLY_PROTEIN_RATIO)
    },
    message: |i| {
      format!(
        "Great week for protein: {}% of target on average.",
        pct(i.weekly_protein_ratio().unwrap_or_default())
      )
    },
    note: None,
  },
];

/// ---------------------------------------------------------------------------
/// Evaluation
/// ---------------------------------------------------------------------------

/// Run every rule in order. No goals means nothing to compare against.
pub fn evaluate(
  today: &DailyMacros,
  goals: Option<&Goals>,
  window: &WeeklyWindow,
) -> Vec<FeedbackMessage> {
  let goals = match goals {
    Some(g) if g.has_targets() => g,
    Some(_) => {
      tracing::warn!("Goals have a zero target, skipping feedback");
      return Vec::new();
    }
    None => return Vec::new(),
  };

  let input = RuleInput::new(today, goals, window);
  let mut messages: Vec<FeedbackMessage> =
    RULES.iter().filter_map(|rule| rule.evaluate(&input)).collect();

  if messages.is_empty() {
    messages.push(FeedbackMessage {
      rule: ALL_CLEAR_RULE.to_string(),
      severity: Severity::Success,
      message: "Everything looks good for today!".to_string(),
      note: None,
    });
  }

  tracing::debug!(
    fired = messages.len(),
    rules = ?messages.iter().map(|m| m.rule.as_str()).collect::<Vec<_>>(),
    "Evaluated feedback rules"
  );

  messages
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
