use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
  Success,
  Info,
  Warning,
  Danger,
}

impl Severity {
  pub fn as_str(&self) -> &'static str {
    match self {
      Severity::Success => "success",
      Severity::Info => "info",
      Severity::Warning => "warning",
      Severity::Danger => "danger",
    }
  }
}

/// One line of daily feedback. Has no identity; rebuilt on every evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackMessage {
  /// Name of the rule that produced the message
  pub rule: String,
  pub severity: Severity,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub note: Option<String>,
}
