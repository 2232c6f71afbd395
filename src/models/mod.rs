pub mod coach;
pub mod feedback;
pub mod goals;
pub mod meal;
pub mod profile;
pub mod progress;

pub use coach::{
  AcceptSuggestion, AiStats, ChatReply, ChatRequest, TopMeal, WeeklyCoach, WeeklyCoachSummary,
};
pub use feedback::{FeedbackMessage, Severity};
pub use goals::{GoalType, Goals};
pub use meal::{Favorite, LogEntry, Meal};
pub use profile::{Activity, ActivityUpdate, Gender, Profile, ProfileUpdate};
pub use progress::{AiEffectSummary, CalorieStabilitySummary, ProgressSummary, ProteinSummary};
