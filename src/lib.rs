pub mod aggregate;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod feedback;
pub mod models;
pub mod progress;
pub mod session;

#[cfg(test)]
mod test_utils;

pub use aggregate::{
  aggregate, aggregate_window, DailyMacros, MealCatalog, WeeklyStats, WeeklyWindow,
};
pub use api::{ApiError, BackendClient};
pub use config::AppConfig;
pub use dashboard::{refresh, DashboardSnapshot, RefreshError};
pub use feedback::evaluate;
pub use progress::ProgressReport;
pub use session::{Session, SessionStore};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// `RUST_LOG` wins over the configured filter when set
pub fn init_tracing(default_filter: &str) {
  let env_filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

  tracing_subscriber::registry()
    .with(env_filter)
    .with(tracing_subscriber::fmt::layer())
    .init();
}

/// Refresh today's dashboard for the stored session and print it as JSON
pub async fn run() -> Result<(), BoxError> {
  let config = AppConfig::from_env()?;
  init_tracing(&config.log_filter);

  tracing::info!("Backend: {}", config.api_base_url);
  tracing::info!("Database path: {:?}", config.db_path);

  let pool = db::initialize_db(&config.db_path).await?;
  let store = SessionStore::new(pool);
  let client = BackendClient::new(config.api_base_url.clone());

  let session = match store.load().await? {
    Some(session) => session,
    None => match (&config.email, &config.password) {
      (Some(email), Some(password)) => {
        let session = client.login(email, password).await?;
        store.save(&session).await?;
        session
      }
      _ => {
        tracing::warn!("No stored session. Set NUTRITION_EMAIL and NUTRITION_PASSWORD to log in.");
        return Ok(());
      }
    },
  };

  let today = chrono::Local::now().date_naive();
  match refresh(&client, &session, today).await {
    Ok(snapshot) => {
      for message in &snapshot.feedback {
        tracing::info!(
          rule = %message.rule,
          severity = message.severity.as_str(),
          "{}",
          message.message
        );
      }

      // Progress is optional output; errors are only logged
      let progress = match progress::load(&client, &session).await {
        Ok(summary) => summary,
        Err(e) => {
          tracing::warn!("Progress report unavailable: {}", e);
          None
        }
      };

      let output = serde_json::json!({
        "dashboard": snapshot,
        "progress": progress,
      });
      println!("{}", serde_json::to_string_pretty(&output)?);
      Ok(())
    }
    Err(RefreshError::SessionExpired) => {
      store.clear().await?;
      tracing::warn!("Session expired and was cleared. Log in again.");
      Ok(())
    }
    Err(e) => Err(e.into()),
  }
}
