use crate::document_check::{DocumentCheckClient, REGISTER_URL};
use crate::schemas::AppState;
use anyhow::Result;
use moka::future::Cache;
use notify::{HttpMailer, Mailer, NoopMailer};
use sea_orm::Database;
use std::sync::Arc;
use std::time::Duration;

/// Initialize application state for the given database.
///
/// Mail and register endpoints come from the environment:
/// `MAIL_API_URL`/`MAIL_API_TOKEN` select the mail service (without a URL
/// emails are logged and dropped), `DOCUMENT_REGISTER_URL` overrides the
/// MVCR register endpoint, which is mostly useful in tests.
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    dotenvy::dotenv().ok();

    // Connect to database
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    let mailer: Arc<dyn Mailer> = match std::env::var("MAIL_API_URL") {
        Ok(api_url) => {
            let api_token = std::env::var("MAIL_API_TOKEN").ok();
            tracing::info!("Using mail API at {}", api_url);
            Arc::new(HttpMailer::new(api_url, api_token)?)
        }
        Err(_) => {
            tracing::warn!("MAIL_API_URL not set; partner emails will be logged and dropped");
            Arc::new(NoopMailer)
        }
    };

    let register_url =
        std::env::var("DOCUMENT_REGISTER_URL").unwrap_or_else(|_| REGISTER_URL.to_string());
    let document_checker = DocumentCheckClient::new(register_url)?;

    // Register verdicts change at most daily; cache them for an hour.
    let document_cache = Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(3600))
        .build();

    Ok(AppState {
        db,
        mailer,
        document_checker,
        document_cache,
    })
}
