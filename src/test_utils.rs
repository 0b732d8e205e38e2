#[cfg(test)]
pub mod test_utils {
    use crate::document_check::{DocumentCheckClient, REGISTER_URL};
    use crate::router::create_router;
    use crate::schemas::AppState;
    use async_trait::async_trait;
    use axum::Router;
    use migration::{Migrator, MigratorTrait};
    use moka::future::Cache;
    use notify::{EmailMessage, EmailTemplate, Mailer, NotifyError};
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
    use std::sync::{Arc, Mutex};

    /// One email captured by the [`RecordingMailer`].
    #[derive(Debug, Clone)]
    pub struct SentEmail {
        pub subject: String,
        pub to: String,
        pub data: serde_json::Value,
    }

    /// Mailer that records sends instead of delivering them.
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<SentEmail>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(
            &self,
            subject: &str,
            _template: EmailTemplate,
            message: EmailMessage,
        ) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(SentEmail {
                subject: subject.to_string(),
                to: message.to.email,
                data: message.email_data,
            });
            Ok(())
        }
    }

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState plus handles to its test doubles
    pub async fn setup_test_app_state() -> (AppState, Arc<RecordingMailer>) {
        let db = setup_test_db().await;
        let mailer = Arc::new(RecordingMailer::default());

        let state = AppState {
            db,
            mailer: mailer.clone(),
            document_checker: DocumentCheckClient::new(REGISTER_URL.to_string())
                .expect("Failed to build document-check client"),
            document_cache: Cache::new(100),
        };

        (state, mailer)
    }

    /// Create a router backed by a fresh in-memory database
    pub async fn setup_test_app() -> (Router, AppState, Arc<RecordingMailer>) {
        let (state, mailer) = setup_test_app_state().await;
        (create_router(state.clone()), state, mailer)
    }

    /// Insert an account row; partners are accounts too.
    pub async fn insert_account(
        db: &DatabaseConnection,
        email: Option<&str>,
        name: Option<&str>,
        surname: Option<&str>,
        partner_id: Option<i32>,
    ) -> model::entities::account::Model {
        model::entities::account::ActiveModel {
            email: Set(email.map(str::to_string)),
            name: Set(name.map(str::to_string)),
            surname: Set(surname.map(str::to_string)),
            is_corporate: Set(false),
            corporate_name: Set(None),
            distribution_partner_account_id: Set(partner_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to insert account")
    }

    /// Insert a test opportunity.
    pub async fn insert_opportunity(
        db: &DatabaseConnection,
        text_id: &str,
        title: &str,
    ) -> model::entities::opportunity::Model {
        model::entities::opportunity::ActiveModel {
            text_id: Set(text_id.to_string()),
            title: Set(title.to_string()),
            title_en: Set(None),
            subtitle: Set(None),
            currency: Set("CZK".to_string()),
            fundraising_target: Set(rust_decimal::Decimal::new(10_000_000, 0)),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to insert opportunity")
    }
}
