use thiserror::Error;

/// Error types for the notification module
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Error from building or calling the mail API
    #[error("Mail error: {0}")]
    Mail(String),

    /// Error from payout data that cannot be processed
    #[error("Payout error: {0}")]
    Payout(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(error: reqwest::Error) -> Self {
        NotifyError::Mail(error.to_string())
    }
}

/// Type alias for Result with NotifyError
pub type Result<T> = std::result::Result<T, NotifyError>;
