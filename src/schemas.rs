use chrono::{DateTime, Utc};
use common::Currency;
use moka::future::Cache;
use notify::{Mailer, NotificationOutcome};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::document_check::{DocumentCheckClient, DocumentKind, DocumentValidity};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Outbound templated-email seam
    pub mailer: Arc<dyn Mailer>,
    /// Client of the MVCR invalid-documents register
    pub document_checker: DocumentCheckClient,
    /// Cache of register verdicts, keyed by document kind + number
    pub document_cache: Cache<String, DocumentValidity>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db)
            .field("document_checker", &self.document_checker)
            .finish_non_exhaustive()
    }
}

/// One payout line in a recorded batch
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PayoutItem {
    /// Investor account the amount was paid out to
    pub account_id: i32,
    /// Paid-out amount
    #[schema(value_type = String)]
    pub amount: Decimal,
    /// Currency of the amount
    pub currency: Currency,
}

/// Request body for recording one executed payout batch
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreatePayoutBatchRequest {
    /// The executed payouts, one entry per payment
    pub payouts: Vec<PayoutItem>,
}

/// How the partner notification run for a batch went
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationSummary {
    /// "completed" or "lookup_failed"
    pub status: String,
    /// Partners that received a summary email
    pub notified: usize,
    /// Partners skipped because they have no email address
    pub skipped_missing_email: usize,
    /// Partner emails that failed to send
    pub failed_sends: usize,
}

impl From<NotificationOutcome> for NotificationSummary {
    fn from(outcome: NotificationOutcome) -> Self {
        match outcome {
            NotificationOutcome::Completed {
                notified,
                skipped_missing_email,
                failed_sends,
            } => Self {
                status: "completed".to_string(),
                notified,
                skipped_missing_email,
                failed_sends,
            },
            NotificationOutcome::LookupFailed => Self {
                status: "lookup_failed".to_string(),
                notified: 0,
                skipped_missing_email: 0,
                failed_sends: 0,
            },
        }
    }
}

/// Response body for a recorded payout batch
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PayoutBatchResponse {
    pub opportunity_id: i32,
    /// Number of payment rows written
    pub recorded: usize,
    /// Outcome of the partner notification run triggered by the batch
    pub notification: NotificationSummary,
}

/// Request body for a document-validity check
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct DocumentCheckRequest {
    /// Document number as printed on the document
    pub number: String,
    /// Kind of document the number belongs to
    pub kind: DocumentKind,
}

/// Response body for a document-validity check
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentCheckResponse {
    pub is_valid: bool,
    /// Present when the document is listed in the register
    pub invalid_from: Option<DateTime<Utc>>,
}

impl From<DocumentValidity> for DocumentCheckResponse {
    fn from(validity: DocumentValidity) -> Self {
        match validity {
            DocumentValidity::Valid => Self {
                is_valid: true,
                invalid_from: None,
            },
            DocumentValidity::Invalid { invalid_from } => Self {
                is_valid: false,
                invalid_from: Some(invalid_from),
            },
        }
    }
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::payouts::record_payout_batch,
        crate::handlers::document_checks::check_document,
    ),
    components(
        schemas(
            ApiResponse<PayoutBatchResponse>,
            ApiResponse<DocumentCheckResponse>,
            ErrorResponse,
            HealthResponse,
            PayoutItem,
            CreatePayoutBatchRequest,
            NotificationSummary,
            PayoutBatchResponse,
            DocumentCheckRequest,
            DocumentCheckResponse,
            DocumentKind,
            Currency,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "payouts", description = "Payout batch recording and partner notification"),
        (name = "document-checks", description = "Czech ID-document validity checks"),
    ),
    info(
        title = "Investd API",
        description = "Investment-platform backend: payout recording, distribution-partner notifications, and document validity checks",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
