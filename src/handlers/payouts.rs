use crate::schemas::{ApiResponse, AppState, CreatePayoutBatchRequest, PayoutBatchResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use model::entities::{opportunity, payment};
use notify::{OpportunitySummary, PayoutRecord, notify_partners_of_payouts};
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use tracing::{debug, error, info, instrument, trace, warn};

/// Record one executed payout batch for an opportunity and notify the
/// affected distribution partners.
///
/// The notification run happens after the payments are written; its
/// failure shows up in the response summary but never fails the request,
/// because the payouts themselves have already been executed.
#[utoipa::path(
    post,
    path = "/api/v1/opportunities/{opportunity_id}/payouts",
    tag = "payouts",
    request_body = CreatePayoutBatchRequest,
    params(
        ("opportunity_id" = i32, Path, description = "Opportunity the batch was disbursed for")
    ),
    responses(
        (status = 201, description = "Payout batch recorded", body = ApiResponse<PayoutBatchResponse>),
        (status = 404, description = "Opportunity not found", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn record_payout_batch(
    State(state): State<AppState>,
    Path(opportunity_id): Path<i32>,
    Json(request): Json<CreatePayoutBatchRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PayoutBatchResponse>>), StatusCode> {
    trace!("Entering record_payout_batch function");
    debug!(
        "Recording payout batch of {} payments for opportunity {}",
        request.payouts.len(),
        opportunity_id
    );

    let opportunity = match opportunity::Entity::find_by_id(opportunity_id)
        .one(&state.db)
        .await
    {
        Ok(Some(opportunity)) => opportunity,
        Ok(None) => {
            warn!("Opportunity {} not found", opportunity_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!("Failed to load opportunity {}: {}", opportunity_id, db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    // The whole batch is written in one transaction; a failed insert
    // rolls everything back, so a retried request never double-records
    // the payments that went through before the failure.
    let txn = match state.db.begin().await {
        Ok(txn) => txn,
        Err(db_error) => {
            error!("Failed to open payout batch transaction: {}", db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let now = Utc::now().naive_utc();
    let mut inserted = Vec::with_capacity(request.payouts.len());
    for item in &request.payouts {
        let row = payment::ActiveModel {
            account_id: Set(item.account_id),
            opportunity_id: Set(opportunity.id),
            amount: Set(item.amount),
            currency: Set(item.currency.code().to_string()),
            created_at: Set(now),
            ..Default::default()
        };

        let insert_result = row.insert(&txn).await;
        match insert_result {
            Ok(model) => inserted.push(model),
            Err(db_error) => {
                error!(
                    "Failed to record payment of {} for account {}: {}",
                    item.amount, item.account_id, db_error
                );
                if let Err(rollback_error) = txn.rollback().await {
                    error!("Failed to roll back payout batch: {}", rollback_error);
                }
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    }

    if let Err(db_error) = txn.commit().await {
        error!("Failed to commit payout batch: {}", db_error);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    info!(
        "Recorded {} payments for opportunity '{}'",
        inserted.len(),
        opportunity.title
    );

    // The notifier works off the rows as they were actually persisted.
    let records = match inserted
        .iter()
        .map(PayoutRecord::try_from)
        .collect::<notify::Result<Vec<PayoutRecord>>>()
    {
        Ok(records) => records,
        Err(e) => {
            error!("Recorded payment row carries an unusable currency: {e}");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    // Notify partners; degraded outcomes are reported, not raised.
    let summary = OpportunitySummary::from(&opportunity);
    let outcome = notify_partners_of_payouts(&state.db, &*state.mailer, &records, &summary).await;
    if outcome.is_degraded() {
        warn!(?outcome, "partner notification run was degraded");
    }

    let response = ApiResponse {
        data: PayoutBatchResponse {
            opportunity_id: opportunity.id,
            recorded: records.len(),
            notification: outcome.into(),
        },
        message: "Payout batch recorded successfully".to_string(),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(response)))
}
