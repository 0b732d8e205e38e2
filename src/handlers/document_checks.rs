use crate::document_check::DocumentCheckError;
use crate::schemas::{ApiResponse, AppState, DocumentCheckRequest, DocumentCheckResponse};
use axum::{extract::State, http::StatusCode, response::Json};
use tracing::{debug, error, instrument, trace};

/// Check a Czech ID document against the ministry's invalid-documents
/// register.
///
/// Verdicts are cached so repeated checks of the same document (the KYC
/// re-upload flow retries them) do not hammer the register.
#[utoipa::path(
    post,
    path = "/api/v1/document-checks",
    tag = "document-checks",
    request_body = DocumentCheckRequest,
    responses(
        (status = 200, description = "Document checked", body = ApiResponse<DocumentCheckResponse>),
        (status = 502, description = "Register unavailable or rejected the query", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn check_document(
    State(state): State<AppState>,
    Json(request): Json<DocumentCheckRequest>,
) -> Result<Json<ApiResponse<DocumentCheckResponse>>, StatusCode> {
    trace!("Entering check_document function");

    let number = request.number.trim().to_uppercase();
    let cache_key = format!("{:?}:{}", request.kind, number);

    if let Some(validity) = state.document_cache.get(&cache_key).await {
        debug!("Document check served from cache");
        return Ok(Json(ApiResponse {
            data: validity.into(),
            message: "Document checked successfully".to_string(),
            success: true,
        }));
    }

    let validity = match state.document_checker.check(request.kind, &number).await {
        Ok(validity) => validity,
        Err(e @ DocumentCheckError::Register(_)) => {
            error!("Register rejected document query: {}", e);
            return Err(StatusCode::BAD_GATEWAY);
        }
        Err(e) => {
            error!("Document check failed: {}", e);
            return Err(StatusCode::BAD_GATEWAY);
        }
    };

    state.document_cache.insert(cache_key, validity).await;

    Ok(Json(ApiResponse {
        data: validity.into(),
        message: "Document checked successfully".to_string(),
        success: true,
    }))
}
