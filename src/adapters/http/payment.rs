//! HTTP handlers and DTOs for the payment endpoints.

use axum::body::Bytes;
use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::handlers::payment::{
    CheckGatewayStatusCommand, CreateGatewaySessionCommand, SubmitEvidenceCommand, WebhookOutcome,
};
use crate::domain::payment::{ReconcileOutcome, TransactionStatus};
use crate::ports::GatewaySessionStatus;

use super::context::Authenticated;
use super::error::ApiError;
use super::state::AppState;
use serde::{Deserialize, Serialize};

/// Signature header the gateway signs webhook deliveries with.
pub const GATEWAY_SIGNATURE_HEADER: &str = "gateway-signature";

/// Request to start a gateway checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    pub origin_url: String,
}

/// Response for checkout creation.
#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub url: String,
    pub amount: i64,
    pub currency: String,
    pub transaction_id: String,
}

/// Response for the status poll.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatusResponse {
    pub status: GatewaySessionStatus,
    /// True when this poll performed the credit.
    pub credited: bool,
}

/// Request to submit manual payment evidence.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitEvidenceRequest {
    /// Payment reference claimed by the submitter.
    pub reference: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub object_key: String,
}

/// View of a payment transaction.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    pub id: String,
    pub status: TransactionStatus,
    pub amount: i64,
    pub currency: String,
}

/// Response acknowledging a webhook delivery.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    pub credited: bool,
}

/// `POST /api/payment/create-session`
pub async fn create_session(
    State(state): State<AppState>,
    authenticated: Authenticated,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    let outcome = state
        .create_session_handler()
        .handle(CreateGatewaySessionCommand {
            account_id: authenticated.account_id,
            origin_url: request.origin_url,
        })
        .await?;

    Ok(Json(CreateSessionResponse {
        session_id: outcome.checkout.session_id,
        url: outcome.checkout.url,
        amount: outcome.checkout.amount_minor,
        currency: outcome.checkout.currency,
        transaction_id: outcome.transaction.id.to_string(),
    }))
}

/// `GET /api/payment/status/:session_id`
pub async fn session_status(
    State(state): State<AppState>,
    _authenticated: Authenticated,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStatusResponse>, ApiError> {
    let outcome = state
        .check_status_handler()
        .handle(CheckGatewayStatusCommand {
            gateway_session_id: session_id,
        })
        .await?;

    Ok(Json(SessionStatusResponse {
        status: outcome.gateway_status,
        credited: matches!(
            outcome.reconciled,
            Some(ReconcileOutcome::Applied { .. })
        ),
    }))
}

/// `POST /api/payment/evidence`
pub async fn submit_evidence(
    State(state): State<AppState>,
    authenticated: Authenticated,
    Json(request): Json<SubmitEvidenceRequest>,
) -> Result<Json<TransactionView>, ApiError> {
    let transaction = state
        .submit_evidence_handler()
        .handle(SubmitEvidenceCommand {
            account_id: authenticated.account_id,
            reference: request.reference,
            content_type: request.content_type,
            size_bytes: request.size_bytes,
            object_key: request.object_key,
        })
        .await?;

    Ok(Json(TransactionView {
        id: transaction.id.to_string(),
        status: transaction.status,
        amount: transaction.amount_minor,
        currency: transaction.currency,
    }))
}

/// `POST /api/webhooks/gateway`
///
/// No bearer auth: the delivery authenticates through its signature, which
/// is verified before the payload is trusted.
pub async fn gateway_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers
        .get(GATEWAY_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        return ApiError::new(
            StatusCode::UNAUTHORIZED,
            "WEBHOOK_REJECTED",
            "missing signature header",
        )
        .into_response();
    };

    match state.webhook_handler().handle(&body, signature).await {
        Ok(WebhookOutcome::Processed { credited }) => Json(WebhookAck {
            received: true,
            credited,
        })
        .into_response(),
        Ok(WebhookOutcome::Ignored) => Json(WebhookAck {
            received: true,
            credited: false,
        })
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
