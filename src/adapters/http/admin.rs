//! HTTP handlers for the administrative endpoints.

use axum::extract::{Json, Path, State};

use crate::application::handlers::auth::DeleteAccountCommand;
use crate::application::handlers::payment::{AdminOverrideCommand, RejectEvidenceCommand};
use crate::domain::foundation::{AccountId, TransactionId};

use super::context::Authenticated;
use super::error::ApiError;
use super::state::AppState;
use serde::{Deserialize, Serialize};

/// Request to override an account's payment state.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentOverrideRequest {
    pub account_id: AccountId,
    pub paid: bool,
}

/// Response for a payment override.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentOverrideResponse {
    pub transactions_settled: u64,
}

/// Response for an account deletion.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteAccountResponse {
    pub deleted: bool,
}

/// `POST /api/admin/payment-override`
pub async fn payment_override(
    State(state): State<AppState>,
    authenticated: Authenticated,
    Json(request): Json<PaymentOverrideRequest>,
) -> Result<Json<PaymentOverrideResponse>, ApiError> {
    let outcome = state
        .admin_override_handler()
        .handle(AdminOverrideCommand {
            acting_account_id: authenticated.account_id,
            target_account_id: request.account_id,
            paid: request.paid,
        })
        .await?;

    Ok(Json(PaymentOverrideResponse {
        transactions_settled: outcome.transactions_settled,
    }))
}

/// `POST /api/admin/evidence/:transaction_id/reject`
pub async fn reject_evidence(
    State(state): State<AppState>,
    authenticated: Authenticated,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .reject_evidence_handler()
        .handle(RejectEvidenceCommand {
            acting_account_id: authenticated.account_id,
            transaction_id,
        })
        .await?;

    Ok(Json(serde_json::json!({ "rejected": true })))
}

/// `DELETE /api/admin/accounts/:account_id`
pub async fn delete_account(
    State(state): State<AppState>,
    authenticated: Authenticated,
    Path(account_id): Path<AccountId>,
) -> Result<Json<DeleteAccountResponse>, ApiError> {
    let deleted = state
        .delete_account_handler()
        .handle(DeleteAccountCommand {
            acting_account_id: authenticated.account_id,
            target_account_id: account_id,
        })
        .await?;

    Ok(Json(DeleteAccountResponse { deleted }))
}
