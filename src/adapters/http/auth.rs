//! HTTP handlers and DTOs for registration, login, and logout.

use axum::extract::{Json, State};

use crate::application::handlers::auth::{LoginCommand, LogoutCommand, RegisterCommand};
use crate::domain::account::Account;
use crate::domain::foundation::{SessionId, Timestamp};

use super::context::{BearerAuth, ClientContext};
use super::error::ApiError;
use super::state::AppState;
use serde::{Deserialize, Serialize};

/// Request to register a new account.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub college: String,
    #[serde(alias = "class")]
    pub class_name: String,
    pub stream: String,
    pub contact: String,
    pub password: String,
}

/// Request to log in.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub contact: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Account view with the credential hash stripped.
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub id: String,
    pub name: String,
    pub college: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub stream: String,
    pub contact: String,
    pub payment_paid: bool,
    pub payment_status: crate::domain::payment::PaymentStatus,
    pub created_at: Timestamp,
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.to_string(),
            name: account.name,
            college: account.college,
            class_name: account.class_name,
            stream: account.stream,
            contact: account.contact,
            payment_paid: account.payment_paid,
            payment_status: account.payment_status,
            created_at: account.created_at,
        }
    }
}

/// Response carrying a fresh token and its bound session.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub session_id: SessionId,
    pub user: AccountView,
}

/// Response for logout.
#[derive(Debug, Clone, Serialize)]
pub struct LogoutResponse {
    pub sessions_dropped: usize,
}

/// `POST /api/register`
pub async fn register(
    State(state): State<AppState>,
    ClientContext(context): ClientContext,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let outcome = state
        .register_handler()
        .handle(RegisterCommand {
            name: request.name,
            college: request.college,
            class_name: request.class_name,
            stream: request.stream,
            contact: request.contact,
            password: request.password,
            context,
        })
        .await?;

    Ok(Json(LoginResponse {
        token: outcome.token.token,
        session_id: outcome.session_id,
        user: outcome.account.into(),
    }))
}

/// `POST /api/login`
pub async fn login(
    State(state): State<AppState>,
    ClientContext(context): ClientContext,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let outcome = state
        .login_handler()
        .handle(LoginCommand {
            contact: request.contact,
            password: request.password,
            remember_me: request.remember_me,
            context,
        })
        .await?;

    Ok(Json(LoginResponse {
        token: outcome.token.token,
        session_id: outcome.session_id,
        user: outcome.account.into(),
    }))
}

/// `POST /api/logout`
pub async fn logout(
    State(state): State<AppState>,
    auth: BearerAuth,
) -> Result<Json<LogoutResponse>, ApiError> {
    let outcome = state
        .logout_handler()
        .handle(LogoutCommand { token: auth.token })
        .await?;

    Ok(Json(LogoutResponse {
        sessions_dropped: outcome.sessions_dropped,
    }))
}
