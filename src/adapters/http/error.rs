//! HTTP error mapping.
//!
//! Translates the typed domain failures onto status codes and a uniform
//! JSON error body. The core never treats these as fatal; the mapping
//! here is the caller-side policy the error taxonomy leaves open.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::application::handlers::auth::AuthError;
use crate::application::handlers::payment::PaymentFlowError;
use crate::domain::payment::{PaymentError, WebhookError};
use crate::domain::security::{SessionError, TokenError};

/// JSON error body returned for every failure.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// API-level error carrying its response status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::InvalidCredentials => {
                ApiError::new(StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", message)
            }
            AuthError::AccountLocked { .. } => {
                ApiError::new(StatusCode::LOCKED, "ACCOUNT_LOCKED", message)
            }
            AuthError::RateLimited => {
                ApiError::new(StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", message)
            }
            AuthError::ContactTaken => {
                ApiError::new(StatusCode::BAD_REQUEST, "CONTACT_TAKEN", message)
            }
            AuthError::Forbidden => ApiError::new(StatusCode::FORBIDDEN, "FORBIDDEN", message),
            AuthError::Validation(_) => {
                ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message)
            }
            AuthError::Token(TokenError::Expired) => {
                ApiError::new(StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED", message)
            }
            AuthError::Token(TokenError::Revoked) => {
                ApiError::new(StatusCode::UNAUTHORIZED, "TOKEN_REVOKED", message)
            }
            AuthError::Token(_) => {
                ApiError::new(StatusCode::UNAUTHORIZED, "INVALID_TOKEN", message)
            }
            AuthError::Session(SessionError::InvalidSession) => {
                ApiError::new(StatusCode::UNAUTHORIZED, "INVALID_SESSION", message)
            }
            AuthError::Session(_) => {
                ApiError::new(StatusCode::UNAUTHORIZED, "SESSION_MISMATCH", message)
            }
            AuthError::Hashing(_) | AuthError::Store(_) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "internal error",
            ),
        }
    }
}

impl From<PaymentFlowError> for ApiError {
    fn from(err: PaymentFlowError) -> Self {
        let message = err.to_string();
        match err {
            PaymentFlowError::Payment(inner) => match inner {
                PaymentError::AlreadyPaid => {
                    ApiError::new(StatusCode::CONFLICT, "ALREADY_PAID", message)
                }
                PaymentError::DuplicatePending => {
                    ApiError::new(StatusCode::CONFLICT, "DUPLICATE_PENDING", message)
                }
                PaymentError::AlreadySettled(_) => {
                    ApiError::new(StatusCode::CONFLICT, "ALREADY_SETTLED", message)
                }
                PaymentError::AccountNotFound
                | PaymentError::TransactionNotFound
                | PaymentError::UnknownGatewaySession(_) => {
                    ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
                }
                PaymentError::UnsupportedEvidenceType(_)
                | PaymentError::EvidenceTooLarge { .. } => {
                    ApiError::new(StatusCode::BAD_REQUEST, "INVALID_EVIDENCE", message)
                }
                PaymentError::Store(_) => ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal error",
                ),
            },
            PaymentFlowError::Gateway(inner) => match inner {
                crate::ports::GatewayError::UnknownSession(_) => {
                    ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
                }
                _ => ApiError::new(StatusCode::BAD_GATEWAY, "GATEWAY_ERROR", message),
            },
            PaymentFlowError::Forbidden => {
                ApiError::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
            }
        }
    }
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        let status = err.status_code();
        ApiError::new(status, "WEBHOOK_REJECTED", err.to_string())
    }
}
