//! Webhook error types for gateway webhook handling.

use axum::http::StatusCode;
use thiserror::Error;

use super::errors::PaymentError;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Webhook signature verification failed.
    #[error("invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is older than the acceptable window.
    #[error("timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse the webhook payload or signature header.
    #[error("parse error: {0}")]
    ParseError(String),

    /// Event was acknowledged but intentionally not processed.
    #[error("event ignored: {0}")]
    Ignored(String),

    /// Reconciliation failed while applying the event.
    #[error(transparent)]
    Payment(#[from] PaymentError),
}

impl WebhookError {
    /// Maps the error to an HTTP status code.
    ///
    /// The status decides the gateway's retry behavior: 2xx acknowledges,
    /// 4xx drops, 5xx retries.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature | WebhookError::TimestampOutOfRange => {
                StatusCode::UNAUTHORIZED
            }
            WebhookError::InvalidTimestamp | WebhookError::ParseError(_) => {
                StatusCode::BAD_REQUEST
            }
            WebhookError::Ignored(_) => StatusCode::OK,
            WebhookError::Payment(PaymentError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            WebhookError::Payment(PaymentError::UnknownGatewaySession(_)) => {
                // Might be eventual consistency with session creation.
                StatusCode::INTERNAL_SERVER_ERROR
            }
            WebhookError::Payment(_) => StatusCode::CONFLICT,
        }
    }

    /// Returns true if the gateway should retry delivering this webhook.
    pub fn is_retryable(&self) -> bool {
        self.status_code().is_server_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::StoreError;

    #[test]
    fn invalid_signature_is_unauthorized_and_final() {
        let err = WebhookError::InvalidSignature;
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert!(!err.is_retryable());
    }

    #[test]
    fn stale_timestamp_is_unauthorized() {
        assert_eq!(
            WebhookError::TimestampOutOfRange.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn parse_error_is_bad_request() {
        let err = WebhookError::ParseError("bad json".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn ignored_event_acknowledges_with_ok() {
        let err = WebhookError::Ignored("unhandled type".to_string());
        assert_eq!(err.status_code(), StatusCode::OK);
    }

    #[test]
    fn store_failure_requests_retry() {
        let err = WebhookError::Payment(PaymentError::Store(StoreError::unavailable("down")));
        assert!(err.is_retryable());
    }

    #[test]
    fn unknown_session_requests_retry() {
        let err =
            WebhookError::Payment(PaymentError::UnknownGatewaySession("gw_x".to_string()));
        assert!(err.is_retryable());
    }

    #[test]
    fn reconciliation_conflict_does_not_retry() {
        let err = WebhookError::Payment(PaymentError::AlreadyPaid);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(!err.is_retryable());
    }
}
