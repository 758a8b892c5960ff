//! Request extractors: client context and authenticated identity.

use std::net::SocketAddr;

use axum::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::StatusCode;

use crate::application::handlers::auth::AuthenticateCommand;
use crate::domain::foundation::{AccountId, RequestContext, SessionId};

use super::error::ApiError;
use super::state::AppState;

/// Session id header accompanying authenticated requests.
pub const SESSION_HEADER: &str = "x-session-id";

/// Resolved client context for the request.
///
/// The source address takes the first `X-Forwarded-For` entry when the
/// header is present, otherwise the connection's peer address; the client
/// signature is the user-agent string.
#[derive(Debug, Clone)]
pub struct ClientContext(pub RequestContext);

#[async_trait]
impl<S> FromRequestParts<S> for ClientContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded_for = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok());
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let source_addr = RequestContext::resolve_addr(forwarded_for, &peer);

        let client_signature = parts
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        Ok(ClientContext(RequestContext::new(
            source_addr,
            client_signature,
        )))
    }
}

/// Bearer token plus the optional bound session id.
#[derive(Debug, Clone)]
pub struct BearerAuth {
    pub token: String,
    pub session_id: Option<SessionId>,
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string)
            .ok_or_else(|| {
                ApiError::new(
                    StatusCode::UNAUTHORIZED,
                    "AUTHENTICATION_REQUIRED",
                    "missing bearer token",
                )
            })?;

        let session_id = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| {
                v.parse().map_err(|_| {
                    ApiError::new(
                        StatusCode::BAD_REQUEST,
                        "INVALID_SESSION_ID",
                        "malformed session id header",
                    )
                })
            })
            .transpose()?;

        Ok(BearerAuth { token, session_id })
    }
}

/// Fully authenticated request identity.
///
/// Runs the token gate and, when a session id accompanies the request,
/// the session consistency gate.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated {
    pub account_id: AccountId,
}

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = BearerAuth::from_request_parts(parts, state).await?;
        let ClientContext(context) = ClientContext::from_request_parts(parts, state).await?;

        let authenticated = state
            .authenticate_handler()
            .handle(AuthenticateCommand {
                token: auth.token,
                session_id: auth.session_id,
                context,
            })
            .await?;

        Ok(Authenticated {
            account_id: authenticated.account_id,
        })
    }
}
