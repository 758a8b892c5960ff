//! Request context captured at the edge and threaded to the security core.

use serde::{Deserialize, Serialize};

/// Caller-supplied context for one inbound request.
///
/// The source address is resolved at the HTTP boundary: when an
/// `X-Forwarded-For` header is present its first entry is taken as the
/// client address, otherwise the peer address of the connection is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Resolved client source address.
    pub source_addr: String,

    /// Client signature (user-agent string as negotiated transport
    /// fingerprint).
    pub client_signature: String,
}

impl RequestContext {
    /// Creates a request context from resolved parts.
    pub fn new(source_addr: impl Into<String>, client_signature: impl Into<String>) -> Self {
        Self {
            source_addr: source_addr.into(),
            client_signature: client_signature.into(),
        }
    }

    /// Resolves the client address from an optional forwarded-for header
    /// value and the transport peer address.
    ///
    /// The first comma-separated entry of the forwarded-for value wins when
    /// present and non-empty.
    pub fn resolve_addr(forwarded_for: Option<&str>, peer_addr: &str) -> String {
        forwarded_for
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(peer_addr)
            .to_string()
    }
}
