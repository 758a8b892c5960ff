//! Parsed gateway webhook event.
//!
//! The payload is only deserialized after the signature verifies; nothing
//! in here is trusted before that.

use serde::{Deserialize, Serialize};

/// Event kinds this core reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayEventKind {
    /// The checkout session completed and the payment cleared.
    SessionCompleted,
    /// The checkout session expired unpaid.
    SessionExpired,
    /// Anything else; acknowledged and ignored.
    Other,
}

/// A gateway webhook event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayEvent {
    /// Gateway-assigned event id.
    pub id: String,
    /// Raw event type string, e.g. `checkout.session.completed`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Unix timestamp the gateway created the event.
    pub created: i64,
    /// Event payload.
    pub data: GatewayEventData,
    /// True when emitted by the live (non-test) gateway environment.
    #[serde(default)]
    pub livemode: bool,
}

/// Payload of a gateway event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayEventData {
    /// Checkout session the event refers to.
    pub session_id: String,
    /// Gateway's own view of the payment, e.g. `paid`.
    #[serde(default)]
    pub payment_status: Option<String>,
}

impl GatewayEvent {
    /// Maps the raw event type onto the kinds this core handles.
    pub fn kind(&self) -> GatewayEventKind {
        match self.event_type.as_str() {
            "checkout.session.completed" => GatewayEventKind::SessionCompleted,
            "checkout.session.expired" => GatewayEventKind::SessionExpired,
            _ => GatewayEventKind::Other,
        }
    }

    /// The checkout session this event refers to.
    pub fn session_id(&self) -> &str {
        &self.data.session_id
    }

    /// Returns true when emitted by the live gateway environment.
    pub fn is_live(&self) -> bool {
        self.livemode
    }
}
