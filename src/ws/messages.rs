//! WebSocket message types: envelope, commands, and events.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Slot;
use crate::domain::slot::DATE_FORMAT;
use crate::service::SlotQuery;

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Response to the command with the given id.
    #[must_use]
    pub fn response(id: String, payload: serde_json::Value) -> Self {
        Self::new(id, WsMessageType::Response, payload)
    }

    /// Server-pushed event with a fresh id.
    #[must_use]
    pub fn event(payload: serde_json::Value) -> Self {
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            WsMessageType::Event,
            payload,
        )
    }

    /// Error reply with a numeric code.
    #[must_use]
    pub fn error(id: String, code: u32, message: impl Into<String>) -> Self {
        Self::new(
            id,
            WsMessageType::Error,
            serde_json::json!({
                "code": code,
                "message": message.into(),
            }),
        )
    }

    fn new(id: String, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Serializes the envelope; `None` only if serialization fails.
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a client can send over WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Start watching the blocked slots of a clinic day for a pet.
    WatchSlots {
        /// Clinic identifier.
        clinic_id: String,
        /// Calendar day, `YYYY-MM-DD`.
        date: String,
        /// Pet identifier.
        pet_id: String,
    },
    /// Stop a watch.
    Unwatch {
        /// Identifier returned by `watch_slots`.
        watch_id: String,
    },
}

impl WsCommand {
    /// Command names understood by the server.
    pub const NAMES: [&'static str; 2] = ["watch_slots", "unwatch"];
}

/// Blocked-slot snapshot sent in `watch_slots` responses and pushed events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotUpdate {
    /// Watch the snapshot belongs to.
    pub watch_id: String,
    /// Clinic identifier.
    pub clinic_id: String,
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    /// Blocked slots in chronological order.
    pub blocked: Vec<String>,
}

impl SlotUpdate {
    /// Builds a snapshot for `query`.
    #[must_use]
    pub fn new(watch_id: &str, query: &SlotQuery, blocked: &BTreeSet<Slot>) -> Self {
        Self {
            watch_id: watch_id.to_string(),
            clinic_id: query.clinic_id.to_string(),
            date: format_date(query.date),
            blocked: blocked.iter().map(ToString::to_string).collect(),
        }
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn watch_slots_command_parses() {
        let payload = serde_json::json!({
            "command": "watch_slots",
            "clinic_id": "vet-1",
            "date": "2025-06-01",
            "pet_id": "pet-x",
        });
        let Ok(WsCommand::WatchSlots { clinic_id, .. }) = serde_json::from_value(payload) else {
            panic!("should parse as watch_slots");
        };
        assert_eq!(clinic_id, "vet-1");
    }

    #[test]
    fn error_envelope_carries_code() {
        let msg = WsMessage::error("c1".to_string(), 404, "unknown command");
        assert_eq!(msg.msg_type, WsMessageType::Error);
        assert_eq!(msg.payload.get("code").and_then(|v| v.as_u64()), Some(404));
        let json = msg.to_json().unwrap_or_default();
        assert!(json.contains("\"type\":\"error\""));
    }
}
