//! WebSocket message types: envelope and commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::TeamId;

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    #[serde(default)]
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp. Optional on client messages.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Builds a server message stamped with the current time.
    #[must_use]
    pub fn new(id: impl Into<String>, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error reply.
    #[must_use]
    pub fn error(id: impl Into<String>, code: u16, message: &str) -> Self {
        Self::new(
            id,
            WsMessageType::Error,
            serde_json::json!({ "code": code, "message": message }),
        )
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

/// Commands that a client can send over WebSocket, carried in the
/// envelope's `payload`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Follow events for specific teams.
    Subscribe {
        /// Team IDs to follow. Use `["*"]` for all teams.
        team_ids: Vec<String>,
    },
    /// Stop following specific teams.
    Unsubscribe {
        /// Team IDs to drop. `"*"` clears the wildcard.
        team_ids: Vec<String>,
    },
    /// Request the current leaderboard.
    Leaderboard,
}

/// Splits raw team ID strings into parsed IDs and the wildcard flag.
/// Unparsable IDs are returned separately.
#[must_use]
pub fn parse_team_ids(raw: &[String]) -> (Vec<TeamId>, bool, Vec<String>) {
    let mut ids = Vec::new();
    let mut wildcard = false;
    let mut invalid = Vec::new();
    for value in raw {
        if value == "*" {
            wildcard = true;
        } else if let Ok(id) = value.parse::<TeamId>() {
            ids.push(id);
        } else {
            invalid.push(value.clone());
        }
    }
    (ids, wildcard, invalid)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn command_envelope_parses_without_timestamp() {
        let raw = r#"{"id":"1","type":"command","payload":{"command":"leaderboard"}}"#;
        let Ok(msg) = serde_json::from_str::<WsMessage>(raw) else {
            panic!("envelope should parse");
        };
        assert_eq!(msg.msg_type, WsMessageType::Command);
        let Ok(WsCommand::Leaderboard) = serde_json::from_value::<WsCommand>(msg.payload) else {
            panic!("leaderboard command");
        };
    }

    #[test]
    fn team_ids_split_wildcard_and_garbage() {
        let id = TeamId::new();
        let raw = vec!["*".to_string(), id.to_string(), "nope".to_string()];
        let (ids, wildcard, invalid) = parse_team_ids(&raw);
        assert_eq!(ids, vec![id]);
        assert!(wildcard);
        assert_eq!(invalid, vec!["nope".to_string()]);
    }
}
