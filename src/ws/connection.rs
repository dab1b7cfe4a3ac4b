//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType, parse_team_ids};
use super::subscription::SubscriptionManager;
use crate::api::dto::StandingDto;
use crate::domain::LedgerEvent;
use crate::service::LeagueService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<LedgerEvent>,
    league_service: Arc<LeagueService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(&text, &mut subs, &league_service).await;
                        let json = serde_json::to_string(&reply).unwrap_or_default();
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            // Event from EventBus
            event = event_rx.recv() => {
                match event {
                    Ok(ledger_event) => {
                        if subs.matches(&ledger_event.team_ids()) {
                            let msg = event_message(&ledger_event);
                            let json = serde_json::to_string(&msg).unwrap_or_default();
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Wraps a ledger event in a server event envelope.
fn event_message(event: &LedgerEvent) -> WsMessage {
    WsMessage::new(
        uuid::Uuid::new_v4().to_string(),
        WsMessageType::Event,
        serde_json::to_value(event).unwrap_or_default(),
    )
}

/// Handles a text message from the client and builds the reply.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    league_service: &LeagueService,
) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error("", 400, "malformed JSON");
    };
    if msg.msg_type != WsMessageType::Command {
        return WsMessage::error(msg.id, 400, "expected a command message");
    }
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return WsMessage::error(msg.id, 404, "unknown command");
    };

    match command {
        WsCommand::Subscribe { team_ids } => {
            let (ids, wildcard, invalid) = parse_team_ids(&team_ids);
            subs.subscribe(&ids, wildcard);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "subscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "invalid": invalid,
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::Unsubscribe { team_ids } => {
            let (ids, wildcard, invalid) = parse_team_ids(&team_ids);
            subs.unsubscribe(&ids, wildcard);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "unsubscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "invalid": invalid,
                    "remaining_count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::Leaderboard => match league_service.leaderboard().await {
            Ok(standings) => {
                let rows: Vec<StandingDto> = standings.into_iter().map(StandingDto::from).collect();
                WsMessage::new(
                    msg.id,
                    WsMessageType::Response,
                    serde_json::json!({ "leaderboard": rows }),
                )
            }
            Err(err) => {
                tracing::warn!(error = %err, "ws leaderboard request failed");
                WsMessage::error(msg.id, err.status_code().as_u16(), &err.to_string())
            }
        },
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{EventBus, TeamId};
    use crate::persistence::{MemoryStore, Persistence};

    fn make_service() -> LeagueService {
        let store = Arc::new(MemoryStore::new());
        LeagueService::new(
            Persistence::Memory(Arc::clone(&store)),
            Persistence::Memory(store),
            EventBus::new(16),
        )
    }

    fn command(payload: serde_json::Value) -> String {
        serde_json::json!({ "id": "c1", "type": "command", "payload": payload }).to_string()
    }

    #[tokio::test]
    async fn subscribe_then_filter_events() {
        let service = make_service();
        let mut subs = SubscriptionManager::new();
        let team = TeamId::new();

        let text = command(serde_json::json!({
            "command": "subscribe",
            "team_ids": [team.to_string()],
        }));
        let reply = handle_text_message(&text, &mut subs, &service).await;
        assert_eq!(reply.msg_type, WsMessageType::Response);
        assert_eq!(reply.payload.get("count"), Some(&serde_json::json!(1)));
        assert!(subs.matches(&[team]));
    }

    #[tokio::test]
    async fn leaderboard_command_returns_standings() {
        let service = make_service();
        let Ok(_) = service.register_team("Kolkata Knights", None).await else {
            panic!("register failed");
        };
        let mut subs = SubscriptionManager::new();

        let text = command(serde_json::json!({ "command": "leaderboard" }));
        let reply = handle_text_message(&text, &mut subs, &service).await;
        assert_eq!(reply.msg_type, WsMessageType::Response);
        let Some(rows) = reply.payload.get("leaderboard").and_then(|v| v.as_array()) else {
            panic!("leaderboard rows");
        };
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn malformed_and_unknown_messages_are_errors() {
        let service = make_service();
        let mut subs = SubscriptionManager::new();

        let reply = handle_text_message("not json", &mut subs, &service).await;
        assert_eq!(reply.msg_type, WsMessageType::Error);

        let text = command(serde_json::json!({ "command": "swap" }));
        let reply = handle_text_message(&text, &mut subs, &service).await;
        assert_eq!(reply.msg_type, WsMessageType::Error);
        assert_eq!(reply.payload.get("code"), Some(&serde_json::json!(404)));
    }
}
