//! WebSocket integration tests: subscriptions and live ledger events.

#![allow(clippy::panic)]

mod common;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

type Socket =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn next_json(socket: &mut Socket) -> Value {
    let Ok(Some(Ok(msg))) = tokio::time::timeout(Duration::from_secs(5), socket.next()).await
    else {
        panic!("no websocket message");
    };
    let Ok(text) = msg.to_text() else {
        panic!("expected text frame");
    };
    serde_json::from_str(text).unwrap_or(Value::Null)
}

async fn send_command(socket: &mut Socket, payload: Value) {
    let msg = json!({ "id": "t1", "type": "command", "payload": payload });
    let sent = socket.send(Message::text(msg.to_string())).await;
    tokio_test::assert_ok!(sent);
}

#[tokio::test]
async fn wildcard_subscriber_sees_registration_and_bid() {
    let addr = common::spawn_app().await;
    let Ok((mut socket, _)) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await
    else {
        panic!("ws connect failed");
    };

    send_command(&mut socket, json!({ "command": "subscribe", "team_ids": ["*"] })).await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply.get("type"), Some(&json!("response")));
    assert_eq!(reply.pointer("/payload/wildcard"), Some(&json!(true)));

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/api/v1/teams"))
        .json(&json!({ "name": "Rajasthan Royals" }))
        .send()
        .await;
    let resp = tokio_test::assert_ok!(resp);
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    let Some(team_id) = body.get("team_id").and_then(Value::as_str) else {
        panic!("team_id missing");
    };

    let event = next_json(&mut socket).await;
    assert_eq!(event.get("type"), Some(&json!("event")));
    assert_eq!(
        event.pointer("/payload/event_type"),
        Some(&json!("team_registered"))
    );

    let bid = client
        .post(format!("http://{addr}/api/v1/bids"))
        .json(&json!({ "team_id": team_id, "player_name": "Player X", "amount": 1_000 }))
        .send()
        .await;
    tokio_test::assert_ok!(bid);

    let event = next_json(&mut socket).await;
    assert_eq!(event.pointer("/payload/event_type"), Some(&json!("bid_placed")));
    assert_eq!(event.pointer("/payload/bid/player_name"), Some(&json!("Player X")));
}

#[tokio::test]
async fn leaderboard_over_socket_and_unknown_command() {
    let addr = common::spawn_app().await;
    let Ok((mut socket, _)) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await
    else {
        panic!("ws connect failed");
    };

    send_command(&mut socket, json!({ "command": "leaderboard" })).await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply.pointer("/payload/leaderboard"), Some(&json!([])));

    send_command(&mut socket, json!({ "command": "swap" })).await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply.get("type"), Some(&json!("error")));
}
