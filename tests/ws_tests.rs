//! WebSocket integration tests for live slot watches.

#![allow(clippy::panic, clippy::indexing_slicing)]

mod common;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message;

use common::{DAY, booking, spawn_server};
use petify_gateway::ws::connection::MAX_WATCHES_PER_CONNECTION;

type Socket =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn connect(url: &str) -> Socket {
    let Ok((socket, _)) = tokio_tungstenite::connect_async(url).await else {
        panic!("ws connect failed");
    };
    socket
}

async fn send(socket: &mut Socket, text: String) {
    if socket.send(Message::text(text)).await.is_err() {
        panic!("ws send failed");
    }
}

async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let Ok(Some(Ok(msg))) = tokio::time::timeout(Duration::from_secs(2), socket.next()).await
        else {
            panic!("expected a ws message");
        };
        if let Message::Text(text) = msg {
            let Ok(value) = serde_json::from_str::<Value>(text.as_str()) else {
                panic!("server sent invalid JSON");
            };
            return value;
        }
    }
}

fn watch_command(id: &str, clinic: &str, pet: &str) -> String {
    serde_json::json!({
        "id": id,
        "type": "command",
        "timestamp": "2025-05-01T08:00:00Z",
        "payload": {
            "command": "watch_slots",
            "clinic_id": clinic,
            "date": DAY,
            "pet_id": pet,
        }
    })
    .to_string()
}

#[tokio::test]
async fn watch_receives_initial_set_and_updates() {
    let server = spawn_server(&[("vet-1", Some(1))]).await;
    let mut socket = connect(&server.ws_url()).await;

    send(&mut socket, watch_command("c1", "vet-1", "pet-x")).await;
    let response = next_json(&mut socket).await;
    assert_eq!(response["type"], "response");
    assert_eq!(response["id"], "c1");
    assert_eq!(response["payload"]["blocked"], serde_json::json!([]));
    let Some(watch_id) = response["payload"]["watch_id"].as_str().map(str::to_string) else {
        panic!("watch id in response");
    };

    let client = reqwest::Client::new();
    let Ok(resp) = client
        .post(server.url("/api/v1/appointments"))
        .json(&booking("vet-1", "pet-a", "u1", "13:00"))
        .send()
        .await
    else {
        panic!("booking request failed");
    };
    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);

    let event = next_json(&mut socket).await;
    assert_eq!(event["type"], "event");
    assert_eq!(event["payload"]["watch_id"], watch_id.as_str());
    assert_eq!(event["payload"]["blocked"], serde_json::json!(["13:00"]));
}

#[tokio::test]
async fn unwatch_stops_the_watch() {
    let server = spawn_server(&[("vet-1", Some(1))]).await;
    let mut socket = connect(&server.ws_url()).await;

    send(&mut socket, watch_command("c1", "vet-1", "pet-x")).await;
    let response = next_json(&mut socket).await;
    let Some(watch_id) = response["payload"]["watch_id"].as_str().map(str::to_string) else {
        panic!("watch id in response");
    };

    let unwatch = serde_json::json!({
        "id": "c2",
        "type": "command",
        "timestamp": "2025-05-01T08:00:00Z",
        "payload": { "command": "unwatch", "watch_id": watch_id },
    });
    send(&mut socket, unwatch.to_string()).await;
    let response = next_json(&mut socket).await;
    assert_eq!(response["type"], "response");
    assert_eq!(response["payload"]["remaining_count"], 0);
}

#[tokio::test]
async fn unknown_clinic_watch_is_an_error() {
    let server = spawn_server(&[]).await;
    let mut socket = connect(&server.ws_url()).await;

    send(&mut socket, watch_command("c1", "nowhere", "pet-x")).await;
    let response = next_json(&mut socket).await;
    assert_eq!(response["type"], "error");
    assert_eq!(response["payload"]["code"], 2001);
}

#[tokio::test]
async fn malformed_and_unknown_commands() {
    let server = spawn_server(&[]).await;
    let mut socket = connect(&server.ws_url()).await;

    send(&mut socket, "not json".to_string()).await;
    let response = next_json(&mut socket).await;
    assert_eq!(response["type"], "error");
    assert_eq!(response["payload"]["code"], 400);

    let unknown = serde_json::json!({
        "id": "c3",
        "type": "command",
        "timestamp": "2025-05-01T08:00:00Z",
        "payload": { "command": "teleport" },
    });
    send(&mut socket, unknown.to_string()).await;
    let response = next_json(&mut socket).await;
    assert_eq!(response["type"], "error");
    assert_eq!(response["payload"]["code"], 404);
}

#[tokio::test]
async fn watch_limit_per_connection() {
    let server = spawn_server(&[("vet-1", Some(1))]).await;
    let mut socket = connect(&server.ws_url()).await;

    let mut watch_ids = Vec::new();
    for i in 0..MAX_WATCHES_PER_CONNECTION {
        send(&mut socket, watch_command(&format!("w{i}"), "vet-1", &format!("pet-{i}"))).await;
        let response = next_json(&mut socket).await;
        assert_eq!(response["type"], "response");
        if let Some(id) = response["payload"]["watch_id"].as_str() {
            watch_ids.push(id.to_string());
        }
    }
    assert_eq!(watch_ids.len(), MAX_WATCHES_PER_CONNECTION);

    send(&mut socket, watch_command("over", "vet-1", "pet-over")).await;
    let response = next_json(&mut socket).await;
    assert_eq!(response["type"], "error");
    assert_eq!(response["id"], "over");
    assert_eq!(response["payload"]["code"], 429);

    let unwatch = serde_json::json!({
        "id": "free",
        "type": "command",
        "timestamp": "2025-05-01T08:00:00Z",
        "payload": { "command": "unwatch", "watch_id": watch_ids[0] },
    });
    send(&mut socket, unwatch.to_string()).await;
    let response = next_json(&mut socket).await;
    assert_eq!(response["type"], "response");

    send(&mut socket, watch_command("again", "vet-1", "pet-over")).await;
    let response = next_json(&mut socket).await;
    assert_eq!(response["type"], "response");
}
