//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding slot watch updates.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::messages::{SlotUpdate, WsCommand, WsMessage};
use super::subscription::SubscriptionManager;
use crate::domain::slot::parse_date;
use crate::domain::{ClinicId, PetId};
use crate::error::GatewayError;
use crate::service::{BookingService, SlotQuery, SlotWatch};

const UPDATE_BUFFER: usize = 64;

/// Slot watches one connection may hold at a time.
pub const MAX_WATCHES_PER_CONNECTION: usize = 16;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards blocked-slot updates produced by the connection's watches.
pub async fn run_connection(socket: WebSocket, booking_service: Arc<BookingService>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (update_tx, mut update_rx) = mpsc::channel::<SlotUpdate>(UPDATE_BUFFER);
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response =
                            handle_text_message(&text, &booking_service, &mut subs, &update_tx).await;
                        if let Some(resp_json) = response.to_json()
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            // Update from one of this connection's watches
            Some(update) = update_rx.recv() => {
                let payload = serde_json::to_value(&update).unwrap_or_default();
                if let Some(json) = WsMessage::event(payload).to_json()
                    && ws_tx.send(Message::text(json)).await.is_err() {
                        break;
                    }
            }
        }
    }

    tracing::debug!(watches = subs.count(), "ws connection closed");
}

/// Handles a text message from the client, returning the reply envelope.
async fn handle_text_message(
    text: &str,
    booking_service: &BookingService,
    subs: &mut SubscriptionManager,
    update_tx: &mpsc::Sender<SlotUpdate>,
) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error(String::new(), 400, "malformed JSON");
    };

    let known = msg
        .payload
        .get("command")
        .and_then(|v| v.as_str())
        .is_some_and(|c| WsCommand::NAMES.contains(&c));
    if !known {
        return WsMessage::error(msg.id, 404, "unknown command");
    }

    let command = match serde_json::from_value::<WsCommand>(msg.payload) {
        Ok(command) => command,
        Err(e) => return WsMessage::error(msg.id, 400, format!("invalid command payload: {e}")),
    };

    match command {
        WsCommand::WatchSlots { .. } if subs.count() >= MAX_WATCHES_PER_CONNECTION => {
            WsMessage::error(
                msg.id,
                429,
                format!("watch limit reached: {MAX_WATCHES_PER_CONNECTION} per connection"),
            )
        }
        WsCommand::WatchSlots {
            clinic_id,
            date,
            pet_id,
        } => match open_watch(booking_service, &clinic_id, &date, pet_id).await {
            Ok(watch) => {
                let watch_id = uuid::Uuid::new_v4().to_string();
                let snapshot = SlotUpdate::new(&watch_id, watch.query(), watch.current());
                let task = tokio::spawn(forward_updates(
                    watch_id.clone(),
                    watch,
                    update_tx.clone(),
                ));
                subs.insert(watch_id.clone(), task);
                tracing::debug!(%watch_id, %clinic_id, %date, "slot watch opened");
                WsMessage::response(
                    msg.id,
                    serde_json::to_value(&snapshot).unwrap_or_default(),
                )
            }
            Err(e) => WsMessage::error(msg.id, e.error_code(), e.to_string()),
        },
        WsCommand::Unwatch { watch_id } => {
            if subs.remove(&watch_id) {
                WsMessage::response(
                    msg.id,
                    serde_json::json!({
                        "unwatched": watch_id,
                        "remaining_count": subs.count(),
                    }),
                )
            } else {
                WsMessage::error(msg.id, 404, format!("unknown watch: {watch_id}"))
            }
        }
    }
}

async fn open_watch(
    booking_service: &BookingService,
    clinic_id: &str,
    date: &str,
    pet_id: String,
) -> Result<SlotWatch, GatewayError> {
    let query = SlotQuery {
        clinic_id: ClinicId::new(clinic_id)?,
        date: parse_date(date)?,
        pet_id: PetId::new(pet_id)?,
    };
    booking_service.watch_blocked_slots(query).await
}

/// Pushes every change of `watch` into the connection's update channel.
async fn forward_updates(watch_id: String, mut watch: SlotWatch, tx: mpsc::Sender<SlotUpdate>) {
    while let Some(next) = watch.next().await {
        match next {
            Ok(blocked) => {
                let update = SlotUpdate::new(&watch_id, watch.query(), &blocked);
                if tx.send(update).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(%watch_id, error = %e, "slot watch recomputation failed");
            }
        }
    }
}
