//! WebSocket session handling.
//!
//! Each accepted socket becomes one table session: the server mints a
//! session id, tells the client with a `your_id` frame, registers a
//! bounded subscriber channel with the table actor, and then pumps
//! frames both ways until either side goes away. Malformed inbound
//! frames are logged and dropped; they never reach the table.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use holdem::game::PlayerId;
use holdem::net::messages::{ClientMessage, ServerMessage, YourIdPayload};
use holdem::table::{TableClosed, TableHandle};
use log::{debug, error, info, warn};
use tokio::sync::mpsc;

use super::AppState;

pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let player_id = PlayerId::new();
    info!("websocket session {} connected", player_id.short());
    state.metrics.connection_opened();

    let (mut sink, mut stream) = socket.split();

    // The client learns its identity before any snapshot arrives.
    let hello = ServerMessage::YourId(YourIdPayload { id: player_id });
    match serde_json::to_string(&hello) {
        Ok(frame) => {
            if sink.send(Message::Text(frame.into())).await.is_err() {
                state.metrics.connection_closed();
                return;
            }
        }
        Err(err) => {
            error!("failed to encode your_id frame: {err}");
            state.metrics.connection_closed();
            return;
        }
    }

    let (subscriber, mut outbound) = mpsc::channel::<String>(state.subscriber_capacity);
    let default_name = format!("Player {}", player_id.short());
    if state
        .table
        .connect(player_id, default_name, subscriber)
        .await
        .is_err()
    {
        warn!("table is closed; rejecting session {}", player_id.short());
        state.metrics.connection_closed();
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if sink.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let table = state.table.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = stream.next().await {
            let text = match message {
                Message::Text(text) => text,
                Message::Close(_) => break,
                // Pings are answered by axum itself.
                _ => continue,
            };
            let parsed: ClientMessage = match serde_json::from_str(&text) {
                Ok(parsed) => parsed,
                Err(err) => {
                    debug!(
                        "ignoring malformed frame from {}: {err}",
                        player_id.short()
                    );
                    continue;
                }
            };
            if dispatch(&table, player_id, parsed).await.is_err() {
                break;
            }
        }
    });

    // Whichever side finishes first tears the session down.
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    let _ = state.table.disconnect(player_id).await;
    state.metrics.connection_closed();
    info!("websocket session {} disconnected", player_id.short());
}

async fn dispatch(
    table: &TableHandle,
    player_id: PlayerId,
    message: ClientMessage,
) -> Result<(), TableClosed> {
    match message {
        ClientMessage::PlayerJoin(payload) => {
            let name = payload.name.trim();
            if name.is_empty() {
                Ok(())
            } else {
                table.set_name(player_id, name.to_string()).await
            }
        }
        ClientMessage::PlayerReady(payload) => table.set_ready(player_id, payload.is_ready).await,
        ClientMessage::PlayerAction(payload) => match payload.to_action() {
            Some(action) => table.action(player_id, action).await,
            None => {
                warn!(
                    "unknown action {:?} from {}",
                    payload.action,
                    player_id.short()
                );
                Ok(())
            }
        },
        ClientMessage::ChatMessage(payload) => table.chat(player_id, payload.message).await,
    }
}
