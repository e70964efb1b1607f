//! WebSocket connection handler.

use std::sync::Arc;

use axum::{
    extract::{
        Path, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::task::JoinHandle;

use crate::{
    infrastructure::{connection::OutboundReceiver, dto::websocket::OutboundChatMessage},
    ui::{
        dispatcher::{DispatchError, Dispatcher},
        state::AppState,
    },
};

/// `GET /ws/chat/{room_name}`
///
/// Room names are validated before the upgrade so that a bad name is
/// answered with `400 Bad Request` instead of an opened-then-closed socket.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(room_name): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    if let Err(e) = state.join_room_usecase.validate(&room_name) {
        tracing::warn!("Rejected connection to room '{}': {}", room_name, e);
        return Err(StatusCode::BAD_REQUEST);
    }

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, room_name)))
}

/// Drains the connection's outbound queue into the WebSocket sink.
///
/// The queue ends when the connection is closed, either by its own
/// dispatcher or by the registry dropping a failed recipient; a close
/// frame is sent after whatever was already queued.
fn pusher_loop(
    mut rx: OutboundReceiver,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let frame = OutboundChatMessage::from(event.as_ref());
            let json = match serde_json::to_string(&frame) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to encode outbound frame: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                return;
            }
        }

        let _ = sender
            .send(Message::Close(Some(CloseFrame {
                code: close_code::NORMAL,
                reason: "".into(),
            })))
            .await;
    })
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, room_name: String) {
    let mut dispatcher = Dispatcher::new(state.clone());

    let rx = match dispatcher.open(&room_name).await {
        Ok(rx) => rx,
        Err(e) => {
            tracing::warn!("Failed to open connection in room '{}': {}", room_name, e);
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::POLICY,
                    reason: e.to_string().into(),
                })))
                .await;
            return;
        }
    };

    let connection_id = dispatcher
        .connection_id()
        .map(|id| id.to_string())
        .unwrap_or_default();
    tracing::info!("Connection '{}' joined room '{}'", connection_id, room_name);

    let (sender, mut receiver) = socket.split();
    let mut send_task = pusher_loop(rx, sender);
    let connection_closed = dispatcher.closed();
    tokio::pin!(connection_closed);

    loop {
        tokio::select! {
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => match dispatcher.handle_text(text.as_str()).await {
                    Ok(report) => {
                        tracing::debug!(
                            "Relayed message from '{}' in room '{}': {:?}",
                            connection_id,
                            room_name,
                            report
                        );
                    }
                    Err(DispatchError::Send(e)) => {
                        tracing::warn!("Failed to relay message from '{}': {}", connection_id, e);
                    }
                    Err(e) => {
                        tracing::warn!("Dropping connection '{}': {}", connection_id, e);
                        break;
                    }
                },
                Some(Ok(Message::Binary(_))) => {
                    let e = dispatcher.reject_frame("binary").await;
                    tracing::warn!("Dropping connection '{}': {}", connection_id, e);
                    break;
                }
                // Ping/pong is handled by the WebSocket protocol
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("Client '{}' requested close", connection_id);
                    break;
                }
                Some(Err(e)) => {
                    tracing::debug!("Transport error on '{}': {}", connection_id, e);
                    break;
                }
            },
            _ = &mut send_task => {
                tracing::debug!("Outbound path of '{}' finished", connection_id);
                break;
            }
            // the registry dropped this connection after a failed delivery
            _ = &mut connection_closed => {
                tracing::info!(
                    "Connection '{}' was dropped from room '{}'",
                    connection_id,
                    room_name
                );
                break;
            }
        }
    }

    dispatcher.close().await;

    // Let the writer flush frames queued before the close
    if !send_task.is_finished()
        && tokio::time::timeout(state.close_grace, &mut send_task)
            .await
            .is_err()
    {
        send_task.abort();
    }
}
