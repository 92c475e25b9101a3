//! Transport Adapter — WebSocket upgrade handler (§4.6).
//!
//! Registers a Hub subscriber, writes each dequeued `StatusUpdate` as one
//! JSON frame, drains inbound frames so client keep-alives don't stall the
//! connection, and evicts the subscriber on write failure or close —
//! exactly the cases the teacher's `websocket_handler` covers, adapted to
//! this hub's per-subscriber inbox instead of a shared broadcast receiver.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info};

use crate::api::state::ApiState;
use crate::api::types::WsFrame;

pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<ApiState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: ApiState) {
    info!("websocket client connected");

    let (id, mut inbox) = state.hub.subscribe().await;
    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(update) = inbox.recv().await {
            let frame = WsFrame::from(update);
            let Ok(text) = serde_json::to_string(&frame) else {
                continue;
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                debug!("websocket send failed, client disconnected");
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.hub.evict(id).await;
    info!("websocket client disconnected");
}
