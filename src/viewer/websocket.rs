//! WebSocket client consuming the engine's `/api/v1/stream` (§6.3).
//!
//! Reconnects with a fixed backoff on any disconnect, matching the
//! teacher's `WebSocketClient::run` loop.

use anyhow::{Context, Result};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::api::types::WsFrame;

pub struct WebSocketClient {
    url: String,
}

impl WebSocketClient {
    pub fn new(api_url: &str) -> Self {
        let ws_url = api_url.replace("http://", "ws://").replace("https://", "wss://");
        Self {
            url: format!("{ws_url}/api/v1/stream"),
        }
    }

    pub fn connect(self) -> mpsc::UnboundedReceiver<WsFrame> {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            loop {
                if let Err(e) = self.connect_once(&tx).await {
                    tracing::error!("viewer websocket error: {e}, reconnecting in 5s");
                }
                tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
            }
        });
        rx
    }

    async fn connect_once(&self, tx: &mpsc::UnboundedSender<WsFrame>) -> Result<()> {
        let (stream, _) = connect_async(&self.url).await.context("failed to connect to stream")?;
        tracing::info!("viewer websocket connected to {}", self.url);

        let (_write, mut read) = stream.split();
        while let Some(msg) = read.next().await {
            let msg = msg.context("websocket message error")?;
            match msg {
                Message::Text(text) => match serde_json::from_str::<WsFrame>(&text) {
                    Ok(frame) => {
                        if tx.send(frame).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::error!("failed to parse stream frame: {e}"),
                },
                Message::Close(_) => {
                    tracing::info!("stream closed by engine");
                    break;
                }
                _ => {}
            }
        }
        Ok(())
    }
}
