use crate::relay::{RelayChannel, RelayConnector};
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info};

/// WebSocket connection to the relay, JSON envelopes as text frames.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: websocket_url(&url.into()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// `http(s)://` relay addresses are served over `ws(s)://`.
pub fn websocket_url(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        url.to_owned()
    }
}

#[async_trait]
impl RelayConnector for WsConnector {
    async fn connect(&self) -> Result<RelayChannel> {
        let (stream, _) = connect_async(self.url.as_str())
            .await
            .with_context(|| format!("Failed to connect to relay at {}", self.url))?;
        info!("WebSocket connected: {}", self.url);

        let (mut sink, mut source) = stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<String>();
        let url = self.url.clone();

        tokio::spawn(async move {
            let mut send_task = tokio::spawn(async move {
                while let Some(text) = outbound_rx.recv().await {
                    if sink.send(Message::Text(text)).await.is_err() {
                        return;
                    }
                }
                let _ = sink.close().await;
            });

            let mut recv_task = tokio::spawn(async move {
                while let Some(frame) = source.next().await {
                    match frame {
                        Ok(Message::Text(text)) => {
                            if inbound_tx.send(text).is_err() {
                                break;
                            }
                        }
                        Ok(Message::Close(_)) => break,
                        Ok(_) => {}
                        Err(e) => {
                            debug!("WebSocket read error: {:?}", e);
                            break;
                        }
                    }
                }
            });

            tokio::select! {
                _ = (&mut send_task) => recv_task.abort(),
                _ = (&mut recv_task) => send_task.abort(),
            };

            info!("WebSocket disconnected: {}", url);
        });

        Ok(RelayChannel {
            outbound: outbound_tx,
            inbound: inbound_rx,
        })
    }
}
