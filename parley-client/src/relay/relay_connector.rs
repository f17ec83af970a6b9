use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// One established control channel carrying text frames.
///
/// Dropping `outbound` closes the channel once queued frames are written;
/// `inbound` ends when the channel is gone.
pub struct RelayChannel {
    pub outbound: mpsc::UnboundedSender<String>,
    pub inbound: mpsc::UnboundedReceiver<String>,
}

#[async_trait]
pub trait RelayConnector: Send + Sync {
    async fn connect(&self) -> Result<RelayChannel>;
}
