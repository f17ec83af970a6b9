use crate::relay::{RelayChannel, RelayConnector, RelayLinkState, SignalingOutput};
use parley_core::{RoomScope, SignalEnvelope};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const CLOSE_GRACE: Duration = Duration::from_secs(1);

struct RelayInner {
    outbound_tx: mpsc::UnboundedSender<String>,
    state_rx: watch::Receiver<RelayLinkState>,
    shutdown: Arc<Notify>,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// Owns the single control-plane connection of a room: connects, announces
/// the room with `join`, reconnects at a fixed interval and pumps frames.
#[derive(Clone)]
pub struct RelayLink {
    inner: Arc<RelayInner>,
}

enum PumpExit {
    Lost,
    Shutdown,
}

impl RelayLink {
    /// Starts the link task. Inbound text frames arrive on the returned receiver.
    pub fn connect(
        connector: Arc<dyn RelayConnector>,
        scope: RoomScope,
        reconnect_delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(RelayLinkState::Disconnected);
        let shutdown = Arc::new(Notify::new());

        let task = tokio::spawn(run_link(
            connector,
            scope,
            reconnect_delay,
            outbound_rx,
            inbound_tx,
            state_tx,
            Arc::clone(&shutdown),
        ));

        let link = Self {
            inner: Arc::new(RelayInner {
                outbound_tx,
                state_rx,
                shutdown,
                task: Mutex::new(Some(task)),
            }),
        };
        (link, inbound_rx)
    }

    pub fn state(&self) -> RelayLinkState {
        *self.inner.state_rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<RelayLinkState> {
        self.inner.state_rx.clone()
    }

    /// Stops reconnecting. Frames already queued are still written.
    pub fn close(&self) {
        self.inner.shutdown.notify_one();
    }

    /// [`close`](Self::close) and wait until the channel is gone.
    pub async fn shutdown(&self) {
        self.close();
        let task = self.inner.task.lock().await.take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }
}

impl SignalingOutput for RelayLink {
    fn send(&self, envelope: &SignalEnvelope) {
        if self.state() != RelayLinkState::Open {
            debug!("Relay not open, dropping {}", envelope.kind());
            return;
        }
        match envelope.encode() {
            Ok(text) => {
                let _ = self.inner.outbound_tx.send(text);
            }
            Err(e) => error!("Failed to serialize {}: {}", envelope.kind(), e),
        }
    }
}

async fn run_link(
    connector: Arc<dyn RelayConnector>,
    scope: RoomScope,
    reconnect_delay: Duration,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    inbound_tx: mpsc::UnboundedSender<String>,
    state_tx: watch::Sender<RelayLinkState>,
    shutdown: Arc<Notify>,
) {
    loop {
        state_tx.send_replace(RelayLinkState::Connecting);

        let connected = tokio::select! {
            _ = shutdown.notified() => break,
            res = connector.connect() => res,
        };

        match connected {
            Ok(mut channel) => {
                // Anything queued before this channel existed belongs to no one.
                while outbound_rx.try_recv().is_ok() {}

                match scope.join().encode() {
                    Ok(join) => {
                        let _ = channel.outbound.send(join);
                    }
                    Err(e) => error!("Failed to serialize join: {}", e),
                }
                state_tx.send_replace(RelayLinkState::Open);
                info!("Relay link open for room {}", scope.room_id);

                match pump(&mut channel, &mut outbound_rx, &inbound_tx, &shutdown).await {
                    PumpExit::Shutdown => {
                        flush_and_close(channel, &mut outbound_rx).await;
                        break;
                    }
                    PumpExit::Lost => warn!("Relay link lost"),
                }
            }
            Err(e) => warn!("Relay connect failed: {:?}", e),
        }

        state_tx.send_replace(RelayLinkState::Disconnected);
        while outbound_rx.try_recv().is_ok() {}

        debug!("Reconnecting to relay in {:?}", reconnect_delay);
        tokio::select! {
            _ = shutdown.notified() => break,
            _ = tokio::time::sleep(reconnect_delay) => {}
        }
    }

    state_tx.send_replace(RelayLinkState::Disconnected);
    info!("Relay link closed");
}

async fn pump(
    channel: &mut RelayChannel,
    outbound_rx: &mut mpsc::UnboundedReceiver<String>,
    inbound_tx: &mpsc::UnboundedSender<String>,
    shutdown: &Notify,
) -> PumpExit {
    loop {
        tokio::select! {
            biased;

            _ = shutdown.notified() => return PumpExit::Shutdown,

            Some(text) = outbound_rx.recv() => {
                if channel.outbound.send(text).is_err() {
                    return PumpExit::Lost;
                }
            }

            frame = channel.inbound.recv() => match frame {
                Some(text) => {
                    if inbound_tx.send(text).is_err() {
                        return PumpExit::Shutdown;
                    }
                }
                None => return PumpExit::Lost,
            },
        }
    }
}

async fn flush_and_close(
    channel: RelayChannel,
    outbound_rx: &mut mpsc::UnboundedReceiver<String>,
) {
    let RelayChannel {
        outbound,
        mut inbound,
    } = channel;

    while let Ok(text) = outbound_rx.try_recv() {
        if outbound.send(text).is_err() {
            break;
        }
    }
    drop(outbound);

    let _ = tokio::time::timeout(CLOSE_GRACE, async {
        while inbound.recv().await.is_some() {}
    })
    .await;
}
