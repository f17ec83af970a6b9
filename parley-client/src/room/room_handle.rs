use crate::audio::AudioDevice;
use crate::error::RoomError;
use crate::room::{Participant, RoomCommand};
use parley_core::RoomScope;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{mpsc, oneshot, watch};

struct HandleInner {
    scope: RoomScope,
    command_tx: mpsc::UnboundedSender<RoomCommand>,
    left: AtomicBool,
    done_rx: watch::Receiver<bool>,
}

impl HandleInner {
    fn leave(&self) {
        if !self.left.swap(true, Ordering::SeqCst) {
            let _ = self.command_tx.send(RoomCommand::Leave);
        }
    }
}

impl Drop for HandleInner {
    fn drop(&mut self) {
        self.leave();
    }
}

/// Cloneable control surface of a joined room. Dropping the last clone leaves.
#[derive(Clone)]
pub struct RoomHandle {
    inner: Arc<HandleInner>,
}

impl RoomHandle {
    pub(crate) fn new(
        scope: RoomScope,
        command_tx: mpsc::UnboundedSender<RoomCommand>,
        done_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                scope,
                command_tx,
                left: AtomicBool::new(false),
                done_rx,
            }),
        }
    }

    pub fn scope(&self) -> &RoomScope {
        &self.inner.scope
    }

    fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        if self.inner.left.load(Ordering::SeqCst) {
            return Err(RoomError::Closed);
        }
        self.inner
            .command_tx
            .send(cmd)
            .map_err(|_| RoomError::Closed)
    }

    pub fn toggle_mute(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::ToggleMute)
    }

    pub fn change_device(&self, device_id: impl Into<String>) -> Result<(), RoomError> {
        self.send(RoomCommand::ChangeDevice(device_id.into()))
    }

    pub async fn participants(&self) -> Result<Vec<Participant>, RoomError> {
        let (tx, rx) = oneshot::channel();
        self.send(RoomCommand::Participants(tx))?;
        rx.await.map_err(|_| RoomError::Closed)
    }

    pub async fn devices(&self) -> Result<Vec<AudioDevice>, RoomError> {
        let (tx, rx) = oneshot::channel();
        self.send(RoomCommand::Devices(tx))?;
        rx.await.map_err(|_| RoomError::Closed)
    }

    /// Never blocks; safe to call from a signal handler. Repeated calls do nothing.
    pub fn leave(&self) {
        self.inner.leave();
    }

    pub fn has_left(&self) -> bool {
        self.inner.left.load(Ordering::SeqCst)
    }

    /// Resolves once the room loop has finished tearing down.
    pub async fn closed(&self) {
        let mut done = self.inner.done_rx.clone();
        let _ = done.wait_for(|finished| *finished).await;
    }
}
