use crate::audio::AudioDevice;
use crate::relay::RelayLinkState;
use crate::room::Participant;
use async_trait::async_trait;

/// Something the presentation layer should tell the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Toast(String),
    Error {
        title: String,
        message: String,
        retryable: bool,
    },
}

/// Presentation layer hooks. Called from the room loop, so implementations
/// should return quickly.
#[async_trait]
pub trait RoomObserver: Send + Sync + 'static {
    async fn on_participants(&self, participants: Vec<Participant>);

    async fn on_connection_status(&self, status: RelayLinkState);

    async fn on_notice(&self, notice: Notice);

    async fn on_devices(&self, devices: Vec<AudioDevice>);
}
