use crate::audio::AudioError;
use crate::transport::MediaHandle;
use async_trait::async_trait;
use parley_core::PeerId;
use std::sync::Arc;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    pub id: String,
    pub label: String,
}

/// A captured microphone stream.
pub trait LocalAudio: Send + Sync {
    fn device_id(&self) -> &str;

    /// Track handed to every peer connection.
    fn track(&self) -> Arc<TrackLocalStaticSample>;

    /// Byte frequency bins of the latest frame; `None` once stopped.
    fn frequency_data(&self) -> Option<Vec<u8>>;

    fn set_enabled(&self, enabled: bool);

    fn stop(&self);
}

/// Capture and playback subsystem.
#[async_trait]
pub trait AudioBackend: Send + Sync {
    async fn acquire(&self, device_id: Option<&str>) -> Result<Arc<dyn LocalAudio>, AudioError>;

    async fn list_devices(&self) -> Vec<AudioDevice>;

    fn attach_remote(&self, peer_id: &PeerId, media: &MediaHandle);

    fn detach_remote(&self, peer_id: &PeerId);
}
