use crate::transport::{NegotiationEvent, SessionTag};
use anyhow::Result;
use async_trait::async_trait;
use parley_core::IceCandidate;
use std::sync::Arc;
use tokio::sync::mpsc;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// The media-path endpoint driven by one negotiation session.
///
/// Description-producing calls both create the description and apply it
/// locally, returning the SDP that has to be sent to the peer.
#[async_trait]
pub trait NegotiationTransport: Send + Sync {
    async fn create_offer(&self, ice_restart: bool) -> Result<String>;

    async fn create_answer(&self) -> Result<String>;

    async fn set_remote_offer(&self, sdp: String) -> Result<()>;

    async fn set_remote_answer(&self, sdp: String) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    /// Swap the outgoing audio without renegotiating.
    async fn replace_audio_track(&self, track: Arc<TrackLocalStaticSample>) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// Builds transports for new sessions. Every callback of the produced
/// transport must be reported on `events`, stamped with `tag`.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(
        &self,
        tag: SessionTag,
        local_audio: Option<Arc<TrackLocalStaticSample>>,
        events: mpsc::Sender<NegotiationEvent>,
    ) -> Result<Box<dyn NegotiationTransport>>;
}
