use crate::negotiation::ConnectionState;
use crate::transport::{
    MediaHandle, NegotiationEvent, NegotiationEventKind, NegotiationTransport, SessionTag,
    TransportConfig, TransportFactory,
};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use parley_core::IceCandidate;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::RTCIceCandidate;
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::offer_answer_options::RTCOfferOptions;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::rtp_transceiver::{RTCRtpTransceiver, RTCRtpTransceiverInit};
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

/// webrtc-rs backed transport: one `RTCPeerConnection` per remote peer.
pub struct ConnectionWrapper {
    pub tag: SessionTag,
    pub peer_connection: Arc<RTCPeerConnection>,
    audio_sender: Mutex<Option<Arc<RTCRtpSender>>>,
}

impl ConnectionWrapper {
    pub async fn new(
        tag: SessionTag,
        config: TransportConfig,
        local_audio: Option<Arc<TrackLocalStaticSample>>,
        event_tx: mpsc::Sender<NegotiationEvent>,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let ice_servers = if config.ice_servers.is_empty() {
            vec![]
        } else {
            vec![RTCIceServer {
                urls: config.ice_servers,
                ..Default::default()
            }]
        };

        let rtc_config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        // Connectivity follows the ICE agent, the same signal the restart policy keys on.
        let state_tx = event_tx.clone();
        let state_tag = tag.clone();
        peer_connection.on_ice_connection_state_change(Box::new(
            move |s: RTCIceConnectionState| {
                let tx = state_tx.clone();
                let tag = state_tag.clone();

                Box::pin(async move {
                    info!("ICE state for {} ({}): {}", tag.peer_id, tag.session_id, s);
                    let Some(state) = map_ice_state(s) else {
                        return;
                    };
                    let _ = tx
                        .send(NegotiationEvent::new(
                            tag,
                            NegotiationEventKind::StateChanged(state),
                        ))
                        .await;
                })
            },
        ));

        let ice_tx = event_tx.clone();
        let ice_tag = tag.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let tag = ice_tag.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let _ = tx
                    .send(NegotiationEvent::new(
                        tag,
                        NegotiationEventKind::CandidateGenerated(IceCandidate::from(init)),
                    ))
                    .await;
            })
        }));

        let track_tx = event_tx.clone();
        let track_tag = tag.clone();
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();
                let tag = track_tag.clone();

                Box::pin(async move {
                    info!("Received audio track from {}", tag.peer_id);
                    let _ = tx
                        .send(NegotiationEvent::new(
                            tag,
                            NegotiationEventKind::TrackReceived(MediaHandle::from_remote(track)),
                        ))
                        .await;
                })
            },
        ));

        let wrapper = Self {
            tag,
            peer_connection,
            audio_sender: Mutex::new(None),
        };

        match local_audio {
            Some(track) => wrapper.attach_audio(track).await?,
            None => wrapper.reserve_audio().await?,
        }

        Ok(wrapper)
    }

    async fn attach_audio(&self, track: Arc<TrackLocalStaticSample>) -> Result<()> {
        let sender = self
            .peer_connection
            .add_track(track as Arc<dyn TrackLocal + Send + Sync>)
            .await
            .context("Failed to add local audio track")?;
        self.keep_sender(sender).await;
        Ok(())
    }

    /// Audio slot without a source yet. Negotiated like a real track so a
    /// later source can be swapped in with `replace_track`.
    async fn reserve_audio(&self) -> Result<()> {
        let transceiver = self
            .peer_connection
            .add_transceiver_from_kind(
                RTPCodecType::Audio,
                Some(RTCRtpTransceiverInit {
                    direction: RTCRtpTransceiverDirection::Sendrecv,
                    send_encodings: vec![],
                }),
            )
            .await
            .context("Failed to add audio transceiver")?;
        self.keep_sender(transceiver.sender().await).await;
        Ok(())
    }

    async fn keep_sender(&self, sender: Arc<RTCRtpSender>) {
        // RTCP has to be drained for the interceptors to keep working.
        let rtcp_sender = Arc::clone(&sender);
        tokio::spawn(async move {
            let mut buf = vec![0u8; 1500];
            while rtcp_sender.read(&mut buf).await.is_ok() {}
        });

        *self.audio_sender.lock().await = Some(sender);
    }
}

fn map_ice_state(state: RTCIceConnectionState) -> Option<ConnectionState> {
    match state {
        RTCIceConnectionState::Checking => Some(ConnectionState::Connecting),
        RTCIceConnectionState::Connected | RTCIceConnectionState::Completed => {
            Some(ConnectionState::Connected)
        }
        RTCIceConnectionState::Disconnected => Some(ConnectionState::Disconnected),
        RTCIceConnectionState::Failed => Some(ConnectionState::Failed),
        RTCIceConnectionState::Closed => Some(ConnectionState::Closed),
        _ => None,
    }
}

#[async_trait]
impl NegotiationTransport for ConnectionWrapper {
    async fn create_offer(&self, ice_restart: bool) -> Result<String> {
        let options = RTCOfferOptions {
            ice_restart,
            ..Default::default()
        };
        let offer = self.peer_connection.create_offer(Some(options)).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        Ok(offer.sdp)
    }

    async fn create_answer(&self) -> Result<String> {
        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(answer.sdp)
    }

    async fn set_remote_offer(&self, sdp: String) -> Result<()> {
        let desc = RTCSessionDescription::offer(sdp)?;
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn set_remote_answer(&self, sdp: String) -> Result<()> {
        let desc = RTCSessionDescription::answer(sdp)?;
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        self.peer_connection
            .add_ice_candidate(candidate.into())
            .await
            .context("Failed to add ICE candidate")?;
        Ok(())
    }

    async fn replace_audio_track(&self, track: Arc<TrackLocalStaticSample>) -> Result<()> {
        let Some(sender) = self.audio_sender.lock().await.clone() else {
            bail!("No audio sender for {}", self.tag.peer_id);
        };
        sender
            .replace_track(Some(track as Arc<dyn TrackLocal + Send + Sync>))
            .await
            .context("Failed to replace audio track")?;
        debug!("Replaced outgoing audio for {}", self.tag.peer_id);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

/// Produces a fresh [`ConnectionWrapper`] per session.
#[derive(Clone, Default)]
pub struct RtcTransportFactory {
    config: TransportConfig,
}

impl RtcTransportFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TransportFactory for RtcTransportFactory {
    async fn create(
        &self,
        tag: SessionTag,
        local_audio: Option<Arc<TrackLocalStaticSample>>,
        events: mpsc::Sender<NegotiationEvent>,
    ) -> Result<Box<dyn NegotiationTransport>> {
        let wrapper = ConnectionWrapper::new(tag, self.config.clone(), local_audio, events).await?;
        Ok(Box::new(wrapper))
    }
}
