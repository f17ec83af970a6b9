use anyhow::Result;
use async_trait::async_trait;
use parley_client::transport::{
    NegotiationEvent, NegotiationTransport, SessionTag, TransportFactory,
};
use parley_core::{IceCandidate, PeerId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// What a session asked its transport to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    CreateOffer { ice_restart: bool },
    CreateAnswer,
    SetRemoteOffer(String),
    SetRemoteAnswer(String),
    AddCandidate(IceCandidate),
    ReplaceTrack,
    Close,
}

type CallLog = Arc<Mutex<Vec<(SessionTag, TransportCall)>>>;

struct MockTransport {
    tag: SessionTag,
    calls: CallLog,
    offers: AtomicUsize,
}

impl MockTransport {
    fn record(&self, call: TransportCall) {
        self.calls.lock().unwrap().push((self.tag.clone(), call));
    }
}

#[async_trait]
impl NegotiationTransport for MockTransport {
    async fn create_offer(&self, ice_restart: bool) -> Result<String> {
        self.record(TransportCall::CreateOffer { ice_restart });
        let n = self.offers.fetch_add(1, Ordering::SeqCst);
        Ok(format!("v=0 offer {} {}", self.tag.peer_id, n))
    }

    async fn create_answer(&self) -> Result<String> {
        self.record(TransportCall::CreateAnswer);
        Ok(format!("v=0 answer {}", self.tag.peer_id))
    }

    async fn set_remote_offer(&self, sdp: String) -> Result<()> {
        self.record(TransportCall::SetRemoteOffer(sdp));
        Ok(())
    }

    async fn set_remote_answer(&self, sdp: String) -> Result<()> {
        self.record(TransportCall::SetRemoteAnswer(sdp));
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        self.record(TransportCall::AddCandidate(candidate));
        Ok(())
    }

    async fn replace_audio_track(&self, _track: Arc<TrackLocalStaticSample>) -> Result<()> {
        self.record(TransportCall::ReplaceTrack);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.record(TransportCall::Close);
        Ok(())
    }
}

/// Factory handing out recording transports. Keeps each session's event
/// sender so tests can play the part of the transport callbacks.
#[derive(Clone, Default)]
pub struct MockTransportFactory {
    calls: CallLog,
    senders: Arc<Mutex<HashMap<PeerId, (SessionTag, mpsc::Sender<NegotiationEvent>)>>>,
    created: Arc<Mutex<Vec<SessionTag>>>,
    with_audio: Arc<Mutex<Vec<bool>>>,
}

impl MockTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(SessionTag, TransportCall)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, tag: &SessionTag) -> Vec<TransportCall> {
        self.calls()
            .into_iter()
            .filter(|(t, _)| t == tag)
            .map(|(_, c)| c)
            .collect()
    }

    pub fn created(&self) -> Vec<SessionTag> {
        self.created.lock().unwrap().clone()
    }

    /// Whether each created transport was handed a local track, in order.
    pub fn created_with_audio(&self) -> Vec<bool> {
        self.with_audio.lock().unwrap().clone()
    }

    /// Latest session tag and event sender created for `peer_id`.
    pub fn session(&self, peer_id: &PeerId) -> Option<(SessionTag, mpsc::Sender<NegotiationEvent>)> {
        self.senders.lock().unwrap().get(peer_id).cloned()
    }
}

#[async_trait]
impl TransportFactory for MockTransportFactory {
    async fn create(
        &self,
        tag: SessionTag,
        local_audio: Option<Arc<TrackLocalStaticSample>>,
        events: mpsc::Sender<NegotiationEvent>,
    ) -> Result<Box<dyn NegotiationTransport>> {
        self.created.lock().unwrap().push(tag.clone());
        self.with_audio.lock().unwrap().push(local_audio.is_some());
        self.senders
            .lock()
            .unwrap()
            .insert(tag.peer_id.clone(), (tag.clone(), events));
        Ok(Box::new(MockTransport {
            tag,
            calls: Arc::clone(&self.calls),
            offers: AtomicUsize::new(0),
        }))
    }
}
