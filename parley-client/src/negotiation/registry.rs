use crate::negotiation::{NegotiationSession, Role};
use crate::relay::SignalingOutput;
use crate::room::ParticipantDirectory;
use crate::transport::{
    MediaHandle, NegotiationEvent, NegotiationEventKind, SessionId, SessionTag, TransportFactory,
};
use parley_core::{PeerId, RoomScope, Signal};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Peer id → negotiation session. At most one session per peer.
pub struct SessionRegistry {
    scope: RoomScope,
    sessions: HashMap<PeerId, NegotiationSession>,
    next_session_id: u64,
    factory: Arc<dyn TransportFactory>,
    events_tx: mpsc::Sender<NegotiationEvent>,
    local_audio: Option<Arc<TrackLocalStaticSample>>,
    restart_debounce: Duration,
}

impl SessionRegistry {
    pub fn new(
        scope: RoomScope,
        factory: Arc<dyn TransportFactory>,
        events_tx: mpsc::Sender<NegotiationEvent>,
        restart_debounce: Duration,
    ) -> Self {
        Self {
            scope,
            sessions: HashMap::new(),
            next_session_id: 0,
            factory,
            events_tx,
            local_audio: None,
            restart_debounce,
        }
    }

    /// Track attached to every session created from now on.
    pub fn set_local_audio(&mut self, track: Option<Arc<TrackLocalStaticSample>>) {
        self.local_audio = track;
    }

    pub fn get(&self, peer_id: &PeerId) -> Option<&NegotiationSession> {
        self.sessions.get(peer_id)
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.sessions.contains_key(peer_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn peers(&self) -> Vec<PeerId> {
        self.sessions.keys().cloned().collect()
    }

    /// Returns the live session for `peer_id`, creating and starting one if absent.
    pub async fn ensure_session(
        &mut self,
        peer_id: &PeerId,
        out: &dyn SignalingOutput,
    ) -> Option<SessionId> {
        if let Some(existing) = self.sessions.get(peer_id) {
            return Some(existing.tag().session_id);
        }

        let role = Role::resolve(&self.scope.self_id, peer_id);
        let session_id = self.open_session(peer_id, role).await?;
        if let Some(session) = self.sessions.get_mut(peer_id) {
            session.start(out).await;
        }
        Some(session_id)
    }

    async fn open_session(&mut self, peer_id: &PeerId, role: Role) -> Option<SessionId> {
        self.next_session_id += 1;
        let tag = SessionTag {
            peer_id: peer_id.clone(),
            session_id: SessionId(self.next_session_id),
        };

        let transport = match self
            .factory
            .create(tag.clone(), self.local_audio.clone(), self.events_tx.clone())
            .await
        {
            Ok(t) => t,
            Err(e) => {
                error!("Failed to create transport for {}: {:?}", peer_id, e);
                return None;
            }
        };

        info!("Session {} with {} opened as {}", tag.session_id, peer_id, role);
        let session_id = tag.session_id;
        let session = NegotiationSession::new(tag, role, transport, self.scope.clone());
        self.sessions.insert(peer_id.clone(), session);
        Some(session_id)
    }

    /// Routes an inbound signal. An offer from an unknown peer opens a
    /// responder session; anything else for an unknown peer is dropped.
    pub async fn handle_signal(&mut self, from: &PeerId, signal: Signal, out: &dyn SignalingOutput) {
        if !self.sessions.contains_key(from) {
            if !matches!(signal, Signal::Offer { .. }) {
                debug!("Ignoring {} from unknown peer {}", signal.kind(), from);
                return;
            }
            if self.open_session(from, Role::Responder).await.is_none() {
                return;
            }
        }

        if let Some(session) = self.sessions.get_mut(from) {
            session.handle_remote_signal(signal, out).await;
        }
    }

    /// Routes a transport event to its session. Events whose session id no
    /// longer matches the live session are discarded. Returns remote media
    /// that has to be attached by the caller.
    pub async fn handle_event(
        &mut self,
        event: NegotiationEvent,
        out: &dyn SignalingOutput,
    ) -> Option<(PeerId, MediaHandle)> {
        let NegotiationEvent { tag, kind } = event;

        let Some(session) = self.sessions.get_mut(&tag.peer_id) else {
            debug!("Dropping event for removed peer {}", tag.peer_id);
            return None;
        };
        if session.tag().session_id != tag.session_id {
            debug!(
                "Dropping stale event for {} ({}, live {})",
                tag.peer_id,
                tag.session_id,
                session.tag().session_id
            );
            return None;
        }

        match kind {
            NegotiationEventKind::CandidateGenerated(candidate) => {
                out.send(&self.scope.signal_to(&tag.peer_id, Signal::Candidate { candidate }));
            }
            NegotiationEventKind::StateChanged(state) => {
                if session.observe_state(state) && session.arm_restart() {
                    self.schedule_restart_check(tag);
                }
            }
            NegotiationEventKind::TrackReceived(media) => {
                return Some((tag.peer_id, media));
            }
            NegotiationEventKind::RestartCheck => {
                if session.restart_if_stalled(out).await && session.arm_restart() {
                    self.schedule_restart_check(tag);
                }
            }
        }
        None
    }

    fn schedule_restart_check(&self, tag: SessionTag) {
        let tx = self.events_tx.clone();
        let delay = self.restart_debounce;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx
                .send(NegotiationEvent::new(tag, NegotiationEventKind::RestartCheck))
                .await;
        });
    }

    /// Closes and evicts the session and the participant. Returns whether
    /// anything was known about the peer.
    pub async fn remove(&mut self, peer_id: &PeerId, directory: &mut ParticipantDirectory) -> bool {
        let session = self.sessions.remove(peer_id);
        let had_session = session.is_some();
        if let Some(mut session) = session {
            session.close().await;
            info!("Session with {} closed", peer_id);
        }
        directory.remove(peer_id).is_some() || had_session
    }

    pub async fn remove_all(&mut self, directory: &mut ParticipantDirectory) {
        for (peer_id, mut session) in self.sessions.drain() {
            session.close().await;
            directory.remove(&peer_id);
        }
    }

    pub async fn replace_audio_track(&mut self, track: Arc<TrackLocalStaticSample>) {
        self.local_audio = Some(Arc::clone(&track));
        for session in self.sessions.values() {
            session.replace_audio_track(Arc::clone(&track)).await;
        }
    }
}
