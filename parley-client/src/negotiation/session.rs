use crate::negotiation::{ConnectionState, Role};
use crate::relay::SignalingOutput;
use crate::transport::{NegotiationTransport, SessionTag};
use parley_core::{IceCandidate, PeerId, RoomScope, Signal};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Offer/answer/candidate protocol with one remote peer.
pub struct NegotiationSession {
    tag: SessionTag,
    role: Role,
    state: ConnectionState,
    transport: Box<dyn NegotiationTransport>,
    scope: RoomScope,
    awaiting_answer: bool,
    has_remote_description: bool,
    pending_candidates: Vec<IceCandidate>,
    restart_armed: bool,
}

impl NegotiationSession {
    pub fn new(
        tag: SessionTag,
        role: Role,
        transport: Box<dyn NegotiationTransport>,
        scope: RoomScope,
    ) -> Self {
        Self {
            tag,
            role,
            state: ConnectionState::New,
            transport,
            scope,
            awaiting_answer: false,
            has_remote_description: false,
            pending_candidates: Vec::new(),
            restart_armed: false,
        }
    }

    pub fn tag(&self) -> &SessionTag {
        &self.tag
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.tag.peer_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The initiator offers right away; the responder waits for the peer.
    pub async fn start(&mut self, out: &dyn SignalingOutput) {
        if self.role == Role::Initiator {
            self.create_offer(out).await;
        }
    }

    pub async fn create_offer(&mut self, out: &dyn SignalingOutput) {
        self.send_offer(false, out).await;
    }

    async fn send_offer(&mut self, ice_restart: bool, out: &dyn SignalingOutput) {
        match self.transport.create_offer(ice_restart).await {
            Ok(sdp) => {
                self.awaiting_answer = true;
                // A restart stays broken until the transport reports progress.
                if !ice_restart {
                    self.advance(ConnectionState::Connecting);
                }
                out.send(&self.scope.signal_to(self.peer_id(), Signal::Offer { sdp }));
            }
            Err(e) => error!("Failed to create offer for {}: {:?}", self.tag.peer_id, e),
        }
    }

    pub async fn handle_remote_signal(&mut self, signal: Signal, out: &dyn SignalingOutput) {
        match signal {
            Signal::Offer { sdp } => self.accept_offer(sdp, out).await,
            Signal::Answer { sdp } => self.accept_answer(sdp).await,
            Signal::Candidate { candidate } => self.accept_candidate(candidate).await,
        }
    }

    async fn accept_offer(&mut self, sdp: String, out: &dyn SignalingOutput) {
        if let Err(e) = self.transport.set_remote_offer(sdp).await {
            error!("SDP error for {}: {:?}", self.tag.peer_id, e);
            return;
        }
        self.has_remote_description = true;
        self.awaiting_answer = false;
        self.flush_candidates().await;

        match self.transport.create_answer().await {
            Ok(sdp) => {
                self.advance(ConnectionState::Connecting);
                out.send(&self.scope.signal_to(self.peer_id(), Signal::Answer { sdp }));
            }
            Err(e) => error!("Failed to create answer for {}: {:?}", self.tag.peer_id, e),
        }
    }

    async fn accept_answer(&mut self, sdp: String) {
        if !self.awaiting_answer {
            debug!("Ignoring unexpected answer from {}", self.tag.peer_id);
            return;
        }
        if let Err(e) = self.transport.set_remote_answer(sdp).await {
            error!("SDP error for {}: {:?}", self.tag.peer_id, e);
            return;
        }
        self.awaiting_answer = false;
        self.has_remote_description = true;
        self.flush_candidates().await;
    }

    async fn accept_candidate(&mut self, candidate: IceCandidate) {
        if !self.has_remote_description {
            self.pending_candidates.push(candidate);
            return;
        }
        self.add_candidate(candidate).await;
    }

    async fn flush_candidates(&mut self) {
        for candidate in std::mem::take(&mut self.pending_candidates) {
            self.add_candidate(candidate).await;
        }
    }

    async fn add_candidate(&self, candidate: IceCandidate) {
        if let Err(e) = self.transport.add_ice_candidate(candidate).await {
            debug!("Dropped ICE candidate for {}: {:?}", self.tag.peer_id, e);
        }
    }

    /// Applies an observed connectivity change. Returns `true` when the
    /// session ended up failed or disconnected and a restart check is due.
    pub fn observe_state(&mut self, next: ConnectionState) -> bool {
        let before = self.state;
        self.advance(next);
        self.state != before && self.state.is_broken()
    }

    pub fn needs_restart(&self) -> bool {
        self.state.is_broken()
    }

    /// Claims the single pending restart check. Returns `false` if one is
    /// already scheduled.
    pub fn arm_restart(&mut self) -> bool {
        !std::mem::replace(&mut self.restart_armed, true)
    }

    /// ICE restart after the debounce elapsed. Returns `true` when another
    /// check is due.
    ///
    /// The initiator re-offers on every check until the transport reports
    /// progress. The responder never offers; crossing offers would collide,
    /// so it waits for the initiator's.
    pub async fn restart_if_stalled(&mut self, out: &dyn SignalingOutput) -> bool {
        self.restart_armed = false;
        if !self.needs_restart() {
            return false;
        }
        match self.role {
            Role::Initiator => {
                info!(
                    "Restarting ICE with {} ({})",
                    self.tag.peer_id, self.tag.session_id
                );
                self.send_offer(true, out).await;
                true
            }
            Role::Responder => {
                debug!(
                    "{} ({}) still {}, waiting for restart offer",
                    self.tag.peer_id, self.tag.session_id, self.state
                );
                false
            }
        }
    }

    pub async fn replace_audio_track(&self, track: Arc<TrackLocalStaticSample>) {
        if let Err(e) = self.transport.replace_audio_track(track).await {
            warn!("Failed to swap audio for {}: {:?}", self.tag.peer_id, e);
        }
    }

    pub async fn close(&mut self) {
        self.advance(ConnectionState::Closed);
        self.pending_candidates.clear();
        if let Err(e) = self.transport.close().await {
            debug!("Error closing transport for {}: {:?}", self.tag.peer_id, e);
        }
    }

    fn advance(&mut self, next: ConnectionState) {
        for step in self.state.path_to(next) {
            debug!(
                "{} ({}): {} -> {}",
                self.tag.peer_id, self.tag.session_id, self.state, step
            );
            self.state = step;
        }
    }
}
