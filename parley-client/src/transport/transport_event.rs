use crate::negotiation::ConnectionState;
use parley_core::{IceCandidate, PeerId};
use std::fmt;
use std::sync::Arc;
use webrtc::track::track_remote::TrackRemote;

/// Registry-wide identity of one negotiation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stamped on every transport event so late callbacks of a torn-down
/// session can be told apart from the session that replaced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionTag {
    pub peer_id: PeerId,
    pub session_id: SessionId,
}

/// Handle to a remote audio source.
#[derive(Clone)]
pub struct MediaHandle {
    stream_id: String,
    track_id: String,
    track: Option<Arc<TrackRemote>>,
}

impl MediaHandle {
    pub fn new(stream_id: impl Into<String>, track_id: impl Into<String>) -> Self {
        Self {
            stream_id: stream_id.into(),
            track_id: track_id.into(),
            track: None,
        }
    }

    pub(crate) fn from_remote(track: Arc<TrackRemote>) -> Self {
        Self {
            stream_id: track.stream_id(),
            track_id: track.id(),
            track: Some(track),
        }
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn track_id(&self) -> &str {
        &self.track_id
    }

    pub fn remote_track(&self) -> Option<&Arc<TrackRemote>> {
        self.track.as_ref()
    }
}

impl PartialEq for MediaHandle {
    fn eq(&self, other: &Self) -> bool {
        self.stream_id == other.stream_id && self.track_id == other.track_id
    }
}

impl fmt::Debug for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaHandle")
            .field("stream_id", &self.stream_id)
            .field("track_id", &self.track_id)
            .field("live", &self.track.is_some())
            .finish()
    }
}

/// What the transport (or a timer owned by the registry) reports back to the room loop.
#[derive(Debug)]
pub enum NegotiationEventKind {
    /// Local ICE candidate that has to reach the peer.
    CandidateGenerated(IceCandidate),

    /// Connectivity changed, already mapped onto the session state model.
    StateChanged(ConnectionState),

    /// Remote audio arrived.
    TrackReceived(MediaHandle),

    /// Debounce timer after a failure/disconnect elapsed.
    RestartCheck,
}

#[derive(Debug)]
pub struct NegotiationEvent {
    pub tag: SessionTag,
    pub kind: NegotiationEventKind,
}

impl NegotiationEvent {
    pub fn new(tag: SessionTag, kind: NegotiationEventKind) -> Self {
        Self { tag, kind }
    }
}
