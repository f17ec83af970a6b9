use crate::model::error::CodecError;
use crate::model::peer::PeerId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

/// Connectivity candidate in the browser `RTCIceCandidateInit` JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

/// Negotiation payload carried inside a `signal` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Signal {
    Offer { sdp: String },
    Answer { sdp: String },
    Candidate { candidate: IceCandidate },
}

impl Signal {
    pub fn kind(&self) -> &'static str {
        match self {
            Signal::Offer { .. } => "offer",
            Signal::Answer { .. } => "answer",
            Signal::Candidate { .. } => "candidate",
        }
    }
}

/// Every message exchanged with the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum SignalEnvelope {
    Join {
        room_id: RoomId,
        peer_id: PeerId,
    },
    Peers {
        #[serde(default)]
        peers: Vec<PeerId>,
    },
    NewPeer {
        peer_id: PeerId,
    },
    Signal {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_id: Option<RoomId>,
        from: PeerId,
        to: PeerId,
        signal: Signal,
    },
    PeerLeft {
        peer_id: PeerId,
    },
    Mute {
        room_id: RoomId,
        peer_id: PeerId,
        value: bool,
    },
    Speaking {
        room_id: RoomId,
        peer_id: PeerId,
        value: bool,
    },
    Leave {
        room_id: RoomId,
        peer_id: PeerId,
    },
}

impl SignalEnvelope {
    pub fn encode(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(text: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SignalEnvelope::Join { .. } => "join",
            SignalEnvelope::Peers { .. } => "peers",
            SignalEnvelope::NewPeer { .. } => "new-peer",
            SignalEnvelope::Signal { .. } => "signal",
            SignalEnvelope::PeerLeft { .. } => "peer-left",
            SignalEnvelope::Mute { .. } => "mute",
            SignalEnvelope::Speaking { .. } => "speaking",
            SignalEnvelope::Leave { .. } => "leave",
        }
    }
}

/// Identity of the local participant inside one room; builds outbound envelopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomScope {
    pub self_id: PeerId,
    pub room_id: RoomId,
}

impl RoomScope {
    pub fn new(self_id: PeerId, room_id: RoomId) -> Self {
        Self { self_id, room_id }
    }

    pub fn join(&self) -> SignalEnvelope {
        SignalEnvelope::Join {
            room_id: self.room_id.clone(),
            peer_id: self.self_id.clone(),
        }
    }

    pub fn leave(&self) -> SignalEnvelope {
        SignalEnvelope::Leave {
            room_id: self.room_id.clone(),
            peer_id: self.self_id.clone(),
        }
    }

    pub fn signal_to(&self, to: &PeerId, signal: Signal) -> SignalEnvelope {
        SignalEnvelope::Signal {
            room_id: Some(self.room_id.clone()),
            from: self.self_id.clone(),
            to: to.clone(),
            signal,
        }
    }

    pub fn mute(&self, value: bool) -> SignalEnvelope {
        SignalEnvelope::Mute {
            room_id: self.room_id.clone(),
            peer_id: self.self_id.clone(),
            value,
        }
    }

    pub fn speaking(&self, value: bool) -> SignalEnvelope {
        SignalEnvelope::Speaking {
            room_id: self.room_id.clone(),
            peer_id: self.self_id.clone(),
            value,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod rtc {
    use super::IceCandidate;
    use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;

    impl From<RTCIceCandidateInit> for IceCandidate {
        fn from(init: RTCIceCandidateInit) -> Self {
            Self {
                candidate: init.candidate,
                sdp_mid: init.sdp_mid,
                sdp_m_line_index: init.sdp_mline_index,
                username_fragment: init.username_fragment,
            }
        }
    }

    impl From<IceCandidate> for RTCIceCandidateInit {
        fn from(candidate: IceCandidate) -> Self {
            Self {
                candidate: candidate.candidate,
                sdp_mid: candidate.sdp_mid,
                sdp_mline_index: candidate.sdp_m_line_index,
                username_fragment: candidate.username_fragment,
            }
        }
    }
}
