use parley_core::PeerId;
use std::fmt;

/// Which side of a pair sends the first offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Initiator,
    Responder,
}

/// Tie-break between two peers: the greater id initiates.
pub fn initiates(self_id: &PeerId, peer_id: &PeerId) -> bool {
    self_id > peer_id
}

impl Role {
    pub fn resolve(self_id: &PeerId, peer_id: &PeerId) -> Self {
        if initiates(self_id, peer_id) {
            Role::Initiator
        } else {
            Role::Responder
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Initiator => f.write_str("initiator"),
            Role::Responder => f.write_str("responder"),
        }
    }
}
