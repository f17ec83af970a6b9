use std::fmt;

/// Lifecycle of one negotiation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    New,
    Connecting,
    Connected,
    Failed,
    Disconnected,
    Closed,
}

impl ConnectionState {
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;

        match (self, next) {
            (Closed, _) => false,
            (_, Closed) => true,
            (New, Connecting) => true,
            (Connecting, Connected | Failed | Disconnected) => true,
            (Connected, Failed | Disconnected) => true,
            (Failed | Disconnected, Connecting) => true,
            _ => false,
        }
    }

    /// Steps needed to reach `next`. A move that would skip `Connecting` goes
    /// through it; an impossible move yields no steps.
    pub fn path_to(self, next: ConnectionState) -> Vec<ConnectionState> {
        if self == next {
            return Vec::new();
        }
        if self.can_transition_to(next) {
            return vec![next];
        }
        let via = ConnectionState::Connecting;
        if self.can_transition_to(via) && via.can_transition_to(next) {
            return vec![via, next];
        }
        Vec::new()
    }

    /// Connected or on the way there.
    pub fn is_live(self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Connected)
    }

    pub fn is_broken(self) -> bool {
        matches!(self, ConnectionState::Failed | ConnectionState::Disconnected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::New => "new",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Failed => "failed",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}
