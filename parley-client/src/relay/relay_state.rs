use std::fmt;

/// Status of the control-plane connection to the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelayLinkState {
    #[default]
    Disconnected,
    Connecting,
    Open,
}

impl fmt::Display for RelayLinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayLinkState::Disconnected => f.write_str("disconnected"),
            RelayLinkState::Connecting => f.write_str("connecting"),
            RelayLinkState::Open => f.write_str("connected"),
        }
    }
}
