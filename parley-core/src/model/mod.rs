mod error;
mod peer;
mod room;
mod signaling;

pub use error::CodecError;
pub use peer::PeerId;
pub use room::RoomId;
pub use signaling::{IceCandidate, RoomScope, Signal, SignalEnvelope};
