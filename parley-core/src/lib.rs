pub mod model;
pub mod utils;

pub use model::{CodecError, IceCandidate, PeerId, RoomId, RoomScope, Signal, SignalEnvelope};
