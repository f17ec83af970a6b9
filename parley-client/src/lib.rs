pub mod audio;
pub mod config;
pub mod error;
pub mod negotiation;
pub mod presence;
pub mod relay;
pub mod room;
pub mod transport;

pub use audio::{AudioBackend, AudioDevice, AudioError, LocalAudio, SilentAudioBackend};
pub use config::ClientConfig;
pub use error::RoomError;
pub use negotiation::{ConnectionState, Role, SessionRegistry, initiates};
pub use relay::{RelayConnector, RelayLink, RelayLinkState, SignalingOutput, WsConnector};
pub use room::{Notice, Participant, Room, RoomHandle, RoomObserver, RoomServices};
pub use transport::{MediaHandle, RtcTransportFactory, TransportConfig, TransportFactory};
