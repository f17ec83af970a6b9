use parley_core::utils::{DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2};

/// ICE configuration for every peer connection of a room.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub ice_servers: Vec<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![DEFAULT_STUN_ADDR.to_owned(), DEFAULT_STUN_ADDR_2.to_owned()],
        }
    }
}
