use clap::Parser;
use parley_client::{ClientConfig, TransportConfig};
use parley_core::utils::{DEFAULT_RELAY_URL, DEFAULT_ROOM_CODE};

#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(about = "Join a peer-to-peer voice room from the terminal")]
pub struct Args {
    /// Signaling relay address (ws://, wss://, http:// or https://)
    #[arg(long, default_value = DEFAULT_RELAY_URL)]
    pub relay: String,

    /// Room code, with or without the dash
    #[arg(long, default_value = DEFAULT_ROOM_CODE)]
    pub room: String,

    /// STUN/TURN server URL; repeat for several
    #[arg(long = "stun")]
    pub stun: Vec<String>,

    /// Log filter, e.g. `info` or `parley_client=debug`
    #[arg(long, default_value = "info")]
    pub log: String,
}

impl Args {
    pub fn client_config(&self) -> ClientConfig {
        let transport = if self.stun.is_empty() {
            TransportConfig::default()
        } else {
            TransportConfig {
                ice_servers: self.stun.clone(),
            }
        };

        ClientConfig {
            relay_url: self.relay.clone(),
            transport,
            ..Default::default()
        }
    }
}
