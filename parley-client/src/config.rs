use crate::transport::TransportConfig;
use parley_core::utils::{
    DEFAULT_RELAY_URL, ICE_RESTART_DEBOUNCE, PRESENCE_SAMPLE_INTERVAL, RELAY_RECONNECT_DELAY,
    SPEAKING_THRESHOLD_DB,
};
use std::time::Duration;

/// Tunables of one room session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub relay_url: String,
    pub transport: TransportConfig,
    /// Fixed pause between relay reconnect attempts.
    pub reconnect_delay: Duration,
    /// How long a failed connection may recover on its own before an ICE restart.
    pub restart_debounce: Duration,
    pub speaking_threshold_db: f32,
    pub sample_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: DEFAULT_RELAY_URL.to_owned(),
            transport: TransportConfig::default(),
            reconnect_delay: RELAY_RECONNECT_DELAY,
            restart_debounce: ICE_RESTART_DEBOUNCE,
            speaking_threshold_db: SPEAKING_THRESHOLD_DB,
            sample_interval: PRESENCE_SAMPLE_INTERVAL,
        }
    }
}
