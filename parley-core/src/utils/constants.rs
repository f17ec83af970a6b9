use std::time::Duration;

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun1.l.google.com:19302";

pub const DEFAULT_RELAY_URL: &str = "ws://127.0.0.1:8080";
pub const DEFAULT_ROOM_CODE: &str = "ABC123";
pub const ROOM_CODE_SEPARATOR: char = '-';

pub const RELAY_RECONNECT_DELAY: Duration = Duration::from_secs(3);
pub const ICE_RESTART_DEBOUNCE: Duration = Duration::from_secs(1);

/// Level above which the local participant counts as speaking.
pub const SPEAKING_THRESHOLD_DB: f32 = -45.0;
/// Roughly one display frame.
pub const PRESENCE_SAMPLE_INTERVAL: Duration = Duration::from_millis(16);
