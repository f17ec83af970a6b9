use crate::audio::AudioError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Microphone error: {0}")]
    Microphone(#[from] AudioError),

    #[error("Room is closed")]
    Closed,
}
