use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Please allow microphone access to use voice chat.")]
    PermissionDenied,

    #[error("Could not access microphone. Please check your audio settings. ({0})")]
    Unavailable(String),

    #[error("Audio device not found: {0}")]
    DeviceNotFound(String),
}
