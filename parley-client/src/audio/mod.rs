mod audio_backend;
mod audio_error;
mod silent_backend;

pub use audio_backend::*;
pub use audio_error::*;
pub use silent_backend::*;
