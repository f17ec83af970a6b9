mod presence_sync;
mod speech;

pub use presence_sync::*;
pub use speech::*;
