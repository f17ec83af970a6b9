mod connection_state;
mod registry;
mod role;
mod session;

pub use connection_state::*;
pub use registry::*;
pub use role::*;
pub use session::*;
