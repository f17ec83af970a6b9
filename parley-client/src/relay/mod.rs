mod relay_connector;
mod relay_link;
mod relay_state;
mod signaling_output;
mod ws_connector;

pub use relay_connector::*;
pub use relay_link::*;
pub use relay_state::*;
pub use signaling_output::*;
pub use ws_connector::*;
