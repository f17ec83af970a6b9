mod connection_wrapper;
mod negotiation_transport;
mod transport_config;
mod transport_event;

pub use connection_wrapper::*;
pub use negotiation_transport::*;
pub use transport_config::*;
pub use transport_event::*;
