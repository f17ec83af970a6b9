pub mod test_ice_restart;
pub mod test_signal_ordering;

use parley_client::SessionRegistry;
use parley_client::transport::NegotiationEvent;
use parley_core::{PeerId, RoomId, RoomScope};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::utils::MockTransportFactory;

pub fn test_registry(
    self_id: &str,
    factory: &MockTransportFactory,
) -> (SessionRegistry, mpsc::Receiver<NegotiationEvent>) {
    let (tx, rx) = mpsc::channel(64);
    let scope = RoomScope::new(PeerId::from(self_id), RoomId::parse("ABC-123").unwrap());
    let registry = SessionRegistry::new(scope, Arc::new(factory.clone()), tx, Duration::from_secs(1));
    (registry, rx)
}
