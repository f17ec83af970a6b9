pub mod negotiation_tests;

use parley_client::{ClientConfig, RelayLinkState, Room, RoomHandle, RoomServices};
use parley_core::{PeerId, RoomId, SignalEnvelope};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::Level;

use crate::utils::{
    MockAudioBackend, MockConnector, MockTransportFactory, RelayServerEnd, TestRoomObserver,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A joined room wired to mocks, with the relay side already past `join`.
pub struct TestRoom {
    pub handle: RoomHandle,
    pub relay: RelayServerEnd,
    pub accepted: mpsc::UnboundedReceiver<RelayServerEnd>,
    pub connector: Arc<MockConnector>,
    pub transports: MockTransportFactory,
    pub audio: Arc<MockAudioBackend>,
    pub observer: TestRoomObserver,
}

pub async fn join_test_room(self_id: &str, room: &str) -> TestRoom {
    let (connector, mut accepted) = MockConnector::new();
    let transports = MockTransportFactory::new();
    let audio = MockAudioBackend::new();
    let observer = TestRoomObserver::new();

    let services = RoomServices {
        connector: connector.clone(),
        transports: Arc::new(transports.clone()),
        audio: audio.clone(),
        observer: Arc::new(observer.clone()),
    };

    let handle = Room::join(
        PeerId::from(self_id),
        RoomId::parse(room).unwrap(),
        ClientConfig::default(),
        services,
    )
    .await
    .expect("join failed");

    let mut relay = accepted.recv().await.expect("room never connected");
    let join = relay.next_envelope().await;
    assert_eq!(join.kind(), "join");
    assert!(
        wait_for_status(&observer, RelayLinkState::Open).await,
        "relay link never opened"
    );

    TestRoom {
        handle,
        relay,
        accepted,
        connector,
        transports,
        audio,
        observer,
    }
}

pub fn peers(ids: &[&str]) -> SignalEnvelope {
    SignalEnvelope::Peers {
        peers: ids.iter().map(|id| PeerId::from(*id)).collect(),
    }
}

pub async fn wait_for_status(observer: &TestRoomObserver, status: RelayLinkState) -> bool {
    for _ in 0..200 {
        if observer.has_status(status).await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
