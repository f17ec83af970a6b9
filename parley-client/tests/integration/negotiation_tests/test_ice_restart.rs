use parley_client::transport::{NegotiationEvent, NegotiationEventKind};
use parley_client::ConnectionState;
use parley_core::{PeerId, Signal};
use std::time::Duration;

use super::test_registry;
use crate::integration::init_tracing;
use crate::utils::{MockSignalingOutput, MockTransportFactory, TransportCall};

#[tokio::test(start_paused = true)]
async fn test_failed_session_restarts_after_debounce() {
    init_tracing();

    let factory = MockTransportFactory::new();
    let (mut registry, mut events) = test_registry("zz1", &factory);
    let out = MockSignalingOutput::new();
    let peer = PeerId::from("aa2");

    registry.ensure_session(&peer, &out).await;
    registry
        .handle_signal(
            &peer,
            Signal::Answer {
                sdp: "v=0 answer".to_owned(),
            },
            &out,
        )
        .await;
    let tag = factory.created()[0].clone();

    for state in [ConnectionState::Connected, ConnectionState::Failed] {
        registry
            .handle_event(
                NegotiationEvent::new(tag.clone(), NegotiationEventKind::StateChanged(state)),
                &out,
            )
            .await;
    }
    assert_eq!(registry.get(&peer).unwrap().state(), ConnectionState::Failed);

    let started = tokio::time::Instant::now();
    let check = events.recv().await.unwrap();
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert!(matches!(check.kind, NegotiationEventKind::RestartCheck));
    out.clear();

    registry.handle_event(check, &out).await;

    assert_eq!(
        factory.calls_for(&tag).last(),
        Some(&TransportCall::CreateOffer { ice_restart: true })
    );
    assert!(matches!(out.signals_to(&peer)[..], [Signal::Offer { .. }]));
    assert_eq!(registry.get(&peer).unwrap().state(), ConnectionState::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_restart_offer_repeats_until_transport_recovers() {
    init_tracing();

    let factory = MockTransportFactory::new();
    let (mut registry, mut events) = test_registry("zz1", &factory);
    let out = MockSignalingOutput::new();
    let peer = PeerId::from("aa2");

    registry.ensure_session(&peer, &out).await;
    let tag = factory.created()[0].clone();
    for state in [ConnectionState::Connected, ConnectionState::Failed] {
        registry
            .handle_event(
                NegotiationEvent::new(tag.clone(), NegotiationEventKind::StateChanged(state)),
                &out,
            )
            .await;
    }

    // The first restart offer is lost; the transport stays failed.
    let check = events.recv().await.unwrap();
    registry.handle_event(check, &out).await;

    let started = tokio::time::Instant::now();
    let check = events.recv().await.unwrap();
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert!(matches!(check.kind, NegotiationEventKind::RestartCheck));
    registry.handle_event(check, &out).await;

    let restarts = || {
        factory
            .calls_for(&tag)
            .into_iter()
            .filter(|c| *c == TransportCall::CreateOffer { ice_restart: true })
            .count()
    };
    assert_eq!(restarts(), 2);

    registry
        .handle_event(
            NegotiationEvent::new(
                tag.clone(),
                NegotiationEventKind::StateChanged(ConnectionState::Connecting),
            ),
            &out,
        )
        .await;
    assert_eq!(
        registry.get(&peer).unwrap().state(),
        ConnectionState::Connecting
    );

    let check = events.recv().await.unwrap();
    registry.handle_event(check, &out).await;
    assert_eq!(restarts(), 2);
    assert!(
        tokio::time::timeout(Duration::from_secs(10), events.recv())
            .await
            .is_err()
    );
}

#[tokio::test(start_paused = true)]
async fn test_repeated_failures_share_one_restart_check() {
    init_tracing();

    let factory = MockTransportFactory::new();
    let (mut registry, mut events) = test_registry("zz1", &factory);
    let out = MockSignalingOutput::new();
    let peer = PeerId::from("aa2");

    registry.ensure_session(&peer, &out).await;
    let tag = factory.created()[0].clone();
    for state in [
        ConnectionState::Connected,
        ConnectionState::Disconnected,
        ConnectionState::Failed,
    ] {
        registry
            .handle_event(
                NegotiationEvent::new(tag.clone(), NegotiationEventKind::StateChanged(state)),
                &out,
            )
            .await;
    }

    let check = events.recv().await.unwrap();
    registry.handle_event(check, &out).await;
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(events.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_recovered_session_is_not_restarted() {
    init_tracing();

    let factory = MockTransportFactory::new();
    let (mut registry, mut events) = test_registry("zz1", &factory);
    let out = MockSignalingOutput::new();
    let peer = PeerId::from("aa2");

    registry.ensure_session(&peer, &out).await;
    let tag = factory.created()[0].clone();

    for state in [
        ConnectionState::Connected,
        ConnectionState::Disconnected,
        ConnectionState::Connected,
    ] {
        registry
            .handle_event(
                NegotiationEvent::new(tag.clone(), NegotiationEventKind::StateChanged(state)),
                &out,
            )
            .await;
    }
    assert_eq!(
        registry.get(&peer).unwrap().state(),
        ConnectionState::Connected
    );

    let check = events.recv().await.unwrap();
    registry.handle_event(check, &out).await;

    let restarts = factory
        .calls_for(&tag)
        .into_iter()
        .filter(|c| *c == TransportCall::CreateOffer { ice_restart: true })
        .count();
    assert_eq!(restarts, 0);
}

#[tokio::test(start_paused = true)]
async fn test_responder_waits_for_restart_offer() {
    init_tracing();

    let factory = MockTransportFactory::new();
    let (mut registry, mut events) = test_registry("aa1", &factory);
    let out = MockSignalingOutput::new();
    let peer = PeerId::from("zz9");

    registry
        .handle_signal(
            &peer,
            Signal::Offer {
                sdp: "v=0 offer".to_owned(),
            },
            &out,
        )
        .await;
    let tag = factory.created()[0].clone();
    registry
        .handle_event(
            NegotiationEvent::new(
                tag.clone(),
                NegotiationEventKind::StateChanged(ConnectionState::Failed),
            ),
            &out,
        )
        .await;
    out.clear();

    let check = events.recv().await.unwrap();
    registry.handle_event(check, &out).await;

    assert!(out.sent().is_empty());
    assert!(
        !factory
            .calls_for(&tag)
            .iter()
            .any(|c| matches!(c, TransportCall::CreateOffer { .. }))
    );
    assert_eq!(registry.get(&peer).unwrap().state(), ConnectionState::Failed);
    assert!(
        tokio::time::timeout(Duration::from_secs(10), events.recv())
            .await
            .is_err()
    );

    registry
        .handle_signal(
            &peer,
            Signal::Offer {
                sdp: "v=0 restart".to_owned(),
            },
            &out,
        )
        .await;
    assert!(matches!(out.signals_to(&peer)[..], [Signal::Answer { .. }]));
    assert_eq!(
        registry.get(&peer).unwrap().state(),
        ConnectionState::Connecting
    );
}
