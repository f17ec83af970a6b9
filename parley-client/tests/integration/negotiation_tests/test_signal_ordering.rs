use parley_core::{IceCandidate, PeerId, Signal};

use super::test_registry;
use crate::integration::init_tracing;
use crate::utils::{MockSignalingOutput, MockTransportFactory, TransportCall};

fn candidate(n: u16) -> IceCandidate {
    IceCandidate {
        candidate: format!("candidate:{n} 1 udp 2122260223 10.0.0.{n} 5000{n} typ host"),
        sdp_mid: Some("0".to_owned()),
        sdp_m_line_index: Some(0),
        username_fragment: None,
    }
}

#[tokio::test]
async fn test_duplicate_answer_is_ignored() {
    init_tracing();

    let factory = MockTransportFactory::new();
    let (mut registry, _events) = test_registry("zz1", &factory);
    let out = MockSignalingOutput::new();
    let peer = PeerId::from("aa2");

    registry.ensure_session(&peer, &out).await;
    for sdp in ["v=0 first", "v=0 second"] {
        registry
            .handle_signal(
                &peer,
                Signal::Answer {
                    sdp: sdp.to_owned(),
                },
                &out,
            )
            .await;
    }

    let tag = factory.created()[0].clone();
    assert_eq!(
        factory.calls_for(&tag),
        vec![
            TransportCall::CreateOffer { ice_restart: false },
            TransportCall::SetRemoteAnswer("v=0 first".to_owned()),
        ]
    );
}

#[tokio::test]
async fn test_candidates_wait_for_remote_description() {
    init_tracing();

    let factory = MockTransportFactory::new();
    let (mut registry, _events) = test_registry("aa1", &factory);
    let out = MockSignalingOutput::new();
    let peer = PeerId::from("zz9");

    registry.ensure_session(&peer, &out).await;
    assert!(out.sent().is_empty(), "responder must not offer");

    registry
        .handle_signal(&peer, Signal::Candidate { candidate: candidate(1) }, &out)
        .await;
    let tag = factory.created()[0].clone();
    assert!(factory.calls_for(&tag).is_empty());

    registry
        .handle_signal(
            &peer,
            Signal::Offer {
                sdp: "v=0 remote".to_owned(),
            },
            &out,
        )
        .await;
    registry
        .handle_signal(&peer, Signal::Candidate { candidate: candidate(2) }, &out)
        .await;

    assert_eq!(
        factory.calls_for(&tag),
        vec![
            TransportCall::SetRemoteOffer("v=0 remote".to_owned()),
            TransportCall::AddCandidate(candidate(1)),
            TransportCall::CreateAnswer,
            TransportCall::AddCandidate(candidate(2)),
        ]
    );
}

#[tokio::test]
async fn test_responder_answers_every_offer() {
    init_tracing();

    let factory = MockTransportFactory::new();
    let (mut registry, _events) = test_registry("aa1", &factory);
    let out = MockSignalingOutput::new();
    let peer = PeerId::from("zz9");

    for sdp in ["v=0 initial", "v=0 restart"] {
        registry
            .handle_signal(
                &peer,
                Signal::Offer {
                    sdp: sdp.to_owned(),
                },
                &out,
            )
            .await;
    }

    let answers = out
        .signals_to(&peer)
        .into_iter()
        .filter(|s| matches!(s, Signal::Answer { .. }))
        .count();
    assert_eq!(answers, 2);
    assert_eq!(factory.created().len(), 1);
}
