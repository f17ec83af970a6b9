use parley_client::transport::{MediaHandle, NegotiationEvent, NegotiationEventKind};
use parley_core::{PeerId, RoomId, Signal, SignalEnvelope};

use crate::integration::{init_tracing, join_test_room, peers};

#[tokio::test]
async fn test_malformed_frames_are_skipped() {
    init_tracing();

    let mut room = join_test_room("zz1", "ABC-123").await;
    room.relay.push_raw("not json");
    room.relay.push_raw(r#"{"type":"dance","peerId":"aa2"}"#);
    room.relay.push_raw(r#"{"type":"new-peer"}"#);
    room.relay.push(&peers(&["aa2"]));

    let SignalEnvelope::Signal { to, signal, .. } = room.relay.next_of_kind("signal").await else {
        unreachable!();
    };
    assert_eq!(to, PeerId::from("aa2"));
    assert!(matches!(signal, Signal::Offer { .. }));

    room.handle.leave();
    room.handle.closed().await;
}

#[tokio::test]
async fn test_self_and_foreign_signals_are_ignored() {
    init_tracing();

    let room = join_test_room("zz1", "ABC-123").await;
    room.relay.push(&peers(&["zz1"]));
    room.relay.push(&SignalEnvelope::Signal {
        room_id: Some(RoomId::parse("ABC123").unwrap()),
        from: PeerId::from("bb9"),
        to: PeerId::from("cc3"),
        signal: Signal::Offer {
            sdp: "v=0".to_owned(),
        },
    });
    room.relay.push(&SignalEnvelope::NewPeer {
        peer_id: PeerId::from("dd4"),
    });

    let settled = room
        .observer
        .wait_for_participants(2000, |p| p.iter().any(|p| p.id.as_str() == "dd4"))
        .await;
    assert!(settled);

    let created: Vec<PeerId> = room
        .transports
        .created()
        .into_iter()
        .map(|t| t.peer_id)
        .collect();
    assert_eq!(created, vec![PeerId::from("dd4")]);

    room.handle.leave();
    room.handle.closed().await;
}

#[tokio::test]
async fn test_remote_media_attaches_and_detaches() {
    init_tracing();

    let room = join_test_room("zz1", "ABC-123").await;
    room.relay.push(&peers(&["aa2"]));

    let aa2 = PeerId::from("aa2");
    let mut session = None;
    for _ in 0..200 {
        session = room.transports.session(&aa2);
        if session.is_some() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    let (tag, events) = session.expect("no session for aa2");

    let media = MediaHandle::new("stream-aa2", "track-aa2");
    events
        .send(NegotiationEvent::new(
            tag,
            NegotiationEventKind::TrackReceived(media.clone()),
        ))
        .await
        .unwrap();

    let attached = room
        .observer
        .wait_for_participants(2000, |p| {
            p.iter()
                .any(|p| p.id == PeerId::from("aa2") && p.media.is_some())
        })
        .await;
    assert!(attached);
    assert_eq!(
        room.audio.attached.get(&aa2).map(|m| m.value().clone()),
        Some(media)
    );

    room.relay.push(&SignalEnvelope::PeerLeft {
        peer_id: aa2.clone(),
    });
    let gone = room
        .observer
        .wait_for_participants(2000, |p| p.len() == 1)
        .await;
    assert!(gone);
    assert!(room.audio.attached.get(&aa2).is_none());

    room.handle.leave();
    room.handle.closed().await;
}
