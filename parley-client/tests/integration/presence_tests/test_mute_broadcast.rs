use parley_core::SignalEnvelope;
use std::sync::atomic::Ordering;

use crate::integration::{init_tracing, join_test_room, peers};

#[tokio::test]
async fn test_every_toggle_is_broadcast() {
    init_tracing();

    let mut room = join_test_room("zz1", "ABC-123").await;
    room.relay.push(&peers(&[]));

    let mut values = Vec::new();
    for _ in 0..3 {
        room.handle.toggle_mute().unwrap();
        let SignalEnvelope::Mute { value, .. } = room.relay.next_of_kind("mute").await else {
            unreachable!();
        };
        values.push(value);
        assert_eq!(room.audio.current().enabled.load(Ordering::SeqCst), !value);
    }
    assert_eq!(values, vec![true, false, true]);

    let me = room.handle.participants().await.unwrap();
    assert_eq!(me[0].display_name, "You");
    assert!(me[0].is_muted);

    room.handle.leave();
    room.handle.closed().await;
}
