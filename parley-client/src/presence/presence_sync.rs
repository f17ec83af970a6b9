use crate::presence::{EdgeTrigger, SpeechDetector};
use crate::relay::SignalingOutput;
use crate::room::ParticipantDirectory;
use parley_core::{PeerId, RoomScope};
use tracing::debug;

/// Presence change reported by another participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceUpdate {
    Muted(bool),
    Speaking(bool),
}

/// Local mute/speaking state and its propagation to the room.
pub struct PresenceSync {
    scope: RoomScope,
    detector: SpeechDetector,
    muted: bool,
    speaking: EdgeTrigger,
}

impl PresenceSync {
    pub fn new(scope: RoomScope, detector: SpeechDetector) -> Self {
        Self {
            scope,
            detector,
            muted: false,
            speaking: EdgeTrigger::default(),
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.current()
    }

    /// Feeds one analysis frame. Returns `true` if the self entry changed.
    pub fn sample(
        &mut self,
        bins: &[u8],
        directory: &mut ParticipantDirectory,
        out: &dyn SignalingOutput,
    ) -> bool {
        let speaking = self.detector.is_speaking(bins, self.muted);
        self.observe_speaking(speaking, directory, out)
    }

    /// Broadcasts only on change.
    pub fn observe_speaking(
        &mut self,
        speaking: bool,
        directory: &mut ParticipantDirectory,
        out: &dyn SignalingOutput,
    ) -> bool {
        let Some(value) = self.speaking.update(speaking) else {
            return false;
        };
        directory.set_speaking(&self.scope.self_id, value);
        out.send(&self.scope.speaking(value));
        true
    }

    /// Flips mute and broadcasts it. Muting also ends any ongoing speech.
    pub fn toggle_mute(
        &mut self,
        directory: &mut ParticipantDirectory,
        out: &dyn SignalingOutput,
    ) -> bool {
        self.muted = !self.muted;
        directory.set_muted(&self.scope.self_id, self.muted);
        out.send(&self.scope.mute(self.muted));
        if self.muted {
            self.observe_speaking(false, directory, out);
        }
        self.muted
    }

    /// Analysis restarts from silence, e.g. when the source goes away.
    /// Ongoing speech is ended and broadcast like any other edge.
    pub fn reset_speaking(
        &mut self,
        directory: &mut ParticipantDirectory,
        out: &dyn SignalingOutput,
    ) -> bool {
        self.observe_speaking(false, directory, out)
    }

    /// Applies a remote update. Unknown peers and echoes of self are ignored.
    pub fn apply_remote(
        &self,
        peer_id: &PeerId,
        update: PresenceUpdate,
        directory: &mut ParticipantDirectory,
    ) -> bool {
        if *peer_id == self.scope.self_id {
            return false;
        }
        if !directory.contains(peer_id) {
            debug!("Presence for unknown peer {}: {:?}", peer_id, update);
            return false;
        }
        match update {
            PresenceUpdate::Muted(value) => directory.set_muted(peer_id, value),
            PresenceUpdate::Speaking(value) => directory.set_speaking(peer_id, value),
        }
    }
}
