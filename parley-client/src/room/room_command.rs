use crate::audio::AudioDevice;
use crate::room::Participant;
use tokio::sync::oneshot;

/// Requests from a [`RoomHandle`](crate::room::RoomHandle) to the room loop.
#[derive(Debug)]
pub enum RoomCommand {
    ToggleMute,

    ChangeDevice(String),

    Participants(oneshot::Sender<Vec<Participant>>),

    Devices(oneshot::Sender<Vec<AudioDevice>>),

    Leave,
}
