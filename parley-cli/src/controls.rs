use crate::console::{print_devices, print_participants};
use crate::keys::KeyAction;
use parley_client::{RoomError, RoomHandle};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Runs one key action. Returns `false` when the user asked to leave.
pub async fn dispatch(room: &RoomHandle, action: KeyAction) -> Result<bool, RoomError> {
    match action {
        KeyAction::ToggleMute => room.toggle_mute()?,
        KeyAction::Participants => print_participants(&room.participants().await?),
        KeyAction::Devices => print_devices(&room.devices().await?),
        KeyAction::ChangeDevice(id) => room.change_device(id)?,
        KeyAction::Leave => return Ok(false),
    }
    Ok(true)
}

/// Feeds key actions to the room until the user leaves, Ctrl-C is pressed
/// or the room goes away on its own.
pub async fn drive(room: &RoomHandle, actions: &mut mpsc::Receiver<KeyAction>) {
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            _ = room.closed() => break,
            Some(action) = actions.recv() => match dispatch(room, action).await {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    warn!("Room command failed: {}", e);
                    break;
                }
            },
        }
    }
}
