use dialoguer::Confirm;
use std::io::BufRead;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    ToggleMute,
    Participants,
    Devices,
    ChangeDevice(String),
    Leave,
}

pub fn parse_line(line: &str) -> Option<KeyAction> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "m" => Some(KeyAction::ToggleMute),
        "p" => Some(KeyAction::Participants),
        "l" => Some(KeyAction::Devices),
        "d" => parts.next().map(|id| KeyAction::ChangeDevice(id.to_owned())),
        "q" => Some(KeyAction::Leave),
        _ => None,
    }
}

fn confirm_leave() -> bool {
    Confirm::new()
        .with_prompt("Leave this voice room?")
        .default(false)
        .interact()
        .unwrap_or(true)
}

/// Reads commands from stdin on a plain thread so a pending read never
/// holds up runtime shutdown.
pub fn spawn_reader() -> mpsc::Receiver<KeyAction> {
    let (tx, rx) = mpsc::channel(16);

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let Some(action) = parse_line(&line) else {
                continue;
            };
            if action == KeyAction::Leave && !confirm_leave() {
                continue;
            }
            let leaving = action == KeyAction::Leave;
            if tx.blocking_send(action).is_err() || leaving {
                break;
            }
        }
    });

    rx
}
