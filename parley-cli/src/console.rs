use async_trait::async_trait;
use colored::*;
use parley_client::{AudioDevice, Notice, Participant, RelayLinkState, RoomObserver};

/// Renders room updates on stdout.
pub struct ConsoleObserver;

pub fn print_participants(participants: &[Participant]) {
    println!("{}", "Participants:".bold());
    for p in participants {
        let mut line = format!("  {}", p.display_name);
        if p.is_muted {
            line.push_str(&format!(" {}", "[muted]".red()));
        } else if p.is_speaking {
            line.push_str(&format!(" {}", "[speaking]".green()));
        }
        if p.media.is_some() {
            line.push_str(&format!(" {}", "(audio)".dimmed()));
        }
        println!("{line}");
    }
}

pub fn print_devices(devices: &[AudioDevice]) {
    println!("{}", "Microphones:".bold());
    for d in devices {
        println!("  {}  {}", d.id.cyan(), d.label);
    }
}

#[async_trait]
impl RoomObserver for ConsoleObserver {
    async fn on_participants(&self, participants: Vec<Participant>) {
        let speaking: Vec<&str> = participants
            .iter()
            .filter(|p| p.is_speaking)
            .map(|p| p.display_name.as_str())
            .collect();
        if !speaking.is_empty() {
            println!("{} {}", "🔊".green(), speaking.join(", "));
        }
    }

    async fn on_connection_status(&self, status: RelayLinkState) {
        let label = match status {
            RelayLinkState::Open => status.to_string().green(),
            RelayLinkState::Connecting => status.to_string().yellow(),
            RelayLinkState::Disconnected => status.to_string().red(),
        };
        println!("Relay: {}", label.bold());
    }

    async fn on_notice(&self, notice: Notice) {
        match notice {
            Notice::Toast(message) => println!("{}", message.cyan()),
            Notice::Error {
                title,
                message,
                retryable,
            } => {
                eprintln!("{} {}", title.red().bold(), message);
                if retryable {
                    eprintln!("{}", "Fix the problem and run parley again.".dimmed());
                }
            }
        }
    }

    async fn on_devices(&self, devices: Vec<AudioDevice>) {
        print_devices(&devices);
    }
}
