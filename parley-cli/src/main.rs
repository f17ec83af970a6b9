mod args;
mod console;
mod controls;
mod keys;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use colored::*;
use console::ConsoleObserver;
use parley_client::{Room, RoomServices};
use parley_core::{PeerId, RoomId};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&args.log).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let room_id = RoomId::parse(&args.room).context("Invalid room code")?;
    let self_id = PeerId::generate();
    let config = args.client_config();

    println!(
        "{} {} {}",
        "🎙 Joining room".green().bold(),
        room_id.display_code().bold(),
        format!("as {}", self_id.short()).dimmed()
    );

    let services = RoomServices::production(&config, Arc::new(ConsoleObserver));
    let room = Room::join(self_id, room_id, config, services).await?;

    println!(
        "{}",
        "m: mute  p: participants  l: devices  d <id>: switch device  q: leave".dimmed()
    );

    let mut actions = keys::spawn_reader();
    controls::drive(&room, &mut actions).await;

    room.leave();
    room.closed().await;
    println!("{}", "👋 Left the room".green());
    Ok(())
}
