use crate::audio::{AudioBackend, LocalAudio, SilentAudioBackend};
use crate::config::ClientConfig;
use crate::error::RoomError;
use crate::negotiation::SessionRegistry;
use crate::presence::{PresenceSync, PresenceUpdate, SpeechDetector};
use crate::relay::{RelayConnector, RelayLink, RelayLinkState, SignalingOutput, WsConnector};
use crate::room::{Notice, ParticipantDirectory, RoomCommand, RoomHandle, RoomObserver};
use crate::transport::{NegotiationEvent, RtcTransportFactory, TransportFactory};
use parley_core::{PeerId, RoomId, RoomScope, SignalEnvelope};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Collaborators a room is wired to.
#[derive(Clone)]
pub struct RoomServices {
    pub connector: Arc<dyn RelayConnector>,
    pub transports: Arc<dyn TransportFactory>,
    pub audio: Arc<dyn AudioBackend>,
    pub observer: Arc<dyn RoomObserver>,
}

impl RoomServices {
    /// WebSocket relay, webrtc-rs transports and the silent audio backend.
    pub fn production(config: &ClientConfig, observer: Arc<dyn RoomObserver>) -> Self {
        Self {
            connector: Arc::new(WsConnector::new(config.relay_url.clone())),
            transports: Arc::new(RtcTransportFactory::new(config.transport.clone())),
            audio: Arc::new(SilentAudioBackend::new()),
            observer,
        }
    }
}

/// Event loop of one joined room. Owns the directory, the session registry
/// and the local audio source; everything else talks to it through channels.
pub struct Room {
    scope: RoomScope,
    config: ClientConfig,
    directory: ParticipantDirectory,
    registry: SessionRegistry,
    presence: PresenceSync,
    relay: RelayLink,
    local_audio: Option<Arc<dyn LocalAudio>>,
    audio: Arc<dyn AudioBackend>,
    observer: Arc<dyn RoomObserver>,
    command_rx: mpsc::UnboundedReceiver<RoomCommand>,
    relay_rx: mpsc::UnboundedReceiver<String>,
    relay_state: watch::Receiver<RelayLinkState>,
    event_rx: mpsc::Receiver<NegotiationEvent>,
}

impl Room {
    pub async fn join(
        self_id: PeerId,
        room_id: RoomId,
        config: ClientConfig,
        services: RoomServices,
    ) -> Result<RoomHandle, RoomError> {
        let RoomServices {
            connector,
            transports,
            audio,
            observer,
        } = services;
        let scope = RoomScope::new(self_id.clone(), room_id);
        info!("Joining room {} as {}", scope.room_id.display_code(), self_id);

        let directory = ParticipantDirectory::new(self_id);

        let local_audio = match audio.acquire(None).await {
            Ok(source) => source,
            Err(e) => {
                error!("Error accessing microphone: {}", e);
                observer
                    .on_notice(Notice::Error {
                        title: "Microphone Error".to_owned(),
                        message: e.to_string(),
                        retryable: true,
                    })
                    .await;
                return Err(e.into());
            }
        };

        info!("Microphone ready ({})", local_audio.device_id());

        let (event_tx, event_rx) = mpsc::channel(256);
        let mut registry =
            SessionRegistry::new(scope.clone(), transports, event_tx, config.restart_debounce);
        registry.set_local_audio(Some(local_audio.track()));

        let presence = PresenceSync::new(
            scope.clone(),
            SpeechDetector::new(config.speaking_threshold_db),
        );

        let (relay, relay_rx) =
            RelayLink::connect(connector, scope.clone(), config.reconnect_delay);
        let relay_state = relay.subscribe();

        observer.on_devices(audio.list_devices().await).await;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = watch::channel(false);

        let room = Room {
            scope: scope.clone(),
            config,
            directory,
            registry,
            presence,
            relay,
            local_audio: Some(local_audio),
            audio,
            observer,
            command_rx,
            relay_rx,
            relay_state,
            event_rx,
        };
        tokio::spawn(room.run(done_tx));

        Ok(RoomHandle::new(scope, command_tx, done_rx))
    }

    async fn run(mut self, done: watch::Sender<bool>) {
        info!("Room {} event loop started", self.scope.room_id);
        self.publish_participants().await;

        let mut ticker = tokio::time::interval(self.config.sample_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut relay_alive = true;

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    if !self.handle_command(cmd).await {
                        break;
                    }
                }

                Some(frame) = self.relay_rx.recv() => self.handle_frame(&frame).await,

                changed = self.relay_state.changed(), if relay_alive => {
                    if changed.is_err() {
                        relay_alive = false;
                        continue;
                    }
                    let status = *self.relay_state.borrow_and_update();
                    self.observer.on_connection_status(status).await;
                }

                Some(event) = self.event_rx.recv() => self.handle_negotiation_event(event).await,

                _ = ticker.tick(), if self.local_audio.is_some() => self.sample_presence().await,
            }
        }

        self.shutdown().await;
        let _ = done.send(true);
        info!("Room {} event loop finished", self.scope.room_id);
    }

    /// Returns `false` once the room should shut down.
    async fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::ToggleMute => {
                let muted = self.presence.toggle_mute(&mut self.directory, &self.relay);
                if let Some(source) = &self.local_audio {
                    source.set_enabled(!muted);
                }
                info!("Microphone {}", if muted { "muted" } else { "unmuted" });
                self.publish_participants().await;
            }

            RoomCommand::ChangeDevice(device_id) => self.change_device(device_id).await,

            RoomCommand::Participants(reply) => {
                let _ = reply.send(self.directory.snapshot());
            }

            RoomCommand::Devices(reply) => {
                let _ = reply.send(self.audio.list_devices().await);
            }

            RoomCommand::Leave => return false,
        }
        true
    }

    async fn handle_frame(&mut self, frame: &str) {
        let envelope = match SignalEnvelope::decode(frame) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Dropping malformed relay frame: {}", e);
                return;
            }
        };

        match envelope {
            SignalEnvelope::Peers { peers } => {
                info!("Relay reports {} peer(s) in room", peers.len());
                for peer_id in peers {
                    self.add_peer(&peer_id).await;
                }
                self.publish_participants().await;
            }

            SignalEnvelope::NewPeer { peer_id } => {
                info!("Peer {} joined", peer_id);
                self.add_peer(&peer_id).await;
                self.publish_participants().await;
            }

            SignalEnvelope::Signal {
                from, to, signal, ..
            } => {
                if to != self.scope.self_id || from == self.scope.self_id {
                    debug!("Ignoring {} addressed to {}", signal.kind(), to);
                    return;
                }
                self.registry.handle_signal(&from, signal, &self.relay).await;
            }

            SignalEnvelope::PeerLeft { peer_id } => {
                info!("Peer {} left", peer_id);
                self.remove_peer(&peer_id).await;
            }

            SignalEnvelope::Mute { peer_id, value, .. } => {
                self.apply_presence(&peer_id, PresenceUpdate::Muted(value))
                    .await;
            }

            SignalEnvelope::Speaking { peer_id, value, .. } => {
                self.apply_presence(&peer_id, PresenceUpdate::Speaking(value))
                    .await;
            }

            other @ (SignalEnvelope::Join { .. } | SignalEnvelope::Leave { .. }) => {
                debug!("Ignoring {} from relay", other.kind());
            }
        }
    }

    async fn add_peer(&mut self, peer_id: &PeerId) {
        if *peer_id == self.scope.self_id {
            return;
        }
        self.directory.ensure_remote(peer_id);
        self.registry.ensure_session(peer_id, &self.relay).await;
    }

    async fn remove_peer(&mut self, peer_id: &PeerId) {
        if self.registry.remove(peer_id, &mut self.directory).await {
            self.audio.detach_remote(peer_id);
            self.publish_participants().await;
        }
    }

    async fn apply_presence(&mut self, peer_id: &PeerId, update: PresenceUpdate) {
        if self
            .presence
            .apply_remote(peer_id, update, &mut self.directory)
        {
            self.publish_participants().await;
        }
    }

    async fn handle_negotiation_event(&mut self, event: NegotiationEvent) {
        let Some((peer_id, media)) = self.registry.handle_event(event, &self.relay).await else {
            return;
        };
        self.audio.attach_remote(&peer_id, &media);
        self.directory.attach_media(&peer_id, media);
        self.publish_participants().await;
    }

    async fn sample_presence(&mut self) {
        let Some(bins) = self.local_audio.as_ref().and_then(|s| s.frequency_data()) else {
            return;
        };
        if self
            .presence
            .sample(&bins, &mut self.directory, &self.relay)
        {
            self.publish_participants().await;
        }
    }

    async fn change_device(&mut self, device_id: String) {
        if let Some(old) = self.local_audio.take() {
            old.stop();
        }
        let silenced = self
            .presence
            .reset_speaking(&mut self.directory, &self.relay);

        match self.audio.acquire(Some(&device_id)).await {
            Ok(source) => {
                source.set_enabled(!self.presence.is_muted());
                self.registry.replace_audio_track(source.track()).await;
                self.local_audio = Some(source);
                info!("Microphone changed to {}", device_id);
                self.observer
                    .on_notice(Notice::Toast("Microphone changed".to_owned()))
                    .await;
                self.publish_participants().await;
            }
            Err(e) => {
                warn!("Error changing audio device: {}", e);
                self.registry.set_local_audio(None);
                if silenced {
                    self.publish_participants().await;
                }
                self.observer
                    .on_notice(Notice::Toast("Failed to change microphone".to_owned()))
                    .await;
            }
        }
    }

    async fn shutdown(&mut self) {
        info!("Leaving room {}", self.scope.room_id);

        self.relay.send(&self.scope.leave());
        self.relay.shutdown().await;

        for peer_id in self.registry.peers() {
            self.audio.detach_remote(&peer_id);
        }
        self.registry.remove_all(&mut self.directory).await;

        if let Some(source) = self.local_audio.take() {
            source.stop();
        }
        self.directory.clear();

        self.observer
            .on_connection_status(RelayLinkState::Disconnected)
            .await;
        self.publish_participants().await;
    }

    async fn publish_participants(&self) {
        self.observer
            .on_participants(self.directory.snapshot())
            .await;
    }
}
