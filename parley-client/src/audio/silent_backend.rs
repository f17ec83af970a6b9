use crate::audio::{AudioBackend, AudioDevice, AudioError, LocalAudio};
use crate::transport::MediaHandle;
use async_trait::async_trait;
use dashmap::DashMap;
use parley_core::PeerId;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use webrtc::api::media_engine::MIME_TYPE_OPUS;
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

pub const DEFAULT_DEVICE_ID: &str = "default";

const FRAME_DURATION: Duration = Duration::from_millis(20);
const FREQUENCY_BIN_COUNT: usize = 256;
/// Opus TOC + payload for one 20 ms frame of silence.
const OPUS_SILENCE: [u8; 3] = [0xf8, 0xff, 0xfe];

/// Opus source that keeps the outgoing track alive with silence frames.
pub struct SilentAudio {
    device_id: String,
    track: Arc<TrackLocalStaticSample>,
    enabled: Arc<AtomicBool>,
    stopped: AtomicBool,
    writer: JoinHandle<()>,
}

impl SilentAudio {
    pub fn start(device_id: impl Into<String>) -> Self {
        let device_id = device_id.into();
        let track = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                ..Default::default()
            },
            "audio".to_owned(),
            "parley".to_owned(),
        ));
        let enabled = Arc::new(AtomicBool::new(true));

        let writer = tokio::spawn({
            let track = Arc::clone(&track);
            let enabled = Arc::clone(&enabled);
            async move {
                let mut ticker = tokio::time::interval(FRAME_DURATION);
                loop {
                    ticker.tick().await;
                    if !enabled.load(Ordering::Relaxed) {
                        continue;
                    }
                    let sample = Sample {
                        data: OPUS_SILENCE.to_vec().into(),
                        duration: FRAME_DURATION,
                        ..Default::default()
                    };
                    if let Err(e) = track.write_sample(&sample).await {
                        debug!("Silence frame not written: {}", e);
                    }
                }
            }
        });

        Self {
            device_id,
            track,
            enabled,
            stopped: AtomicBool::new(false),
            writer,
        }
    }
}

impl LocalAudio for SilentAudio {
    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn track(&self) -> Arc<TrackLocalStaticSample> {
        Arc::clone(&self.track)
    }

    fn frequency_data(&self) -> Option<Vec<u8>> {
        if self.stopped.load(Ordering::Relaxed) {
            return None;
        }
        Some(vec![0; FREQUENCY_BIN_COUNT])
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
        self.writer.abort();
    }
}

impl Drop for SilentAudio {
    fn drop(&mut self) {
        self.writer.abort();
    }
}

/// Audio backend without capture hardware: sends silence and drains remote
/// RTP so the receive side keeps flowing.
#[derive(Default)]
pub struct SilentAudioBackend {
    playback: DashMap<PeerId, JoinHandle<()>>,
}

impl SilentAudioBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn playing(&self) -> usize {
        self.playback.len()
    }
}

#[async_trait]
impl AudioBackend for SilentAudioBackend {
    async fn acquire(&self, device_id: Option<&str>) -> Result<Arc<dyn LocalAudio>, AudioError> {
        let device_id = device_id.unwrap_or(DEFAULT_DEVICE_ID);
        if device_id != DEFAULT_DEVICE_ID {
            return Err(AudioError::DeviceNotFound(device_id.to_owned()));
        }
        info!("Microphone access granted ({})", device_id);
        Ok(Arc::new(SilentAudio::start(device_id)))
    }

    async fn list_devices(&self) -> Vec<AudioDevice> {
        vec![AudioDevice {
            id: DEFAULT_DEVICE_ID.to_owned(),
            label: "Microphone 1".to_owned(),
        }]
    }

    fn attach_remote(&self, peer_id: &PeerId, media: &MediaHandle) {
        let Some(track) = media.remote_track().cloned() else {
            return;
        };
        let peer = peer_id.clone();
        let task = tokio::spawn(async move {
            let mut packets = 0u64;
            while track.read_rtp().await.is_ok() {
                packets += 1;
                if packets == 1 {
                    debug!("Audio flowing from {}", peer);
                }
            }
            debug!("Audio from {} ended after {} packets", peer, packets);
        });

        if let Some(previous) = self.playback.insert(peer_id.clone(), task) {
            previous.abort();
        }
    }

    fn detach_remote(&self, peer_id: &PeerId) {
        if let Some((_, task)) = self.playback.remove(peer_id) {
            task.abort();
        }
    }
}
