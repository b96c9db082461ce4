use kira::manager::{backend::DefaultBackend, AudioManager, AudioManagerSettings};
use kira::track::{TrackBuilder, TrackHandle};
use kira::tween::Tween;
use kira::Volume;
use log::{info, warn};

use super::{AudioMixer, MemoryMixer, VolumeChannel};

#[derive(Debug, thiserror::Error)]
pub enum MixerError {
    #[error("audio backend unavailable: {0}")]
    Backend(String),
    #[error("could not create {channel} track: {reason}")]
    Track { channel: &'static str, reason: String },
}

/// Kira `AudioManager` with one sub-track per volume channel.
///
/// Kira track handles are write-only, so the last level applied to each
/// track is cached and reported back by [`AudioMixer::channel_volume`].
pub struct KiraMixer {
    // Owns the output stream; the track handles are dead without it.
    _manager: AudioManager,
    tracks: Vec<TrackHandle>,
    levels: [f32; VolumeChannel::COUNT],
}

impl KiraMixer {
    pub fn new() -> Result<Self, MixerError> {
        let mut manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| MixerError::Backend(e.to_string()))?;

        let mut tracks = Vec::with_capacity(VolumeChannel::COUNT);
        for channel in VolumeChannel::ALL {
            let track = manager
                .add_sub_track(TrackBuilder::new())
                .map_err(|e| MixerError::Track { channel: channel.name(), reason: e.to_string() })?;
            tracks.push(track);
        }

        Ok(Self {
            _manager: manager,
            tracks,
            levels: [0.0; VolumeChannel::COUNT],
        })
    }
}

impl AudioMixer for KiraMixer {
    fn channel_volume(&self, channel: VolumeChannel) -> f32 {
        self.levels[channel.index()]
    }

    fn set_channel_volume(&mut self, channel: VolumeChannel, db: f32) {
        let track = &mut self.tracks[channel.index()];
        match track.set_volume(Volume::Decibels(db as f64), Tween::default()) {
            Ok(()) => self.levels[channel.index()] = db,
            Err(err) => warn!("{} volume not applied: {err}", channel.name()),
        }
    }
}

/// Open the kira backend, or fall back to a [`MemoryMixer`] so settings
/// still round-trip on machines without an output device.
pub fn open_mixer() -> Box<dyn AudioMixer> {
    match KiraMixer::new() {
        Ok(mixer) => {
            info!("kira audio engine initialised");
            Box::new(mixer)
        }
        Err(err) => {
            warn!("{err}; volumes will not be audible");
            Box::new(MemoryMixer::new())
        }
    }
}
