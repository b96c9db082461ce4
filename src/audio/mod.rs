//! Mixer collaborator: five volume channels addressed by index.

pub mod kira_manager;

pub use kira_manager::{open_mixer, KiraMixer, MixerError};

/// Mixer channels, in the fixed positional order used by the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeChannel {
    Main = 0,
    Voice = 1,
    Sfx = 2,
    Creature = 3,
    Drone = 4,
}

impl VolumeChannel {
    pub const COUNT: usize = 5;

    pub const ALL: [VolumeChannel; Self::COUNT] = [
        VolumeChannel::Main,
        VolumeChannel::Voice,
        VolumeChannel::Sfx,
        VolumeChannel::Creature,
        VolumeChannel::Drone,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            VolumeChannel::Main => "Main",
            VolumeChannel::Voice => "Voice",
            VolumeChannel::Sfx => "SFX",
            VolumeChannel::Creature => "Creature",
            VolumeChannel::Drone => "Drone",
        }
    }
}

/// Quietest level written to the settings file. A muted channel (`-inf` dB)
/// is stored as this.
pub const MIN_VOLUME_DB: f32 = -80.0;
/// Loudest level written to the settings file.
pub const MAX_VOLUME_DB: f32 = 24.0;

/// Map a mixer level to a finite decibel value JSON can hold.
pub fn storable_db(db: f32) -> f32 {
    if db.is_nan() {
        MIN_VOLUME_DB
    } else {
        db.clamp(MIN_VOLUME_DB, MAX_VOLUME_DB)
    }
}

/// Anything that can report and apply per-channel volume in decibels.
pub trait AudioMixer {
    fn channel_volume(&self, channel: VolumeChannel) -> f32;
    fn set_channel_volume(&mut self, channel: VolumeChannel, db: f32);
}

/// Mixer that only remembers levels. Used headless and when no output
/// device is available.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryMixer {
    levels: [f32; VolumeChannel::COUNT],
}

impl MemoryMixer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_levels(levels: [f32; VolumeChannel::COUNT]) -> Self {
        Self { levels }
    }

    pub fn levels(&self) -> [f32; VolumeChannel::COUNT] {
        self.levels
    }
}

impl AudioMixer for MemoryMixer {
    fn channel_volume(&self, channel: VolumeChannel) -> f32 {
        self.levels[channel.index()]
    }

    fn set_channel_volume(&mut self, channel: VolumeChannel, db: f32) {
        self.levels[channel.index()] = db;
    }
}

impl<M: AudioMixer + ?Sized> AudioMixer for Box<M> {
    fn channel_volume(&self, channel: VolumeChannel) -> f32 {
        (**self).channel_volume(channel)
    }

    fn set_channel_volume(&mut self, channel: VolumeChannel, db: f32) {
        (**self).set_channel_volume(channel, db)
    }
}
