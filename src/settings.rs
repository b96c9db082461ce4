use serde::{Deserialize, Serialize};

use crate::audio::VolumeChannel;
use crate::Phase;

/// Named bundle of thresholds used when no stored record can be loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GamePreset {
    pub name: &'static str,
    pub required_generators: u32,
    pub required_keys: u32,
    pub aggression_level: i32,
}

impl GamePreset {
    pub const EASY: GamePreset = GamePreset {
        name: "easy",
        required_generators: 2,
        required_keys: 1,
        aggression_level: 0,
    };

    pub const DEFAULT: GamePreset = GamePreset {
        name: "default",
        required_generators: 3,
        required_keys: 2,
        aggression_level: 1,
    };

    pub const HARD: GamePreset = GamePreset {
        name: "hard",
        required_generators: 4,
        required_keys: 3,
        aggression_level: 2,
    };

    pub const ALL: [GamePreset; 3] = [Self::EASY, Self::DEFAULT, Self::HARD];

    /// Case-insensitive lookup.
    pub fn by_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|p| p.name == name)
    }

    pub fn description(&self) -> &'static str {
        match self.name {
            "easy" => "Fewer generators and keys, passive creature",
            "hard" => "Every generator and chest counts, hunting creature",
            _ => "Standard run",
        }
    }
}

impl Default for GamePreset {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Volume of every mixer channel in decibels, in channel order.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct VolumeLevels(pub [f32; VolumeChannel::COUNT]);

impl VolumeLevels {
    #[inline]
    pub fn get(&self, channel: VolumeChannel) -> f32 {
        self.0[channel.index()]
    }

    #[inline]
    pub fn set(&mut self, channel: VolumeChannel, db: f32) {
        self.0[channel.index()] = db;
    }
}

/// The persisted record: progress, level layout and mixer volumes.
///
/// Field names are the on-disk JSON keys. Every field must be present
/// when loading; unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameData {
    pub phase: u32,
    pub active_generators: u32,
    pub puzzle_solved: bool,
    pub found_keys: u32,
    pub required_generators: u32,
    pub required_keys: u32,
    /// Generators placed in the current level.
    pub level_generators: u32,
    /// Chests (one key each) placed in the current level.
    pub level_chests: u32,
    pub aggression_level: i32,
    pub volume_main: f32,
    pub volume_voice: f32,
    pub volume_sfx: f32,
    pub volume_creature: f32,
    pub volume_drone: f32,
}

impl Default for GameData {
    fn default() -> Self {
        Self {
            phase: Phase::Generators.index(),
            active_generators: 0,
            puzzle_solved: false,
            found_keys: 0,
            required_generators: 0,
            required_keys: 0,
            level_generators: 5,
            level_chests: 5,
            aggression_level: 0,
            volume_main: 0.0,
            volume_voice: 0.0,
            volume_sfx: 0.0,
            volume_creature: 0.0,
            volume_drone: 0.0,
        }
    }
}

impl GameData {
    /// Fresh record overlaid with `preset`'s thresholds and aggression.
    pub fn from_preset(preset: &GamePreset) -> Self {
        let mut data = Self::default();
        data.apply_preset(preset);
        data
    }

    pub fn apply_preset(&mut self, preset: &GamePreset) {
        self.required_generators = preset.required_generators;
        self.required_keys = preset.required_keys;
        self.aggression_level = preset.aggression_level;
    }

    pub fn volumes(&self) -> VolumeLevels {
        VolumeLevels([
            self.volume_main,
            self.volume_voice,
            self.volume_sfx,
            self.volume_creature,
            self.volume_drone,
        ])
    }

    pub fn set_volumes(&mut self, levels: VolumeLevels) {
        let [main, voice, sfx, creature, drone] = levels.0;
        self.volume_main = main;
        self.volume_voice = voice;
        self.volume_sfx = sfx;
        self.volume_creature = creature;
        self.volume_drone = drone;
    }
}
