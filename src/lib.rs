//! blackout: phase progression and persisted player settings.
//!
//! The run is a fixed sequence of phases: power the generators, solve the
//! puzzle, collect the keys. [`ProgressTracker`] owns the single
//! [`GameData`] record, raises [`ProgressEvent`]s to registered listeners and
//! advances the phase when the current one is satisfied.
//!
//! The record is stored as JSON under the user data directory. The five
//! volume fields are mirrored from/to an [`AudioMixer`] on save/load.
//!
//! # Example
//! ```
//! use blackout::{ProgressTracker, Phase, SettingsFile};
//! let mut tracker = ProgressTracker::new(SettingsFile::new("settings.json"));
//! tracker.set_required_generators(2);
//! tracker.set_active_generators(2);
//! assert_eq!(tracker.current_phase(), Phase::Puzzle);
//! ```

pub mod audio;
pub mod config;
pub mod events;
pub mod hud;
pub mod io;
pub mod plugin;
pub mod settings;
pub mod tracker;
pub mod ui;

// Main exports
pub use audio::{AudioMixer, MemoryMixer, VolumeChannel};
pub use config::Config;
pub use events::{ListenerId, Listeners, ProgressEvent};
pub use io::{LoadOutcome, PersistError, SettingsFile};
pub use plugin::{Progress, ProgressNotice, ProgressPlugin};
pub use settings::{GameData, GamePreset, VolumeLevels};
pub use tracker::ProgressTracker;

/// Stage of the run.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Phase {
    Generators = 0,
    Puzzle = 1,
    Keys = 2,
    /// Terminal. Nothing left to complete.
    Complete = 3,
}

impl Phase {
    /// Map a stored phase index. Anything past `Keys` is treated as `Complete`.
    pub fn from_index(index: u32) -> Self {
        match index {
            0 => Phase::Generators,
            1 => Phase::Puzzle,
            2 => Phase::Keys,
            _ => Phase::Complete,
        }
    }

    #[inline]
    pub fn index(self) -> u32 {
        self as u32
    }

    /// Short label for the HUD.
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Generators => "Generators",
            Phase::Puzzle => "Puzzle",
            Phase::Keys => "Keys",
            Phase::Complete => "Complete",
        }
    }

    /// What the player has to do to leave this phase.
    pub fn objective(&self) -> &'static str {
        match self {
            Phase::Generators => "Restore power to the generators",
            Phase::Puzzle => "Solve the puzzle",
            Phase::Keys => "Find the keys",
            Phase::Complete => "Escape",
        }
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::Generators
    }
}
