//! Phase progression over the persisted [`GameData`] record.
//!
//! Progress setters notify, store, then check whether the current phase is
//! satisfied. A satisfied phase advances exactly once per mutation; the new
//! phase is only checked on the next progress mutation.

use log::info;

use crate::audio::{storable_db, AudioMixer, VolumeChannel};
use crate::events::{ListenerId, Listeners, ProgressEvent};
use crate::io::{LoadOutcome, PersistError, SettingsFile};
use crate::settings::{GameData, GamePreset, VolumeLevels};
use crate::Phase;

/// Owner of the single [`GameData`] record.
///
/// Build one at startup and pass it by reference; nothing global tracks it.
#[derive(Debug)]
pub struct ProgressTracker {
    data: GameData,
    file: SettingsFile,
    fallback: GamePreset,
    listeners: Listeners,
}

impl ProgressTracker {
    pub fn new(file: SettingsFile) -> Self {
        Self::with_data(file, GameData::default())
    }

    pub fn with_data(file: SettingsFile, data: GameData) -> Self {
        Self {
            data,
            file,
            fallback: GamePreset::DEFAULT,
            listeners: Listeners::new(),
        }
    }

    /// Preset applied when the settings file is unreadable.
    pub fn with_fallback_preset(mut self, preset: GamePreset) -> Self {
        self.fallback = preset;
        self
    }

    pub fn data(&self) -> &GameData {
        &self.data
    }

    pub fn settings_file(&self) -> &SettingsFile {
        &self.file
    }

    pub fn fallback_preset(&self) -> GamePreset {
        self.fallback
    }

    // ---- listeners ----

    pub fn subscribe<F>(&mut self, handler: F) -> ListenerId
    where
        F: FnMut(&ProgressEvent) + Send + Sync + 'static,
    {
        self.listeners.subscribe(handler)
    }

    pub fn forward_to(&mut self, sender: crossbeam_channel::Sender<ProgressEvent>) -> ListenerId {
        self.listeners.forward_to(sender)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // ---- progress ----

    pub fn phase(&self) -> u32 {
        self.data.phase
    }

    pub fn current_phase(&self) -> Phase {
        Phase::from_index(self.data.phase)
    }

    /// Notifies even when `phase` equals the current value.
    pub fn set_phase(&mut self, phase: u32) {
        self.listeners.emit(ProgressEvent::PhaseChanged(phase));
        self.data.phase = phase;
    }

    pub fn active_generators(&self) -> u32 {
        self.data.active_generators
    }

    pub fn set_active_generators(&mut self, count: u32) {
        self.listeners.emit(ProgressEvent::ActiveGeneratorsChanged(count));
        self.data.active_generators = count;
        self.check_phase();
    }

    pub fn puzzle_solved(&self) -> bool {
        self.data.puzzle_solved
    }

    /// Notifies only when `solved` is true, once per call.
    pub fn set_puzzle_solved(&mut self, solved: bool) {
        if solved {
            self.listeners.emit(ProgressEvent::PuzzleSolved);
        }
        self.data.puzzle_solved = solved;
        self.check_phase();
    }

    pub fn found_keys(&self) -> u32 {
        self.data.found_keys
    }

    pub fn set_found_keys(&mut self, count: u32) {
        self.listeners.emit(ProgressEvent::FoundKeysChanged(count));
        self.data.found_keys = count;
        self.check_phase();
    }

    // ---- thresholds and layout ----

    pub fn required_generators(&self) -> u32 {
        self.data.required_generators
    }

    pub fn set_required_generators(&mut self, count: u32) {
        self.data.required_generators = count;
    }

    pub fn required_keys(&self) -> u32 {
        self.data.required_keys
    }

    pub fn set_required_keys(&mut self, count: u32) {
        self.data.required_keys = count;
    }

    pub fn aggression_level(&self) -> i32 {
        self.data.aggression_level
    }

    pub fn set_aggression_level(&mut self, level: i32) {
        self.data.aggression_level = level;
    }

    pub fn level_generators(&self) -> u32 {
        self.data.level_generators
    }

    /// Lowers `required_generators` if it no longer fits.
    pub fn set_level_generators(&mut self, count: u32) {
        self.data.level_generators = count;
        self.data.required_generators = self.data.required_generators.min(count);
    }

    pub fn level_chests(&self) -> u32 {
        self.data.level_chests
    }

    /// Lowers `required_keys` if it no longer fits.
    pub fn set_level_chests(&mut self, count: u32) {
        self.data.level_chests = count;
        self.data.required_keys = self.data.required_keys.min(count);
    }

    /// Apply a preset's thresholds and aggression, then re-clamp to the layout.
    pub fn apply_preset(&mut self, preset: &GamePreset) {
        self.data.apply_preset(preset);
        self.data.required_generators = self.data.required_generators.min(self.data.level_generators);
        self.data.required_keys = self.data.required_keys.min(self.data.level_chests);
    }

    /// Clear progress and return to the first phase. Thresholds, layout,
    /// aggression and volumes are kept. Raises no notifications.
    pub fn reset(&mut self) {
        self.data.active_generators = 0;
        self.data.puzzle_solved = false;
        self.data.found_keys = 0;
        self.data.phase = Phase::Generators.index();
    }

    fn check_phase(&mut self) {
        let complete = match self.current_phase() {
            Phase::Generators => self.data.active_generators >= self.data.required_generators,
            Phase::Puzzle => self.data.puzzle_solved,
            Phase::Keys => self.data.found_keys >= self.data.required_keys,
            Phase::Complete => false,
        };
        if complete {
            self.set_phase(self.data.phase + 1);
            info!("progressed to phase #{} ({})", self.data.phase, self.current_phase().name());
        }
    }

    // ---- persistence ----

    /// Pull the mixer's volumes into the record and write it out.
    ///
    /// Volumes are captured even if the write fails. Non-finite levels
    /// (a muted channel reports `-inf`) are stored as finite bounds.
    pub fn serialize(&mut self, mixer: &dyn AudioMixer) -> Result<(), PersistError> {
        let mut levels = VolumeLevels::default();
        for channel in VolumeChannel::ALL {
            levels.set(channel, storable_db(mixer.channel_volume(channel)));
        }
        self.data.set_volumes(levels);
        self.file.save(&self.data)
    }

    /// Replace the record from disk and push its volumes to the mixer.
    ///
    /// A missing file leaves everything untouched, including the mixer.
    /// An unusable file resets the record to defaults plus the fallback preset.
    pub fn deserialize(&mut self, mixer: &mut dyn AudioMixer) -> LoadOutcome {
        let outcome = match self.file.load() {
            Ok(None) => return LoadOutcome::Missing,
            Ok(Some(data)) => {
                self.data = data;
                LoadOutcome::Loaded
            }
            Err(err) => {
                self.data = GameData::from_preset(&self.fallback);
                LoadOutcome::Defaulted(err)
            }
        };

        let levels = self.data.volumes();
        for channel in VolumeChannel::ALL {
            mixer.set_channel_volume(channel, levels.get(channel));
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{MemoryMixer, MIN_VOLUME_DB};
    use crossbeam_channel::Receiver;

    fn tracker() -> (ProgressTracker, Receiver<ProgressEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut tracker = ProgressTracker::new(SettingsFile::new("unused.json"));
        tracker.forward_to(tx);
        (tracker, rx)
    }

    fn drain(rx: &Receiver<ProgressEvent>) -> Vec<ProgressEvent> {
        rx.try_iter().collect()
    }

    fn temp_tracker(dir: &tempfile::TempDir) -> ProgressTracker {
        ProgressTracker::new(SettingsFile::new(dir.path().join("settings.json")))
    }

    #[test]
    fn generators_advance_to_puzzle_once() {
        let (mut t, rx) = tracker();
        t.set_required_generators(3);

        t.set_active_generators(2);
        assert_eq!(t.current_phase(), Phase::Generators);
        assert_eq!(drain(&rx), vec![ProgressEvent::ActiveGeneratorsChanged(2)]);

        t.set_active_generators(3);
        assert_eq!(t.current_phase(), Phase::Puzzle);
        assert_eq!(
            drain(&rx),
            vec![ProgressEvent::ActiveGeneratorsChanged(3), ProgressEvent::PhaseChanged(1)]
        );
    }

    #[test]
    fn full_run_reaches_complete() {
        let (mut t, rx) = tracker();
        t.set_required_generators(1);
        t.set_required_keys(2);

        t.set_active_generators(1);
        t.set_puzzle_solved(true);
        t.set_found_keys(1);
        assert_eq!(t.current_phase(), Phase::Keys);
        t.set_found_keys(2);
        assert_eq!(t.current_phase(), Phase::Complete);

        let phases: Vec<_> = drain(&rx)
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::PhaseChanged(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(phases, vec![1, 2, 3]);

        // Terminal phase never advances.
        t.set_found_keys(10);
        assert_eq!(t.phase(), 3);
    }

    #[test]
    fn advance_does_not_cascade() {
        let (mut t, _rx) = tracker();
        t.set_required_generators(1);
        t.set_required_keys(0);
        t.set_puzzle_solved(true);
        assert_eq!(t.current_phase(), Phase::Generators);

        // Puzzle is already solved, but only one phase advances per mutation.
        t.set_active_generators(1);
        assert_eq!(t.current_phase(), Phase::Puzzle);
        t.set_active_generators(1);
        assert_eq!(t.current_phase(), Phase::Keys);
    }

    #[test]
    fn zero_requirement_advances_on_first_mutation() {
        let (mut t, _rx) = tracker();
        assert_eq!(t.required_generators(), 0);
        t.set_active_generators(0);
        assert_eq!(t.current_phase(), Phase::Puzzle);
    }

    #[test]
    fn puzzle_notification_only_when_true() {
        let (mut t, rx) = tracker();
        t.set_required_keys(1);
        t.set_phase(Phase::Puzzle.index());
        drain(&rx);

        t.set_puzzle_solved(false);
        assert!(drain(&rx).is_empty());
        assert_eq!(t.current_phase(), Phase::Puzzle);

        t.set_puzzle_solved(true);
        assert_eq!(drain(&rx), vec![ProgressEvent::PuzzleSolved, ProgressEvent::PhaseChanged(2)]);

        t.set_puzzle_solved(true);
        assert_eq!(drain(&rx), vec![ProgressEvent::PuzzleSolved]);
    }

    #[test]
    fn set_phase_always_notifies() {
        let (mut t, rx) = tracker();
        t.set_phase(0);
        t.set_phase(0);
        assert_eq!(drain(&rx), vec![ProgressEvent::PhaseChanged(0); 2]);
    }

    #[test]
    fn level_capacity_clamps_requirements() {
        let (mut t, rx) = tracker();
        t.set_required_generators(4);
        t.set_required_keys(3);

        t.set_level_generators(2);
        assert_eq!(t.required_generators(), 2);
        t.set_level_generators(6);
        assert_eq!(t.required_generators(), 2);

        t.set_level_chests(3);
        assert_eq!(t.required_keys(), 3);
        t.set_level_chests(1);
        assert_eq!(t.required_keys(), 1);
        assert_eq!(t.level_chests(), 1);

        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn preset_is_clamped_to_layout() {
        let (mut t, _rx) = tracker();
        t.set_level_generators(2);
        t.apply_preset(&GamePreset::HARD);
        assert_eq!(t.required_generators(), 2);
        assert_eq!(t.required_keys(), 3);
        assert_eq!(t.aggression_level(), 2);
    }

    #[test]
    fn reset_clears_progress_only() {
        let (mut t, rx) = tracker();
        t.set_required_generators(9);
        t.set_aggression_level(3);
        t.set_active_generators(4);
        t.set_found_keys(2);
        t.set_puzzle_solved(true);
        t.set_phase(3);
        let before = t.data().clone();
        drain(&rx);

        t.reset();
        let after = t.data();
        assert_eq!(after.active_generators, 0);
        assert_eq!(after.found_keys, 0);
        assert!(!after.puzzle_solved);
        assert_eq!(after.phase, Phase::Generators.index());
        assert_eq!(after.required_generators, before.required_generators);
        assert_eq!(after.aggression_level, before.aggression_level);
        assert_eq!(after.level_chests, before.level_chests);
        assert_eq!(after.volumes(), before.volumes());
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn round_trip_through_file_and_mixer() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = temp_tracker(&dir);
        t.set_required_generators(3);
        t.set_required_keys(2);
        t.set_level_chests(4);
        t.set_aggression_level(-1);
        t.set_active_generators(1);
        t.set_found_keys(1);

        let mixer = MemoryMixer::with_levels([-1.0, -2.5, -3.0, -40.0, 6.0]);
        t.serialize(&mixer).unwrap();
        let saved = t.data().clone();
        assert_eq!(saved.volume_creature, -40.0);

        let mut loaded = temp_tracker(&dir);
        let mut out = MemoryMixer::new();
        assert!(loaded.deserialize(&mut out).is_loaded());
        assert_eq!(loaded.data(), &saved);
        assert_eq!(out.levels(), mixer.levels());
    }

    #[test]
    fn round_trip_keeps_late_phase_and_solved_puzzle() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = temp_tracker(&dir);
        t.set_required_generators(1);
        t.set_required_keys(3);
        t.set_active_generators(1);
        t.set_puzzle_solved(true);
        t.set_found_keys(2);
        assert_eq!(t.current_phase(), Phase::Keys);

        t.serialize(&MemoryMixer::new()).unwrap();
        let saved = t.data().clone();
        assert_eq!(saved.phase, 2);
        assert!(saved.puzzle_solved);

        let mut loaded = temp_tracker(&dir);
        assert!(loaded.deserialize(&mut MemoryMixer::new()).is_loaded());
        assert_eq!(loaded.data(), &saved);
    }

    #[test]
    fn muted_channel_survives_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = temp_tracker(&dir);
        t.set_required_generators(4);
        t.set_required_keys(3);
        t.set_aggression_level(2);

        let mixer = MemoryMixer::with_levels([0.0, f32::NEG_INFINITY, -6.0, -6.0, -6.0]);
        t.serialize(&mixer).unwrap();
        let saved = t.data().clone();
        assert_eq!(saved.volume_voice, MIN_VOLUME_DB);

        let mut loaded = temp_tracker(&dir);
        let mut out = MemoryMixer::new();
        assert!(loaded.deserialize(&mut out).is_loaded());
        assert_eq!(loaded.data(), &saved);
        assert_eq!(out.channel_volume(VolumeChannel::Voice), MIN_VOLUME_DB);
    }

    #[test]
    fn missing_file_leaves_record_and_mixer_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = temp_tracker(&dir);
        t.set_required_keys(7);
        t.set_found_keys(2);
        let before = t.data().clone();

        let mut mixer = MemoryMixer::with_levels([-9.0; 5]);
        assert!(matches!(t.deserialize(&mut mixer), LoadOutcome::Missing));
        assert_eq!(t.data(), &before);
        assert_eq!(mixer.levels(), [-9.0; 5]);
    }

    #[test]
    fn corrupt_file_falls_back_to_preset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), "{\"phase\": 2,").unwrap();
        let mut t = temp_tracker(&dir).with_fallback_preset(GamePreset::EASY);
        t.set_found_keys(5);

        let mut mixer = MemoryMixer::with_levels([-9.0; 5]);
        let outcome = t.deserialize(&mut mixer);
        assert!(matches!(outcome, LoadOutcome::Defaulted(PersistError::Parse { .. })));
        assert_eq!(t.data(), &GameData::from_preset(&GamePreset::EASY));
        assert_eq!(mixer.levels(), [0.0; 5]);
    }

    #[test]
    fn corrupt_file_uses_default_preset_unless_configured() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), "not json").unwrap();
        let mut t = temp_tracker(&dir);
        assert_eq!(t.fallback_preset(), GamePreset::DEFAULT);

        let outcome = t.deserialize(&mut MemoryMixer::new());
        assert!(matches!(outcome, LoadOutcome::Defaulted(_)));
        assert_eq!(t.data(), &GameData::from_preset(&GamePreset::DEFAULT));
        assert_eq!(t.required_generators(), 3);
        assert_eq!(t.required_keys(), 2);
        assert_eq!(t.aggression_level(), 1);
    }

    #[test]
    fn serialize_error_still_captures_volumes() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the write fail.
        std::fs::create_dir(dir.path().join("settings.json")).unwrap();
        let mut t = temp_tracker(&dir);
        let mixer = MemoryMixer::with_levels([-3.0; 5]);
        assert!(matches!(t.serialize(&mixer), Err(PersistError::Io { .. })));
        assert_eq!(t.data().volume_sfx, -3.0);
    }
}
