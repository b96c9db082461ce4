use crate::settings::GameData;
use crate::Phase;

/// HUD display data, derived from the progress record.
#[derive(Debug, Clone, PartialEq)]
pub struct HudData {
    pub phase: Phase,
    pub active_generators: u32,
    pub required_generators: u32,
    pub puzzle_solved: bool,
    pub found_keys: u32,
    pub required_keys: u32,
}

impl Default for HudData {
    fn default() -> Self {
        Self::from_data(&GameData::default())
    }
}

impl HudData {
    pub fn from_data(data: &GameData) -> Self {
        Self {
            phase: Phase::from_index(data.phase),
            active_generators: data.active_generators,
            required_generators: data.required_generators,
            puzzle_solved: data.puzzle_solved,
            found_keys: data.found_keys,
            required_keys: data.required_keys,
        }
    }

    pub fn phase_line(&self) -> String {
        format!("Phase {}: {}", self.phase.index(), self.phase.objective())
    }

    pub fn generators_line(&self) -> String {
        format!("Generators: {}/{}", self.active_generators, self.required_generators)
    }

    pub fn puzzle_line(&self) -> String {
        if self.puzzle_solved {
            "Puzzle: solved".to_string()
        } else {
            "Puzzle: unsolved".to_string()
        }
    }

    pub fn keys_line(&self) -> String {
        format!("Keys: {}/{}", self.found_keys, self.required_keys)
    }
}
