//! Round state and core game types
//!
//! Everything the front end needs to draw the current round lives here.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::mode::{FruitType, GameMode, Task};
use crate::clamp_difficulty;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Phase {
    /// Picking fruit off the tree
    #[default]
    Collecting,
    /// Choosing the answer on the number buttons
    Selecting,
    /// Correct answer given, waiting for the next round
    Success,
    /// Two or more wrong answers; correct option is highlighted
    Hint,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Collecting => "collecting",
            Phase::Selecting => "selecting",
            Phase::Success => "success",
            Phase::Hint => "hint",
        }
    }

    /// Whether an answer can be submitted in this phase
    pub fn accepts_answers(&self) -> bool {
        matches!(self, Phase::Selecting | Phase::Hint)
    }
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Separate stream derived from the same seed (so orchard layout
    /// and answer options don't consume each other's numbers)
    pub fn with_stream(seed: u64, stream: u64) -> Self {
        Self { seed, stream }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed ^ self.stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}

/// Complete state of one round (plus the streak that spans rounds)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    /// Current phase
    pub phase: Phase,
    /// Difficulty level; in counting mode also the fruits to collect
    pub items_required: u32,
    /// Fruits collected so far this round
    pub items_collected: u32,
    /// Wrong answers this round
    pub incorrect_attempts: u32,
    /// Consecutive correctly answered rounds
    pub correct_streak: u32,
    /// Answer buttons, filled on entering Selecting
    pub option_set: Vec<u32>,
    /// Level for the next round when a streak raised difficulty
    #[serde(default)]
    pub next_required: Option<u32>,
    #[serde(default)]
    pub mode: GameMode,
    /// Question for this round, rolled on entering Collecting
    #[serde(default)]
    pub task: Task,
    #[serde(default)]
    pub fruit: FruitType,
}

impl RoundState {
    /// Fresh state at the given level, collecting
    pub fn new(items_required: u32) -> Self {
        Self {
            phase: Phase::Collecting,
            items_required: clamp_difficulty(items_required),
            items_collected: 0,
            incorrect_attempts: 0,
            correct_streak: 0,
            option_set: Vec::new(),
            next_required: None,
            mode: GameMode::default(),
            task: Task::default(),
            fruit: FruitType::default(),
        }
    }

    /// Fruits to pick before the question is asked
    pub fn collection_target(&self) -> u32 {
        self.task.collection_target(self.items_required)
    }

    /// Fruits on the tree when the round starts
    pub fn first_group(&self) -> u32 {
        self.task.first_group(self.items_required)
    }

    /// The correct answer for this round
    pub fn correct_answer(&self) -> u32 {
        self.task.answer(self.items_required)
    }
}

impl Default for RoundState {
    fn default() -> Self {
        Self::new(crate::consts::MIN_DIFFICULTY)
    }
}
