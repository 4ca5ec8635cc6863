//! Game modes, fruit kinds and the per-round task
//!
//! Counting asks how many fruits were picked. The arithmetic modes pick
//! fruit for the first operand (and, for addition, the second) and then
//! ask for the sum or difference.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_DIFFICULTY;

/// Which kind of round is played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Counting,
    Addition,
    Subtraction,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Counting, GameMode::Addition, GameMode::Subtraction];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Counting => "counting",
            GameMode::Addition => "addition",
            GameMode::Subtraction => "subtraction",
        }
    }

    /// Parse the short names used by settings and the terminal front end
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "counting" | "count" => Some(GameMode::Counting),
            "addition" | "add" => Some(GameMode::Addition),
            "subtraction" | "sub" => Some(GameMode::Subtraction),
            _ => None,
        }
    }
}

/// What hangs on the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FruitType {
    #[default]
    Apple,
    Pear,
    Banana,
    Orange,
    Strawberry,
}

impl FruitType {
    pub const ALL: [FruitType; 5] = [
        FruitType::Apple,
        FruitType::Pear,
        FruitType::Banana,
        FruitType::Orange,
        FruitType::Strawberry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FruitType::Apple => "apple",
            FruitType::Pear => "pear",
            FruitType::Banana => "banana",
            FruitType::Orange => "orange",
            FruitType::Strawberry => "strawberry",
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// The question behind one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Task {
    /// Pick `items_required` fruits, then say how many
    #[default]
    Count,
    /// Pick `first`, then `second` more, then give the sum
    Add { first: u32, second: u32 },
    /// Pick `first`, then say what is left after taking `second` away
    Subtract { first: u32, second: u32 },
}

impl Task {
    /// Roll a task for `mode` at difficulty `level`.
    ///
    /// Sums stay within 10; differences are at least 1 so every answer
    /// fits on the number buttons.
    pub fn generate<R: Rng + ?Sized>(mode: GameMode, level: u32, rng: &mut R) -> Self {
        match mode {
            GameMode::Counting => Task::Count,
            GameMode::Addition => {
                let max_sum = (5 + level).min(MAX_DIFFICULTY);
                let first = rng.random_range(1..max_sum);
                let second = rng.random_range(1..=max_sum - first);
                Task::Add { first, second }
            }
            GameMode::Subtraction => {
                let max_first = (4 + level).min(MAX_DIFFICULTY);
                let first = rng.random_range(2..=max_first);
                let second = rng.random_range(1..first);
                Task::Subtract { first, second }
            }
        }
    }

    /// Fruits picked before the question, given the round's level
    pub fn collection_target(&self, level: u32) -> u32 {
        match *self {
            Task::Count => level,
            Task::Add { first, second } => first + second,
            Task::Subtract { first, .. } => first,
        }
    }

    /// Size of the first batch on the tree
    pub fn first_group(&self, level: u32) -> u32 {
        match *self {
            Task::Count => level,
            Task::Add { first, .. } | Task::Subtract { first, .. } => first,
        }
    }

    pub fn answer(&self, level: u32) -> u32 {
        match *self {
            Task::Count => level,
            Task::Add { first, second } => first + second,
            Task::Subtract { first, second } => first - second,
        }
    }
}
