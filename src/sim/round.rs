//! Round controller
//!
//! Owns the `RoundState` and applies every transition:
//! Collecting -> Selecting -> (Success | Hint) -> Collecting.
//! The same machine runs every `GameMode`; only the task rolled on
//! entering Collecting differs.
//!
//! Calls made in the wrong phase are ignored, and answers that are not on
//! the buttons simply count as wrong. Nothing here fails.

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::mode::{FruitType, GameMode, Task};
use super::options::generate_options;
use super::state::{Phase, RngState, RoundState};
use crate::clamp_difficulty;
use crate::consts::*;

/// Result of submitting an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub new_phase: Phase,
}

/// Something that happened to the round, for collaborators to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEvent {
    PhaseChanged { from: Phase, to: Phase },
    CollectionProgress { collected: u32, required: u32 },
    AnswerChecked { choice: u32, correct: bool },
    DifficultyIncreased { level: u32 },
    /// Addition only: the first group is in, `count` more to pick
    SecondGroupStarted { count: u32 },
    ModeSelected { mode: GameMode },
}

impl RoundEvent {
    /// Route this event to the matching observer callback
    pub fn dispatch(&self, observer: &mut dyn RoundObserver, state: &RoundState) {
        match *self {
            RoundEvent::PhaseChanged { from, to } => observer.on_phase_change(from, to, state),
            RoundEvent::CollectionProgress {
                collected,
                required,
            } => observer.on_collection(collected, required),
            RoundEvent::AnswerChecked { choice, correct } => {
                observer.on_answer(choice, correct, state)
            }
            RoundEvent::DifficultyIncreased { level } => observer.on_difficulty_increased(level),
            RoundEvent::SecondGroupStarted { count } => observer.on_second_group(count, state),
            RoundEvent::ModeSelected { mode } => observer.on_mode_selected(mode),
        }
    }
}

/// Typed callbacks for round events. Implement only what you need.
pub trait RoundObserver {
    fn on_phase_change(&mut self, _from: Phase, _to: Phase, _state: &RoundState) {}
    fn on_collection(&mut self, _collected: u32, _required: u32) {}
    fn on_answer(&mut self, _choice: u32, _correct: bool, _state: &RoundState) {}
    fn on_difficulty_increased(&mut self, _level: u32) {}
    fn on_second_group(&mut self, _count: u32, _state: &RoundState) {}
    fn on_mode_selected(&mut self, _mode: GameMode) {}
}

/// Drives one session's rounds
#[derive(Debug, Clone)]
pub struct RoundController {
    state: RoundState,
    rng: Pcg32,
    /// Fruit for counting rounds; arithmetic rounds roll their own
    fruit: FruitType,
    events: Vec<RoundEvent>,
}

impl RoundController {
    /// Start at the easiest level
    pub fn new(seed: u64) -> Self {
        Self::with_difficulty(seed, MIN_DIFFICULTY)
    }

    /// Start at a chosen level (clamped to 1..=10)
    pub fn with_difficulty(seed: u64, level: u32) -> Self {
        Self {
            state: RoundState::new(level),
            rng: RngState::new(seed).to_rng(),
            fruit: FruitType::default(),
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn mode(&self) -> GameMode {
        self.state.mode
    }

    /// Take all events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    /// Begin a round at difficulty `required`, rolling its task
    pub fn start_round(&mut self, required: u32) -> &RoundState {
        let required = clamp_difficulty(required);
        self.state.items_required = required;
        self.state.items_collected = 0;
        self.state.incorrect_attempts = 0;
        self.state.option_set.clear();
        self.state.next_required = None;
        self.state.task = Task::generate(self.state.mode, required, &mut self.rng);
        self.state.fruit = match self.state.mode {
            GameMode::Counting => self.fruit,
            GameMode::Addition | GameMode::Subtraction => FruitType::random(&mut self.rng),
        };
        log::info!(
            "Round started: level {} {} {:?} ({})",
            required,
            self.state.mode.as_str(),
            self.state.task,
            self.state.fruit.as_str()
        );
        self.set_phase(Phase::Collecting);
        &self.state
    }

    /// Fruit used by counting rounds from the next round on
    pub fn set_fruit(&mut self, fruit: FruitType) {
        self.fruit = fruit;
    }

    /// Switch game mode and restart the round at the current level.
    /// The streak does not carry over into the new mode.
    pub fn select_mode(&mut self, mode: GameMode) -> &RoundState {
        self.state.mode = mode;
        self.state.correct_streak = 0;
        log::info!("Mode selected: {}", mode.as_str());
        self.events.push(RoundEvent::ModeSelected { mode });
        self.start_round(self.state.items_required)
    }

    /// Back to the easiest level with a clean streak, keeping the mode
    pub fn reset_game(&mut self) -> &RoundState {
        self.state.correct_streak = 0;
        log::info!("Game reset");
        self.start_round(MIN_DIFFICULTY)
    }

    /// One fruit picked. On the last one the round moves to Selecting.
    pub fn record_collection(&mut self) -> &RoundState {
        let target = self.state.collection_target();
        if self.state.phase != Phase::Collecting || self.state.items_collected >= target {
            log::debug!(
                "Ignoring collection in {} ({}/{})",
                self.state.phase.as_str(),
                self.state.items_collected,
                target
            );
            return &self.state;
        }

        self.state.items_collected += 1;
        self.events.push(RoundEvent::CollectionProgress {
            collected: self.state.items_collected,
            required: target,
        });

        if let Task::Add { first, second } = self.state.task {
            if self.state.items_collected == first {
                self.events
                    .push(RoundEvent::SecondGroupStarted { count: second });
            }
        }

        if self.state.items_collected == target {
            self.state.option_set = generate_options(self.state.correct_answer(), &mut self.rng);
            log::debug!("Options: {:?}", self.state.option_set);
            self.set_phase(Phase::Selecting);
        }

        &self.state
    }

    /// Check an answer. Accepted while Selecting or Hint.
    pub fn submit_answer(&mut self, choice: u32) -> AnswerOutcome {
        if !self.state.phase.accepts_answers() {
            log::debug!(
                "Ignoring answer {} in {}",
                choice,
                self.state.phase.as_str()
            );
            return AnswerOutcome {
                is_correct: false,
                new_phase: self.state.phase,
            };
        }

        let is_correct = choice == self.state.correct_answer();
        self.events.push(RoundEvent::AnswerChecked {
            choice,
            correct: is_correct,
        });

        if is_correct {
            self.state.correct_streak += 1;
            self.set_phase(Phase::Success);

            if self.state.correct_streak >= STREAK_FOR_LEVEL_UP
                && self.state.items_required < MAX_DIFFICULTY
            {
                let level = self.advance_difficulty();
                self.state.next_required = Some(level);
                self.state.correct_streak = 0;
                log::info!("Difficulty increased to {}", level);
                self.events.push(RoundEvent::DifficultyIncreased { level });
            }
        } else {
            self.state.incorrect_attempts += 1;
            self.state.correct_streak = 0;
            if self.state.incorrect_attempts >= HINT_AFTER_MISSES
                && self.state.phase != Phase::Hint
            {
                self.set_phase(Phase::Hint);
            }
        }

        AnswerOutcome {
            is_correct,
            new_phase: self.state.phase,
        }
    }

    /// Leave the hint and pick again. Wrong answers so far are kept,
    /// so the next miss goes straight back to Hint.
    pub fn retry(&mut self) -> &RoundState {
        if self.state.phase == Phase::Hint {
            self.set_phase(Phase::Selecting);
        }
        &self.state
    }

    /// Level the next round would use after a streak
    pub fn advance_difficulty(&self) -> u32 {
        (self.state.items_required + 1).min(MAX_DIFFICULTY)
    }

    /// Start the next round, at the raised level if a streak earned one
    pub fn reset_for_next_round(&mut self) -> &RoundState {
        let next = self
            .state
            .next_required
            .take()
            .unwrap_or(self.state.items_required);
        self.start_round(next)
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.state.phase;
        self.state.phase = to;
        self.events.push(RoundEvent::PhaseChanged { from, to });
    }
}
