//! Apple Count - a counting game for young children
//!
//! Core modules:
//! - `sim`: Deterministic round logic (phases, game modes, answer options, difficulty, orchard layout)
//! - `session`: Session driver owning the round, timers and collaborators
//! - `speech`: Spoken prompts and sound cues derived from round events
//! - `settings`: Player-facing configuration
//! - `audio`: Web Audio / SpeechSynthesis playback (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod session;
pub mod settings;
pub mod sim;
pub mod speech;

pub use session::{Session, SessionInput};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed driver timestep (60 Hz is plenty for UI pacing)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Difficulty bounds (apples per round)
    pub const MIN_DIFFICULTY: u32 = 1;
    pub const MAX_DIFFICULTY: u32 = 10;
    /// Consecutive correct rounds needed to add one apple
    pub const STREAK_FOR_LEVEL_UP: u32 = 3;
    /// Wrong answers in a round before the hint is shown
    pub const HINT_AFTER_MISSES: u32 = 2;
    /// Number of answer buttons
    pub const OPTION_COUNT: usize = 4;

    /// Pause after the last apple before answers are accepted
    pub const REVEAL_DELAY_SECS: f32 = 1.0;
    /// Time the success screen stays up
    pub const SUCCESS_DWELL_SECS: f32 = 3.0;
    /// Extra time for the level-up announcement
    pub const LEVEL_UP_DWELL_SECS: f32 = 3.0;
    /// Time for a picked apple to reach the hedgehog
    pub const APPLE_FALL_SECS: f32 = 0.9;
}

/// Convert a duration in seconds to whole driver ticks (at least 1 for positive durations)
#[inline]
pub fn secs_to_ticks(secs: f32) -> u32 {
    if secs <= 0.0 {
        0
    } else {
        ((secs / consts::SIM_DT).round() as u32).max(1)
    }
}

/// Clamp a requested apple count to the playable range
#[inline]
pub fn clamp_difficulty(level: u32) -> u32 {
    level.clamp(consts::MIN_DIFFICULTY, consts::MAX_DIFFICULTY)
}
