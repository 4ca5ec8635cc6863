//! Game settings and preferences
//!
//! Read once at startup from JSON (a file on native, an inline
//! `<script id="game-settings">` element on the web). Never written back.

use serde::{Deserialize, Serialize};

use crate::clamp_difficulty;
use crate::consts::*;
use crate::sim::{FruitType, GameMode};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Start muted
    pub muted: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Speech volume (0.0 - 1.0)
    pub speech_volume: f32,
    /// Multiplier on every utterance's rate
    pub speech_rate: f32,

    // === Gameplay ===
    /// Mode played from launch
    pub mode: GameMode,
    /// Fruit on the tree in counting mode
    pub fruit: FruitType,
    /// Level of the first round
    pub starting_difficulty: u32,
    /// Pause after the last apple before the numbers appear
    pub reveal_delay_secs: f32,
    /// How long the success screen stays up
    pub success_dwell_secs: f32,
    /// Extra time for the level-up announcement
    pub level_up_dwell_secs: f32,

    // === Accessibility ===
    /// Hedgehog jumps straight to the apple instead of running
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            muted: false,
            master_volume: 0.8,
            sfx_volume: 1.0,
            speech_volume: 1.0,
            speech_rate: 1.0,

            mode: GameMode::Counting,
            fruit: FruitType::Apple,
            starting_difficulty: MIN_DIFFICULTY,
            reveal_delay_secs: REVEAL_DELAY_SECS,
            success_dwell_secs: SUCCESS_DWELL_SECS,
            level_up_dwell_secs: LEVEL_UP_DWELL_SECS,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Parse settings JSON. Missing fields take their defaults; values are
    /// clamped into range. Returns None if the JSON itself is malformed.
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str::<Settings>(json) {
            Ok(settings) => Some(settings.sanitized()),
            Err(e) => {
                log::warn!("Invalid settings JSON: {}", e);
                None
            }
        }
    }

    /// Same as `from_json`, falling back to defaults
    pub fn from_json_or_default(json: &str) -> Self {
        Self::from_json(json).unwrap_or_default()
    }

    /// Clamp every field into its valid range
    pub fn sanitized(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.speech_volume = self.speech_volume.clamp(0.0, 1.0);
        self.speech_rate = self.speech_rate.clamp(0.5, 2.0);
        self.starting_difficulty = clamp_difficulty(self.starting_difficulty);
        self.reveal_delay_secs = self.reveal_delay_secs.max(0.0);
        self.success_dwell_secs = self.success_dwell_secs.max(0.0);
        self.level_up_dwell_secs = self.level_up_dwell_secs.max(0.0);
        self
    }

    /// Effective sound effect volume
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Effective speech volume
    pub fn effective_speech_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.speech_volume
        }
    }

    /// Load settings from a JSON file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let settings = Self::from_json_or_default(&json);
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Could not read {}: {} - using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Element id holding inline settings JSON
    #[cfg(target_arch = "wasm32")]
    const ELEMENT_ID: &'static str = "game-settings";

    /// Load settings from the page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::ELEMENT_ID))
            .and_then(|el| el.text_content());

        match json {
            Some(json) => {
                log::info!("Loaded settings from page");
                Self::from_json_or_default(&json)
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }
}
