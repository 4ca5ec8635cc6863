//! Deterministic round logic
//!
//! All game rules live here. This module must stay pure:
//! - Seeded RNG only
//! - No timers (the session driver owns pacing)
//! - No rendering, audio or platform dependencies

pub mod mode;
pub mod options;
pub mod orchard;
pub mod round;
pub mod state;

pub use mode::{FruitType, GameMode, Task};
pub use options::generate_options;
pub use orchard::{Apple, Hedgehog, Orchard, in_foliage};
pub use round::{AnswerOutcome, RoundController, RoundEvent, RoundObserver};
pub use state::{Phase, RngState, RoundState};
