//! Session driver
//!
//! Owns the round controller, the tree, the narrator and every timer.
//! Front ends feed it a `SessionInput` per fixed tick and read back state;
//! all pacing ("wait a second before showing the numbers", "keep the
//! success screen up for three seconds") happens here as tick countdowns.

use glam::Vec2;
use rand_pcg::Pcg32;

use crate::secs_to_ticks;
use crate::settings::Settings;
use crate::sim::orchard::{GROUND_Y, HEDGEHOG_CATCH_OFFSET};
use crate::sim::{
    GameMode, Hedgehog, Orchard, Phase, RngState, RoundController, RoundEvent, RoundObserver,
    RoundState,
};
use crate::speech::{Cue, Narrator, SoundEffect};

/// RNG stream used for tree layout (stream 0 belongs to the controller)
const ORCHARD_STREAM: u64 = 1;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct SessionInput {
    /// Apple clicked on the tree
    pub pick: Option<u32>,
    /// Number button clicked
    pub answer: Option<u32>,
    /// Leave the hint and choose again
    pub retry: bool,
    /// Mute toggle
    pub toggle_mute: bool,
    /// Switch to another game mode
    pub select_mode: Option<GameMode>,
    /// Start over from the first level
    pub restart: bool,
}

/// A fruit on its way down to the hedgehog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallingApple {
    pub id: u32,
    /// Where it hung on the tree
    pub from: Vec2,
    pub ticks_left: u32,
    pub total_ticks: u32,
}

impl FallingApple {
    /// Current position, dropping straight down to the ground line
    pub fn position(&self) -> Vec2 {
        let ground = Vec2::new(self.from.x, GROUND_Y);
        if self.ticks_left == 0 || self.total_ticks == 0 {
            return ground;
        }
        let t = 1.0 - self.ticks_left as f32 / self.total_ticks as f32;
        self.from.lerp(ground, t * t)
    }
}

/// Driver pacing, in ticks
#[derive(Debug, Clone, Copy)]
struct Dwell {
    reveal: u32,
    success: u32,
    level_up: u32,
    fall: u32,
}

impl Dwell {
    fn from_settings(settings: &Settings) -> Self {
        Self {
            reveal: secs_to_ticks(settings.reveal_delay_secs),
            success: secs_to_ticks(settings.success_dwell_secs),
            level_up: secs_to_ticks(settings.level_up_dwell_secs),
            fall: secs_to_ticks(crate::consts::APPLE_FALL_SECS),
        }
    }
}

/// One player's game, from launch until the page closes
pub struct Session {
    controller: RoundController,
    orchard: Orchard,
    hedgehog: Hedgehog,
    falling: Vec<FallingApple>,
    narrator: Narrator,
    observers: Vec<Box<dyn RoundObserver>>,
    layout_rng: Pcg32,
    dwell: Dwell,
    reduced_motion: bool,
    /// Ticks before answers are accepted
    reveal_ticks: u32,
    /// Ticks before the next round starts (Success only)
    next_round_ticks: u32,
}

impl Session {
    pub fn new(seed: u64, settings: &Settings) -> Self {
        let mut controller = RoundController::with_difficulty(seed, settings.starting_difficulty);
        controller.set_fruit(settings.fruit);
        let mut session = Self {
            controller,
            orchard: Orchard::default(),
            hedgehog: Hedgehog::default(),
            falling: Vec::new(),
            narrator: Narrator::new(settings.muted),
            observers: Vec::new(),
            layout_rng: RngState::with_stream(seed, ORCHARD_STREAM).to_rng(),
            dwell: Dwell::from_settings(settings),
            reduced_motion: settings.reduced_motion,
            reveal_ticks: 0,
            next_round_ticks: 0,
        };
        match settings.mode {
            GameMode::Counting => session.start_round(settings.starting_difficulty),
            mode => session.select_mode(mode),
        }
        log::info!("Session started (seed {})", seed);
        session
    }

    /// Register a listener for round events (rendering, analytics, ...)
    pub fn subscribe(&mut self, observer: Box<dyn RoundObserver>) {
        self.observers.push(observer);
    }

    pub fn round(&self) -> &RoundState {
        self.controller.state()
    }

    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    pub fn orchard(&self) -> &Orchard {
        &self.orchard
    }

    pub fn hedgehog(&self) -> &Hedgehog {
        &self.hedgehog
    }

    pub fn falling(&self) -> &[FallingApple] {
        &self.falling
    }

    pub fn mode(&self) -> GameMode {
        self.controller.mode()
    }

    pub fn is_muted(&self) -> bool {
        self.narrator.is_muted()
    }

    /// Number buttons are shown (and clickable) once the reveal delay is over
    pub fn options_visible(&self) -> bool {
        self.phase().accepts_answers() && self.reveal_ticks == 0
    }

    /// Take the audio cues queued since the last call
    pub fn drain_cues(&mut self) -> Vec<Cue> {
        self.narrator.drain_cues()
    }

    /// Advance the session by one fixed timestep
    pub fn tick(&mut self, input: &SessionInput, dt: f32) {
        if input.toggle_mute {
            let muted = self.narrator.toggle_mute();
            log::info!("Muted: {}", muted);
        }

        if input.restart {
            self.controller.reset_game();
            self.regrow();
        }

        if let Some(mode) = input.select_mode {
            self.select_mode(mode);
        }

        if let Some(id) = input.pick {
            self.pick(id);
        }

        if input.retry {
            self.controller.retry();
        }

        if let Some(choice) = input.answer {
            if self.options_visible() {
                self.controller.submit_answer(choice);
            } else {
                log::debug!("Answer {} ignored (options hidden)", choice);
            }
        }

        self.publish();
        self.advance_timers(dt);
    }

    fn pick(&mut self, id: u32) {
        if self.phase() != Phase::Collecting {
            return;
        }
        let Some(pos) = self.orchard.pick(id) else {
            log::debug!("Apple {} not on the tree", id);
            return;
        };

        if self.reduced_motion {
            self.hedgehog.x = pos.x - HEDGEHOG_CATCH_OFFSET;
            self.hedgehog.target = None;
        } else {
            self.hedgehog.chase(pos.x);
        }
        self.falling.push(FallingApple {
            id,
            from: pos,
            ticks_left: self.dwell.fall,
            total_ticks: self.dwell.fall,
        });

        self.controller.record_collection();
        if self.phase() == Phase::Selecting {
            self.reveal_ticks = self.dwell.reveal;
        }
    }

    /// Hand round events to the narrator and every subscriber
    fn publish(&mut self) {
        let events = self.controller.drain_events();
        let state = self.controller.state();
        for event in &events {
            event.dispatch(&mut self.narrator, state);
            for observer in &mut self.observers {
                event.dispatch(observer.as_mut(), state);
            }

            match event {
                RoundEvent::PhaseChanged {
                    to: Phase::Success,
                    ..
                } => self.next_round_ticks = self.dwell.success,
                // Level-up announcement gets its own dwell on top of the success screen
                RoundEvent::DifficultyIncreased { .. } => {
                    self.next_round_ticks += self.dwell.level_up
                }
                // Second addend hangs on a fresh tree
                RoundEvent::SecondGroupStarted { count } => {
                    self.orchard = Orchard::grow(*count, &mut self.layout_rng)
                }
                _ => {}
            }
        }
    }

    fn advance_timers(&mut self, dt: f32) {
        self.hedgehog.step(dt);

        let mut landed = 0;
        for apple in &mut self.falling {
            apple.ticks_left = apple.ticks_left.saturating_sub(1);
            if apple.ticks_left == 0 {
                landed += 1;
            }
        }
        self.falling.retain(|a| a.ticks_left > 0);
        for _ in 0..landed {
            self.narrator.play(SoundEffect::Munch);
        }

        self.reveal_ticks = self.reveal_ticks.saturating_sub(1);

        if self.phase() == Phase::Success {
            self.next_round_ticks = self.next_round_ticks.saturating_sub(1);
            if self.next_round_ticks == 0 {
                self.controller.reset_for_next_round();
                self.regrow();
                self.publish();
            }
        }
    }

    fn start_round(&mut self, level: u32) {
        self.controller.start_round(level);
        self.regrow();
        self.publish();
    }

    fn select_mode(&mut self, mode: GameMode) {
        self.controller.select_mode(mode);
        self.regrow();
        self.publish();
    }

    fn regrow(&mut self) {
        let count = self.controller.state().first_group();
        self.orchard = Orchard::grow(count, &mut self.layout_rng);
        self.falling.clear();
        self.reveal_ticks = 0;
        self.next_round_ticks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn idle(session: &mut Session, ticks: u32) {
        let input = SessionInput::default();
        for _ in 0..ticks {
            session.tick(&input, SIM_DT);
        }
    }

    fn pick(session: &mut Session, id: u32) {
        session.tick(
            &SessionInput {
                pick: Some(id),
                ..Default::default()
            },
            SIM_DT,
        );
    }

    fn answer(session: &mut Session, choice: u32) {
        session.tick(
            &SessionInput {
                answer: Some(choice),
                ..Default::default()
            },
            SIM_DT,
        );
    }

    fn send(session: &mut Session, input: SessionInput) {
        session.tick(&input, SIM_DT);
    }

    fn pick_all(session: &mut Session) {
        let ids: Vec<u32> = session.orchard().remaining().map(|a| a.id).collect();
        for id in ids {
            pick(session, id);
        }
    }

    fn settings_at(level: u32) -> Settings {
        Settings {
            starting_difficulty: level,
            ..Settings::default()
        }
    }

    #[test]
    fn test_new_session_grows_tree() {
        let session = Session::new(1, &settings_at(3));
        assert_eq!(session.phase(), Phase::Collecting);
        assert_eq!(session.round().items_required, 3);
        assert_eq!(session.orchard().apples.len(), 3);
    }

    #[test]
    fn test_picking_collects_and_chases() {
        let mut session = Session::new(1, &settings_at(2));
        let target = session.orchard().apples[0].pos.x;
        pick(&mut session, 0);
        assert_eq!(session.round().items_collected, 1);
        assert_eq!(session.falling().len(), 1);
        assert!(session.hedgehog().is_moving() || session.hedgehog().x == target - HEDGEHOG_CATCH_OFFSET);

        // Same apple twice doesn't count
        pick(&mut session, 0);
        assert_eq!(session.round().items_collected, 1);
    }

    #[test]
    fn test_apple_lands_with_munch() {
        let mut session = Session::new(1, &settings_at(2));
        pick(&mut session, 1);
        session.drain_cues();
        idle(&mut session, secs_to_ticks(APPLE_FALL_SECS));
        assert!(session.falling().is_empty());
        assert!(session.drain_cues().contains(&Cue::Sound(SoundEffect::Munch)));
    }

    #[test]
    fn test_answers_wait_for_reveal() {
        let mut session = Session::new(5, &settings_at(2));
        pick_all(&mut session);
        assert_eq!(session.phase(), Phase::Selecting);
        assert!(!session.options_visible());

        answer(&mut session, 2);
        assert_eq!(session.phase(), Phase::Selecting);
        assert_eq!(session.round().correct_streak, 0);

        idle(&mut session, secs_to_ticks(REVEAL_DELAY_SECS));
        assert!(session.options_visible());
        answer(&mut session, 2);
        assert_eq!(session.phase(), Phase::Success);
    }

    #[test]
    fn test_next_round_after_success_dwell() {
        let mut session = Session::new(5, &settings_at(2));
        pick_all(&mut session);
        idle(&mut session, secs_to_ticks(REVEAL_DELAY_SECS));
        answer(&mut session, 2);

        idle(&mut session, secs_to_ticks(SUCCESS_DWELL_SECS) - 2);
        assert_eq!(session.phase(), Phase::Success);
        idle(&mut session, 2);
        assert_eq!(session.phase(), Phase::Collecting);
        assert_eq!(session.round().items_collected, 0);
        assert_eq!(session.orchard().remaining().count(), 2);
    }

    #[test]
    fn test_level_up_after_three_wins() {
        let mut session = Session::new(9, &settings_at(4));
        let dwell = secs_to_ticks(SUCCESS_DWELL_SECS);
        for round in 0..3 {
            pick_all(&mut session);
            idle(&mut session, secs_to_ticks(REVEAL_DELAY_SECS));
            answer(&mut session, 4);
            assert_eq!(session.phase(), Phase::Success);
            if round < 2 {
                idle(&mut session, dwell);
                assert_eq!(session.phase(), Phase::Collecting);
            }
        }

        // Level-up adds its own dwell
        idle(&mut session, dwell);
        assert_eq!(session.phase(), Phase::Success);
        idle(&mut session, secs_to_ticks(LEVEL_UP_DWELL_SECS));
        assert_eq!(session.phase(), Phase::Collecting);
        assert_eq!(session.round().items_required, 5);
        assert_eq!(session.round().correct_streak, 0);
        assert_eq!(session.orchard().apples.len(), 5);
    }

    #[test]
    fn test_hint_and_retry() {
        let mut session = Session::new(3, &settings_at(3));
        pick_all(&mut session);
        idle(&mut session, secs_to_ticks(REVEAL_DELAY_SECS));
        answer(&mut session, 1);
        answer(&mut session, 1);
        assert_eq!(session.phase(), Phase::Hint);
        assert!(session.options_visible());

        session.tick(
            &SessionInput {
                retry: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(session.phase(), Phase::Selecting);
        assert_eq!(session.round().incorrect_attempts, 2);
    }

    #[test]
    fn test_subscribers_see_events() {
        struct Log(Rc<RefCell<Vec<(Phase, Phase)>>>);
        impl RoundObserver for Log {
            fn on_phase_change(&mut self, from: Phase, to: Phase, _state: &RoundState) {
                self.0.borrow_mut().push((from, to));
            }
        }

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut session = Session::new(2, &settings_at(1));
        session.subscribe(Box::new(Log(seen.clone())));
        pick_all(&mut session);
        assert_eq!(
            *seen.borrow(),
            vec![(Phase::Collecting, Phase::Selecting)]
        );
    }

    #[test]
    fn test_mute_toggle() {
        let mut session = Session::new(2, &settings_at(1));
        assert!(!session.is_muted());
        session.tick(
            &SessionInput {
                toggle_mute: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert!(session.is_muted());
        session.drain_cues();
        pick_all(&mut session);
        assert!(session.drain_cues().is_empty());
    }

    #[test]
    fn test_reduced_motion_teleports_hedgehog() {
        let settings = Settings {
            reduced_motion: true,
            ..settings_at(1)
        };
        let mut session = Session::new(2, &settings);
        let x = session.orchard().apples[0].pos.x;
        pick(&mut session, 0);
        assert!(!session.hedgehog().is_moving());
        assert_eq!(session.hedgehog().x, x - HEDGEHOG_CATCH_OFFSET);
    }

    #[test]
    fn test_falling_apple_drops_to_ground() {
        let mut session = Session::new(4, &settings_at(1));
        let from = session.orchard().apples[0].pos;
        pick(&mut session, 0);
        let apple = session.falling()[0];
        let pos = apple.position();
        assert_eq!(pos.x, from.x);
        assert!(pos.y >= from.y && pos.y < GROUND_Y);

        let landed = FallingApple {
            ticks_left: 0,
            ..apple
        };
        assert_eq!(landed.position().y, GROUND_Y);
    }

    #[test]
    fn test_restart_returns_to_first_level() {
        let mut session = Session::new(9, &settings_at(6));
        pick_all(&mut session);
        idle(&mut session, secs_to_ticks(REVEAL_DELAY_SECS));
        answer(&mut session, 6);
        assert_eq!(session.phase(), Phase::Success);

        send(
            &mut session,
            SessionInput {
                restart: true,
                ..Default::default()
            },
        );
        assert_eq!(session.phase(), Phase::Collecting);
        assert_eq!(session.round().items_required, MIN_DIFFICULTY);
        assert_eq!(session.round().correct_streak, 0);
        assert_eq!(session.orchard().apples.len(), 1);

        // The success countdown no longer applies
        idle(&mut session, secs_to_ticks(SUCCESS_DWELL_SECS));
        assert_eq!(session.round().items_required, MIN_DIFFICULTY);
    }

    #[test]
    fn test_mode_switch_regrows_tree() {
        let mut session = Session::new(12, &settings_at(5));
        session.drain_cues();
        send(
            &mut session,
            SessionInput {
                select_mode: Some(GameMode::Subtraction),
                ..Default::default()
            },
        );
        assert_eq!(session.mode(), GameMode::Subtraction);
        let first = session.round().first_group();
        assert_eq!(session.orchard().apples.len() as u32, first);
        let said: Vec<String> = session
            .drain_cues()
            .into_iter()
            .filter_map(|c| match c {
                Cue::Speak(u) => Some(u.text),
                Cue::Sound(_) => None,
            })
            .collect();
        assert_eq!(
            said.first().map(String::as_str),
            Some(crate::speech::mode_name(GameMode::Subtraction))
        );
    }

    #[test]
    fn test_addition_round_in_two_groups() {
        let settings = Settings {
            mode: GameMode::Addition,
            ..settings_at(3)
        };
        let mut session = Session::new(31, &settings);
        assert_eq!(session.mode(), GameMode::Addition);
        let crate::sim::Task::Add { first, second } = session.round().task else {
            panic!("expected an addition task");
        };
        assert_eq!(session.orchard().apples.len() as u32, first);

        pick_all(&mut session);
        assert_eq!(session.phase(), Phase::Collecting);
        assert_eq!(session.round().items_collected, first);
        assert_eq!(session.orchard().remaining().count() as u32, second);

        pick_all(&mut session);
        assert_eq!(session.phase(), Phase::Selecting);
        idle(&mut session, secs_to_ticks(REVEAL_DELAY_SECS));
        answer(&mut session, first + second);
        assert_eq!(session.phase(), Phase::Success);
    }

    #[test]
    fn test_same_seed_same_session() {
        let a = Session::new(77, &settings_at(6));
        let b = Session::new(77, &settings_at(6));
        assert_eq!(a.orchard().apples, b.orchard().apples);
    }
}
