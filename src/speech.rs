//! Spoken prompts and sound cues
//!
//! The narrator listens to round events and queues what should be heard.
//! Playback is platform-specific (see `audio` on wasm); this module only
//! decides *what* to say, so it can be tested natively.

use serde::{Deserialize, Serialize};

use crate::sim::{FruitType, GameMode, Phase, RoundObserver, RoundState, Task};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Apple picked off the tree
    Pick,
    /// Hedgehog eats the apple
    Munch,
    /// Wrong number chosen
    Wrong,
    /// Correct number chosen
    Success,
    /// Difficulty went up
    LevelUp,
}

/// A line of speech with voice parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
    /// Cut off whatever is being said instead of queueing behind it
    #[serde(default)]
    pub interrupt: bool,
}

impl Utterance {
    pub fn new(text: impl Into<String>, rate: f32, pitch: f32) -> Self {
        Self {
            text: text.into(),
            rate,
            pitch,
            interrupt: false,
        }
    }

    fn plain(text: impl Into<String>) -> Self {
        Self::new(text, 1.0, 1.0)
    }

    fn interrupting(mut self) -> Self {
        self.interrupt = true;
        self
    }
}

/// Something to play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cue {
    Speak(Utterance),
    Sound(SoundEffect),
}

/// Voice language tag for the speech synthesizer
pub const VOICE_LANG: &str = "ru-RU";

pub const PRAISE: &str = "Молодец! Правильно!";
pub const TRY_AGAIN: &str = "Попробуй ещё раз!";
pub const LEVEL_UP: &str = "Отлично! Переходим на следующий уровень!";
const TRY_AGAIN_TOGETHER: &str = "Давай попробуем ещё раз!";

const NUMBER_WORDS: [&str; 10] = [
    "Один", "Два", "Три", "Четыре", "Пять", "Шесть", "Семь", "Восемь", "Девять", "Десять",
];

/// Spoken word for 1..=10
pub fn number_word(n: u32) -> Option<&'static str> {
    n.checked_sub(1)
        .and_then(|i| NUMBER_WORDS.get(i as usize))
        .copied()
}

/// Noun forms after a number: one, few (2-4), many
fn noun_forms(fruit: FruitType) -> [&'static str; 3] {
    match fruit {
        FruitType::Apple => ["яблоко", "яблока", "яблок"],
        FruitType::Pear => ["груша", "груши", "груш"],
        FruitType::Banana => ["банан", "банана", "бананов"],
        FruitType::Orange => ["апельсин", "апельсина", "апельсинов"],
        FruitType::Strawberry => ["клубника", "клубники", "клубник"],
    }
}

/// The fruit as the object of "собери"
fn gather_word(fruit: FruitType) -> &'static str {
    match fruit {
        FruitType::Apple => "яблоки",
        FruitType::Pear => "груши",
        FruitType::Banana => "бананы",
        FruitType::Orange => "апельсины",
        FruitType::Strawberry => "клубнику",
    }
}

/// `fruit` in the grammatical form that follows `n`
pub fn fruit_word(fruit: FruitType, n: u32) -> &'static str {
    let [one, few, many] = noun_forms(fruit);
    match (n % 10, n % 100) {
        (1, r) if r != 11 => one,
        (2..=4, r) if !(12..=14).contains(&r) => few,
        _ => many,
    }
}

fn count_phrase(fruit: FruitType, n: u32) -> String {
    format!("{} {}", n, fruit_word(fruit, n))
}

pub fn mode_name(mode: GameMode) -> &'static str {
    match mode {
        GameMode::Counting => "Счёт",
        GameMode::Addition => "Сложение",
        GameMode::Subtraction => "Вычитание",
    }
}

/// Instruction at the start of a round
pub fn start_prompt(state: &RoundState) -> String {
    match state.task {
        Task::Count => format!("Собери {} с дерева! Ёжик их съест.", gather_word(state.fruit)),
        Task::Add { first, .. } | Task::Subtract { first, .. } => {
            format!("Собери {}!", count_phrase(state.fruit, first))
        }
    }
}

pub fn second_group_prompt(fruit: FruitType, count: u32) -> String {
    format!("Теперь собери ещё {}!", count_phrase(fruit, count))
}

/// Question asked once the numbers appear
pub fn question_prompt(state: &RoundState) -> String {
    match state.task {
        Task::Count => format!("Сколько {} собрал ёжик?", noun_forms(state.fruit)[2]),
        Task::Add { first, second } => format!("Сколько будет {} плюс {}?", first, second),
        Task::Subtract { first, second } => format!("Сколько будет {} минус {}?", first, second),
    }
}

/// Hint line naming the right answer
pub fn hint_text(state: &RoundState) -> String {
    let answer = state.correct_answer();
    let lead = match state.task {
        Task::Count => format!("Ёжик собрал {}.", count_phrase(state.fruit, answer)),
        Task::Add { first, second } => format!("{} плюс {} будет {}.", first, second, answer),
        Task::Subtract { first, second } => format!("{} минус {} будет {}.", first, second, answer),
    };
    format!("{} {}", lead, TRY_AGAIN_TOGETHER)
}

/// Turns round events into cues
#[derive(Debug, Clone, Default)]
pub struct Narrator {
    muted: bool,
    /// Last count spoken, so a repeated event doesn't say it twice
    last_spoken_count: u32,
    cues: Vec<Cue>,
}

impl Narrator {
    pub fn new(muted: bool) -> Self {
        Self {
            muted,
            ..Self::default()
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Mute/unmute; muting drops anything still queued
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.cues.clear();
        }
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.set_muted(!self.muted);
        self.muted
    }

    /// Queue a sound effect (used by the driver for non-round sounds)
    pub fn play(&mut self, effect: SoundEffect) {
        self.push(Cue::Sound(effect));
    }

    /// Queue an utterance
    pub fn say(&mut self, utterance: Utterance) {
        self.push(Cue::Speak(utterance));
    }

    /// Take everything queued since the last call
    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    fn push(&mut self, cue: Cue) {
        if !self.muted {
            self.cues.push(cue);
        }
    }

    fn speak_count(&mut self, n: u32) {
        if n == self.last_spoken_count {
            return;
        }
        if let Some(word) = number_word(n) {
            self.say(Utterance::new(format!("{}!", word), 1.1, 1.2).interrupting());
            self.last_spoken_count = n;
        }
    }
}

impl RoundObserver for Narrator {
    fn on_phase_change(&mut self, _from: Phase, to: Phase, state: &RoundState) {
        match to {
            Phase::Collecting => {
                self.last_spoken_count = 0;
                self.say(Utterance::plain(start_prompt(state)));
            }
            Phase::Selecting => self.say(Utterance::plain(question_prompt(state))),
            Phase::Success => {
                self.play(SoundEffect::Success);
                self.say(Utterance::new(PRAISE, 0.9, 1.1).interrupting());
            }
            Phase::Hint => self.say(Utterance::new(hint_text(state), 0.9, 1.0)),
        }
    }

    fn on_collection(&mut self, collected: u32, _required: u32) {
        self.play(SoundEffect::Pick);
        self.speak_count(collected);
    }

    fn on_answer(&mut self, _choice: u32, correct: bool, state: &RoundState) {
        if correct {
            return;
        }
        self.play(SoundEffect::Wrong);
        // The hint already tells them to try again
        if state.phase != Phase::Hint {
            self.say(Utterance::new(TRY_AGAIN, 0.9, 1.0).interrupting());
        }
    }

    fn on_difficulty_increased(&mut self, _level: u32) {
        self.play(SoundEffect::LevelUp);
        self.say(Utterance::plain(LEVEL_UP));
    }

    fn on_second_group(&mut self, count: u32, state: &RoundState) {
        self.say(Utterance::plain(second_group_prompt(state.fruit, count)));
    }

    fn on_mode_selected(&mut self, mode: GameMode) {
        self.say(Utterance::plain(mode_name(mode)).interrupting());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::RoundController;

    fn spoken(cues: &[Cue]) -> Vec<String> {
        cues.iter()
            .filter_map(|c| match c {
                Cue::Speak(u) => Some(u.text.clone()),
                Cue::Sound(_) => None,
            })
            .collect()
    }

    fn feed(narrator: &mut Narrator, ctrl: &mut RoundController) {
        for event in ctrl.drain_events() {
            event.dispatch(narrator, ctrl.state());
        }
    }

    #[test]
    fn test_number_words() {
        assert_eq!(number_word(1), Some("Один"));
        assert_eq!(number_word(10), Some("Десять"));
        assert_eq!(number_word(0), None);
        assert_eq!(number_word(11), None);
    }

    #[test]
    fn test_fruit_word_forms() {
        assert_eq!(fruit_word(FruitType::Apple, 1), "яблоко");
        assert_eq!(fruit_word(FruitType::Apple, 2), "яблока");
        assert_eq!(fruit_word(FruitType::Apple, 4), "яблока");
        assert_eq!(fruit_word(FruitType::Apple, 5), "яблок");
        assert_eq!(fruit_word(FruitType::Apple, 11), "яблок");
        assert_eq!(fruit_word(FruitType::Apple, 12), "яблок");
        assert_eq!(fruit_word(FruitType::Apple, 21), "яблоко");
        assert_eq!(fruit_word(FruitType::Pear, 3), "груши");
        assert_eq!(fruit_word(FruitType::Banana, 7), "бананов");
        assert_eq!(fruit_word(FruitType::Strawberry, 1), "клубника");
    }

    #[test]
    fn test_prompts_follow_task_and_fruit() {
        let mut state = RoundState::new(3);
        assert_eq!(
            hint_text(&state),
            "Ёжик собрал 3 яблока. Давай попробуем ещё раз!"
        );
        assert_eq!(question_prompt(&state), "Сколько яблок собрал ёжик?");

        state.fruit = FruitType::Orange;
        assert_eq!(
            start_prompt(&state),
            "Собери апельсины с дерева! Ёжик их съест."
        );

        state.task = Task::Add { first: 2, second: 3 };
        state.fruit = FruitType::Pear;
        assert_eq!(start_prompt(&state), "Собери 2 груши!");
        assert_eq!(question_prompt(&state), "Сколько будет 2 плюс 3?");
        assert_eq!(hint_text(&state), "2 плюс 3 будет 5. Давай попробуем ещё раз!");

        state.task = Task::Subtract { first: 7, second: 4 };
        assert_eq!(question_prompt(&state), "Сколько будет 7 минус 4?");
        assert_eq!(hint_text(&state), "7 минус 4 будет 3. Давай попробуем ещё раз!");
    }

    #[test]
    fn test_counts_spoken_during_collection() {
        let mut ctrl = RoundController::with_difficulty(1, 3);
        let mut narrator = Narrator::new(false);
        ctrl.drain_events();

        for _ in 0..3 {
            ctrl.record_collection();
        }
        feed(&mut narrator, &mut ctrl);

        let cues = narrator.drain_cues();
        assert_eq!(
            spoken(&cues),
            vec![
                "Один!".to_string(),
                "Два!".to_string(),
                "Три!".to_string(),
                question_prompt(ctrl.state())
            ]
        );
        assert_eq!(
            cues.iter()
                .filter(|c| **c == Cue::Sound(SoundEffect::Pick))
                .count(),
            3
        );
    }

    #[test]
    fn test_same_count_not_repeated() {
        let mut narrator = Narrator::new(false);
        narrator.on_collection(2, 5);
        narrator.on_collection(2, 5);
        assert_eq!(spoken(&narrator.drain_cues()), vec!["Два!"]);
    }

    #[test]
    fn test_new_round_resets_spoken_count() {
        let mut narrator = Narrator::new(false);
        let state = RoundState::new(1);
        narrator.on_collection(1, 1);
        narrator.on_phase_change(Phase::Success, Phase::Collecting, &state);
        narrator.on_collection(1, 1);
        assert_eq!(
            spoken(&narrator.drain_cues()),
            vec!["Один!".to_string(), start_prompt(&state), "Один!".to_string()]
        );
    }

    #[test]
    fn test_hint_replaces_try_again() {
        let mut ctrl = RoundController::with_difficulty(1, 2);
        let mut narrator = Narrator::new(false);
        ctrl.record_collection();
        ctrl.record_collection();
        ctrl.drain_events();

        ctrl.submit_answer(3);
        feed(&mut narrator, &mut ctrl);
        assert_eq!(spoken(&narrator.drain_cues()), vec![TRY_AGAIN]);

        ctrl.submit_answer(3);
        feed(&mut narrator, &mut ctrl);
        assert_eq!(spoken(&narrator.drain_cues()), vec![hint_text(ctrl.state())]);

        // Still hinted: the buzz plays, the hint is not read out again
        ctrl.submit_answer(4);
        feed(&mut narrator, &mut ctrl);
        let cues = narrator.drain_cues();
        assert_eq!(cues, vec![Cue::Sound(SoundEffect::Wrong)]);
    }

    #[test]
    fn test_addition_asks_for_second_group() {
        let mut ctrl = RoundController::with_difficulty(6, 2);
        let mut narrator = Narrator::new(false);
        ctrl.select_mode(GameMode::Addition);
        feed(&mut narrator, &mut ctrl);
        let opening = spoken(&narrator.drain_cues());
        assert_eq!(opening[0], mode_name(GameMode::Addition));
        assert_eq!(opening[1], start_prompt(ctrl.state()));

        let Task::Add { first, second } = ctrl.state().task else {
            panic!("expected an addition task");
        };
        for _ in 0..first {
            ctrl.record_collection();
        }
        feed(&mut narrator, &mut ctrl);
        let lines = spoken(&narrator.drain_cues());
        assert_eq!(
            lines.last(),
            Some(&second_group_prompt(ctrl.state().fruit, second))
        );
    }

    #[test]
    fn test_level_up_announced() {
        let mut narrator = Narrator::new(false);
        narrator.on_difficulty_increased(4);
        let cues = narrator.drain_cues();
        assert_eq!(cues[0], Cue::Sound(SoundEffect::LevelUp));
        assert_eq!(spoken(&cues), vec![LEVEL_UP]);
    }

    #[test]
    fn test_counts_interrupt_prompts_queue() {
        let mut narrator = Narrator::new(false);
        narrator.on_collection(1, 2);
        narrator.on_difficulty_increased(3);
        let speech: Vec<bool> = narrator
            .drain_cues()
            .into_iter()
            .filter_map(|c| match c {
                Cue::Speak(u) => Some(u.interrupt),
                Cue::Sound(_) => None,
            })
            .collect();
        assert_eq!(speech, vec![true, false]);
    }

    #[test]
    fn test_muted_is_silent() {
        let mut narrator = Narrator::new(true);
        narrator.on_collection(1, 3);
        narrator.play(SoundEffect::Munch);
        assert!(narrator.drain_cues().is_empty());

        narrator.play(SoundEffect::Munch);
        assert!(!narrator.toggle_mute());
        narrator.play(SoundEffect::Munch);
        assert_eq!(narrator.drain_cues(), vec![Cue::Sound(SoundEffect::Munch)]);
    }
}
