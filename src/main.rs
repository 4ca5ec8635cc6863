//! Apple Count entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, MouseEvent};

    use apple_count::audio::AudioManager;
    use apple_count::consts::*;
    use apple_count::sim::{FruitType, GameMode, Phase, RoundState, Task};
    use apple_count::speech::{
        PRAISE, hint_text, mode_name, question_prompt, second_group_prompt, start_prompt,
    };
    use apple_count::{Session, SessionInput, Settings};

    /// What the DOM currently shows; rebuilt only when this changes
    #[derive(Debug, Clone, PartialEq, Default)]
    struct ViewKey {
        phase: Option<Phase>,
        remaining: usize,
        collected: u32,
        options_visible: bool,
        level: u32,
        muted: bool,
        mode: GameMode,
        task: Task,
        fruit: FruitType,
    }

    /// Text shown above the tree or the number buttons
    fn status_text(round: &RoundState) -> String {
        match round.phase {
            Phase::Collecting => match round.task {
                Task::Add { first, second } if round.items_collected >= first => {
                    second_group_prompt(round.fruit, second)
                }
                _ => start_prompt(round),
            },
            Phase::Selecting => question_prompt(round),
            Phase::Hint => hint_text(round),
            Phase::Success => PRAISE.to_string(),
        }
    }

    /// Game instance holding all state
    struct Game {
        session: Session,
        audio: AudioManager,
        accumulator: f32,
        last_time: f64,
        input: SessionInput,
        view: ViewKey,
    }

    impl Game {
        fn new(seed: u64, settings: &Settings) -> Self {
            Self {
                session: Session::new(seed, settings),
                audio: AudioManager::new(settings),
                accumulator: 0.0,
                last_time: 0.0,
                input: SessionInput::default(),
                view: ViewKey::default(),
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = std::mem::take(&mut self.input);
                if input.toggle_mute {
                    self.audio.set_muted(!self.session.is_muted());
                }
                self.session.tick(&input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;
            }

            for cue in self.session.drain_cues() {
                self.audio.play_cue(&cue);
            }
        }

        /// Sync the DOM with the session
        fn render(&mut self, document: &Document) {
            let round = self.session.round();
            let key = ViewKey {
                phase: Some(round.phase),
                remaining: self.session.orchard().remaining().count(),
                collected: round.items_collected,
                options_visible: self.session.options_visible(),
                level: round.items_required,
                muted: self.session.is_muted(),
                mode: round.mode,
                task: round.task,
                fruit: round.fruit,
            };

            // Hedgehog and falling fruit move every frame
            if let Some(el) = document.get_element_by_id("hedgehog") {
                let _ = el.set_attribute(
                    "style",
                    &format!("left: {:.1}px", self.session.hedgehog().x),
                );
            }
            self.render_falling(document);

            if key == self.view {
                return;
            }
            self.view = key;

            self.render_tree(document);
            self.render_panel(document);
            self.render_controls(document);
        }

        fn render_falling(&self, document: &Document) {
            let Some(layer) = document.get_element_by_id("falling") else {
                return;
            };
            layer.set_inner_html("");
            let fruit = self.session.round().fruit.as_str();
            for apple in self.session.falling() {
                let Ok(el) = document.create_element("div") else {
                    continue;
                };
                let pos = apple.position();
                el.set_class_name(&format!("fruit falling {}", fruit));
                let _ = el.set_attribute(
                    "style",
                    &format!("left: {:.1}px; top: {:.1}px", pos.x, pos.y),
                );
                let _ = layer.append_child(&el);
            }
        }

        fn render_controls(&self, document: &Document) {
            if let Some(btn) = document.get_element_by_id("sound-button") {
                let label = if self.session.is_muted() { "🔇" } else { "🔊" };
                btn.set_text_content(Some(label));
            }
            if let Some(el) = document.get_element_by_id("mode-name") {
                el.set_text_content(Some(mode_name(self.session.mode())));
            }
        }

        fn render_tree(&self, document: &Document) {
            let Some(tree) = document.get_element_by_id("apples") else {
                return;
            };
            tree.set_inner_html("");
            let class = format!("fruit {}", self.session.round().fruit.as_str());
            for apple in self.session.orchard().remaining() {
                let Ok(el) = document.create_element("button") else {
                    continue;
                };
                el.set_class_name(&class);
                let _ = el.set_attribute("data-apple", &apple.id.to_string());
                let _ = el.set_attribute(
                    "style",
                    &format!("left: {:.1}px; top: {:.1}px", apple.pos.x, apple.pos.y),
                );
                let _ = tree.append_child(&el);
            }

            if let Some(counter) = document.get_element_by_id("apples-count") {
                counter.set_text_content(Some(
                    &self.session.round().items_collected.to_string(),
                ));
            }
        }

        fn render_panel(&self, document: &Document) {
            let Some(panel) = document.get_element_by_id("options") else {
                return;
            };
            panel.set_inner_html("");
            let round = self.session.round();

            if let Some(el) = document.get_element_by_id("status") {
                el.set_text_content(Some(&status_text(round)));
            }

            if !self.session.options_visible() {
                return;
            }
            for &option in &round.option_set {
                let Ok(el) = document.create_element("button") else {
                    continue;
                };
                let mut class = format!("number-option number-{}", option);
                if round.phase == Phase::Hint {
                    class.push_str(if option == round.correct_answer() {
                        " pulse"
                    } else {
                        " dimmed"
                    });
                }
                el.set_class_name(&class);
                let _ = el.set_attribute("data-option", &option.to_string());
                el.set_text_content(Some(&option.to_string()));
                let _ = panel.append_child(&el);
            }
            if round.phase == Phase::Hint {
                if let Ok(el) = document.create_element("button") {
                    el.set_class_name("retry");
                    let _ = el.set_attribute("data-retry", "1");
                    el.set_text_content(Some("Ещё раз"));
                    let _ = panel.append_child(&el);
                }
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }
        log::info!("Apple Count starting...");

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, &settings)));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone());
        request_animation_frame(game);
        log::info!("Apple Count running!");
    }

    /// Read a numeric data attribute from the clicked element
    fn data_attr(target: &Element, name: &str) -> Option<u32> {
        target.get_attribute(name)?.parse().ok()
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let Some(document) = window.document() else { return };

        // One delegated click handler for fruit, numbers, retry and modes
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let Some(target) = event
                    .target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                else {
                    return;
                };
                let mut g = game.borrow_mut();
                g.audio.resume();
                if let Some(id) = data_attr(&target, "data-apple") {
                    g.input.pick = Some(id);
                } else if let Some(choice) = data_attr(&target, "data-option") {
                    g.input.answer = Some(choice);
                } else if target.has_attribute("data-retry") {
                    g.input.retry = true;
                } else if target.has_attribute("data-restart") {
                    g.input.restart = true;
                } else if let Some(mode) = target
                    .get_attribute("data-mode")
                    .and_then(|name| GameMode::from_name(&name))
                {
                    g.input.select_mode = Some(mode);
                }
            });
            let _ = document
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Sound button; its label follows the session in render
        if let Some(btn) = document.get_element_by_id("sound-button") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.toggle_mute = true;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard: digits answer, M mutes
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "m" | "M" => g.input.toggle_mute = true,
                    "0" => g.input.answer = Some(10),
                    key => {
                        if let Ok(n) = key.parse::<u32>() {
                            g.input.answer = Some(n);
                        }
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.render(&document);
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Apple Count (native) starting...");
    native::run();
}

/// Line-driven front end for playing in a terminal
#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::io::{self, BufRead, Write};
    use std::path::Path;
    use std::time::{SystemTime, UNIX_EPOCH};

    use apple_count::consts::SIM_DT;
    use apple_count::sim::{GameMode, Phase};
    use apple_count::speech::Cue;
    use apple_count::{Session, SessionInput, Settings, secs_to_ticks};

    const HELP: &str = "commands: pick <id> | answer <n> | retry | wait <secs> | \
                        mode <counting|add|sub> | restart | mute | show | quit";

    pub fn run() {
        let settings = std::env::args()
            .nth(1)
            .map(|path| Settings::load(Path::new(&path)))
            .unwrap_or_default();
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let mut session = Session::new(seed, &settings);
        log::info!("Game initialized with seed: {}", seed);
        println!("{}", HELP);
        flush_cues(&mut session);
        show(&session);

        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let mut words = line.split_whitespace();
            let command = words.next().unwrap_or("");
            let arg = words.next();
            let number = arg.and_then(|a| a.parse::<u32>().ok());

            let mut input = SessionInput::default();
            match command {
                "pick" | "p" => input.pick = number,
                "answer" | "a" => input.answer = number,
                "retry" | "r" => input.retry = true,
                "mute" | "m" => input.toggle_mute = true,
                "restart" => input.restart = true,
                "mode" => match arg.and_then(GameMode::from_name) {
                    Some(mode) => input.select_mode = Some(mode),
                    None => {
                        println!("modes: counting, add, sub");
                        continue;
                    }
                },
                "wait" | "w" => {
                    let secs = arg.and_then(|a| a.parse::<f32>().ok()).unwrap_or(1.0);
                    idle(&mut session, secs_to_ticks(secs));
                }
                "show" | "s" => {}
                "quit" | "q" => break,
                "" => continue,
                _ => {
                    println!("{}", HELP);
                    continue;
                }
            }
            session.tick(&input, SIM_DT);
            flush_cues(&mut session);
            show(&session);
            let _ = io::stdout().flush();
        }
        log::info!("Goodbye");
    }

    fn idle(session: &mut Session, ticks: u32) {
        let input = SessionInput::default();
        for _ in 0..ticks {
            session.tick(&input, SIM_DT);
            flush_cues(session);
        }
    }

    fn flush_cues(session: &mut Session) {
        for cue in session.drain_cues() {
            match cue {
                Cue::Speak(u) => println!("  \u{1F5E3}  {}", u.text),
                Cue::Sound(effect) => log::debug!("sound: {:?}", effect),
            }
        }
    }

    fn show(session: &Session) {
        let round = session.round();
        match round.phase {
            Phase::Collecting => {
                let ids: Vec<String> = session
                    .orchard()
                    .remaining()
                    .map(|a| a.id.to_string())
                    .collect();
                println!(
                    "[{} {:?}, {}/{}] {}s on the tree: {}",
                    round.mode.as_str(),
                    round.task,
                    round.items_collected,
                    round.collection_target(),
                    round.fruit.as_str(),
                    ids.join(" ")
                );
            }
            Phase::Selecting | Phase::Hint if session.options_visible() => {
                println!("options: {:?}", round.option_set);
            }
            Phase::Selecting | Phase::Hint => println!("(the hedgehog is chewing...)"),
            Phase::Success => println!("(well done! next round soon)"),
        }
    }
}
