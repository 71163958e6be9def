//! Soul Match entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlElement, KeyboardEvent, MouseEvent};

    use soul_match::audio::AudioManager;
    use soul_match::platform::{FrameClock, card_input, is_mute_key, key_input};
    use soul_match::sim::{Character, FightSession, GameEvent, GameSession, tick};
    use soul_match::{Settings, Tuning};

    /// Where the game goes after the last pair
    const VICTORY_PAGE: &str = "name.html";

    fn face_image(face: Character) -> &'static str {
        match face {
            Character::Papyrus => "https://img.icons8.com/ios/50/papyrus.png",
            Character::Toriel => "https://img.icons8.com/ios/50/toriel.png",
            Character::Asgore => "https://img.icons8.com/ios/50/asgore.png",
            Character::Sans => "https://img.icons8.com/ios/50/sans.png",
            Character::Flowey => "https://img.icons8.com/ios/50/flowey.png",
            Character::EvilFlowey => "./images/flowey.png",
        }
    }

    fn speaker_portrait(face: Character) -> &'static str {
        match face {
            Character::Papyrus => "./images/paparyus_face.png",
            Character::Toriel => "./images/toriel_face.png",
            Character::Asgore => "./images/Asgore_face.png",
            Character::Sans => "./images/sans-face.png",
            Character::Flowey | Character::EvilFlowey => "./images/flowey-face.gif",
        }
    }

    /// Game instance holding all state
    struct Game {
        session: GameSession,
        audio: AudioManager,
        document: Document,
        clock: FrameClock,
        /// Live bullet elements keyed by bullet id
        bullet_elements: HashMap<u32, Element>,
        /// Cards that already have a click listener
        wired_cards: usize,
    }

    impl Game {
        fn new(seed: u64, tuning: Tuning, settings: Settings, document: Document) -> Self {
            Self {
                session: GameSession::new(seed, tuning),
                audio: AudioManager::new(settings),
                document,
                clock: FrameClock::new(),
                bullet_elements: HashMap::new(),
                wired_cards: 0,
            }
        }

        /// Run one frame of simulation
        fn update(&mut self, time: f64) {
            let dt_ms = self.clock.advance(time);
            tick(&mut self.session, dt_ms);
        }

        fn card(&self, index: usize) -> Option<Element> {
            self.document
                .query_selector(&format!(".col[data-index='{}']", index))
                .ok()
                .flatten()
        }

        fn card_part(&self, index: usize, selector: &str) -> Option<HtmlElement> {
            self.card(index)?
                .query_selector(selector)
                .ok()
                .flatten()?
                .dyn_into::<HtmlElement>()
                .ok()
        }

        fn set_flipped(&self, index: usize, flipped: bool) {
            if let Some(card) = self.card_part(index, ".card") {
                let classes = card.class_list();
                let _ = if flipped {
                    classes.add_1("flip")
                } else {
                    classes.remove_1("flip")
                };
            }
        }

        fn set_back_color(&self, index: usize, color: &str) {
            if let Some(back) = self.card_part(index, ".back") {
                let _ = back.style().set_property("background-color", color);
            }
        }

        fn set_animation(&self, index: usize, animation: &str) {
            if self.audio.settings().reduced_motion && !animation.is_empty() {
                return;
            }
            if let Some(card) = self.card_part(index, ".card") {
                let _ = card.style().set_property("animation", animation);
            }
        }

        fn set_face(&self, index: usize, face: Character) {
            if let Some(icons) = self.card_part(index, ".icons") {
                icons.set_inner_html(&format!(
                    "<img src=\"{}\" alt=\"Character\" width=\"50\">",
                    face_image(face)
                ));
            }
        }

        fn set_visible(&self, id: &str, visible: bool, shown: &str) {
            if let Some(el) = self
                .document
                .get_element_by_id(id)
                .and_then(|e| e.dyn_into::<HtmlElement>().ok())
            {
                let _ = el
                    .style()
                    .set_property("display", if visible { shown } else { "none" });
            }
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn show_dialogue(&self, speaker: Character) {
            let Some(text) = speaker.dialogue() else {
                return;
            };
            if let Some(frame) = self.document.query_selector(".frame").ok().flatten() {
                frame.set_inner_html(&format!(
                    "<div class=\"talking\"><img src=\"{}\" alt=\"{} talking\" width=\"50\"><p>{}</p></div>",
                    speaker_portrait(speaker),
                    speaker.as_str(),
                    text.replace('\n', "<br>")
                ));
            }
        }

        fn render_hearts(&self, lives: u8) {
            let Ok(hearts) = self.document.query_selector_all(".heart") else {
                return;
            };
            for i in 0..hearts.length() {
                let Some(heart) = hearts.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                    continue;
                };
                if i < lives as u32 {
                    heart.set_inner_html(
                        "<img src=\"./images/Undertale_red_soul.svg\" alt=\"life\" width=\"50\">",
                    );
                } else {
                    heart.set_inner_html("");
                }
            }
        }

        /// Append a face-down card to the board container
        fn add_card(&self, index: usize, face: Character) {
            let Some(board) = self.document.query_selector(".board").ok().flatten() else {
                log::warn!("No .board container for card {}", index);
                return;
            };
            let Ok(col) = self.document.create_element("div") else {
                return;
            };
            col.set_class_name("col");
            let _ = col.set_attribute("data-index", &index.to_string());
            col.set_inner_html("<div class=\"card\"><div class=\"front\"></div><div class=\"back\"><div class=\"icons\"></div></div></div>");
            let _ = board.append_child(&col);
            self.set_face(index, face);
        }

        /// Apply drained events to the DOM and audio
        fn present(&mut self, events: Vec<GameEvent>) -> bool {
            let mut navigate = false;
            for event in events {
                self.audio.handle(&event);
                match event {
                    GameEvent::BoardDealt { faces, lives } => {
                        for (index, face) in faces.into_iter().enumerate() {
                            self.set_flipped(index, false);
                            self.set_back_color(index, "");
                            self.set_animation(index, "");
                            self.set_face(index, face);
                        }
                        self.render_hearts(lives);
                        self.set_visible("gameOver", false, "block");
                        self.set_visible("fightScreen", false, "flex");
                        if let Some(frame) = self.document.query_selector(".frame").ok().flatten() {
                            frame.set_inner_html("");
                        }
                    }
                    GameEvent::CardFlipped { index, .. } => self.set_flipped(index, true),
                    GameEvent::CardArmed { index } => {
                        self.set_face(index, Character::EvilFlowey);
                        self.set_animation(index, "");
                    }
                    GameEvent::CardDealt { index, face } => self.add_card(index, face),
                    GameEvent::CardsMatched { first, second } => {
                        self.set_back_color(first, "green");
                        self.set_back_color(second, "green");
                    }
                    GameEvent::CardsWrong { first, second, lit } => {
                        let (color, anim) = if lit {
                            ("red", "wrongMatch 0.2s ease-in-out")
                        } else {
                            ("", "")
                        };
                        for index in [first, second] {
                            self.set_back_color(index, color);
                            self.set_animation(index, anim);
                        }
                    }
                    GameEvent::CardsHidden { first, second } => {
                        self.set_flipped(first, false);
                        self.set_flipped(second, false);
                    }
                    GameEvent::CardHidden { index } => {
                        self.set_flipped(index, false);
                        self.set_back_color(index, "");
                    }
                    GameEvent::LifeLost { remaining } => self.render_hearts(remaining),
                    GameEvent::Dialogue { speaker } => {
                        self.show_dialogue(speaker);
                        if speaker == Character::Flowey {
                            if let Some(index) = self.session.matcher.armed {
                                self.set_animation(index, "floweySpecial 0.5s ease-in-out");
                                self.set_back_color(index, "darkred");
                            }
                        }
                    }
                    GameEvent::FightOverlay { visible } => {
                        self.set_visible("fightScreen", visible, "flex");
                        if visible {
                            self.set_text("time", "get ready to fight...");
                        }
                    }
                    GameEvent::FightStarted => self.set_text("time", "The battle has begun..."),
                    GameEvent::Countdown { remaining } => {
                        self.set_text("timer", &remaining.to_string())
                    }
                    GameEvent::FightSurvived => {
                        self.set_text("time", "You survived! Flowey retreats...")
                    }
                    GameEvent::GameOver => self.set_visible("gameOver", true, "block"),
                    GameEvent::Navigate => navigate = true,
                    GameEvent::FightLost
                    | GameEvent::Won
                    | GameEvent::Play(_)
                    | GameEvent::Stop(_)
                    | GameEvent::SilenceVoices => {}
                }
            }
            navigate
        }

        /// Mirror the fight's player and bullets into the arena
        fn render_fight(&mut self) {
            let fight = self.session.fight.as_ref();
            let live: Vec<u32> = fight
                .map(|f| f.bullets.iter().map(|b| b.id).collect())
                .unwrap_or_default();

            // Drop elements for bullets that no longer exist
            self.bullet_elements.retain(|id, el| {
                let keep = live.contains(id);
                if !keep {
                    el.remove();
                }
                keep
            });

            let Some(fight) = fight else { return };
            self.render_player(fight);

            let Some(container) = self.document.get_element_by_id("container") else {
                return;
            };
            for bullet in &fight.bullets {
                if !self.bullet_elements.contains_key(&bullet.id) {
                    let Ok(el) = self.document.create_element("div") else {
                        continue;
                    };
                    el.set_class_name("bullet");
                    let _ = container.append_child(&el);
                    self.bullet_elements.insert(bullet.id, el);
                }
                if let Some(el) = self
                    .bullet_elements
                    .get(&bullet.id)
                    .and_then(|e| e.dyn_ref::<HtmlElement>())
                {
                    let style = el.style();
                    let _ = style.set_property("left", &format!("{}px", bullet.pos.x));
                    let _ = style.set_property("top", &format!("{}px", bullet.pos.y));
                }
            }
        }

        fn render_player(&self, fight: &FightSession) {
            let Some(cat) = self
                .document
                .get_element_by_id("cat")
                .and_then(|e| e.dyn_into::<HtmlElement>().ok())
            else {
                return;
            };
            let style = cat.style();
            let _ = style.set_property("left", &format!("{}px", fight.player.pos.x));
            let _ = style.set_property("top", &format!("{}px", fight.player.pos.y));
            let flip = match fight.player.facing {
                soul_match::sim::Facing::Left => "scaleX(-1)",
                soul_match::sim::Facing::Right => "scaleX(1)",
            };
            let _ = style.set_property("transform", flip);
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {:?}", e).into());
        }

        log::info!("Soul Match starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        let tuning = document
            .get_element_by_id("tuning")
            .and_then(|el| el.text_content())
            .map(|json| Tuning::from_json_or_default(&json))
            .unwrap_or_default();
        let settings = Settings::load();

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, tuning, settings, document)));
        log::info!("Game initialized with seed: {}", seed);

        wire_cards(game.clone());
        setup_input_handlers(game.clone());
        setup_restart_button(game.clone());
        setup_auto_mute(game.clone());

        request_animation_frame(game);

        log::info!("Soul Match running!");
    }

    /// Attach click listeners to any cards that don't have one yet
    fn wire_cards(game: Rc<RefCell<Game>>) {
        let (document, start) = {
            let g = game.borrow();
            (g.document.clone(), g.wired_cards)
        };
        let Ok(cols) = document.query_selector_all(".col") else {
            return;
        };
        for i in start as u32..cols.length() {
            let Some(col) = cols.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            if col.get_attribute("data-index").is_none() {
                let _ = col.set_attribute("data-index", &i.to_string());
            }
            let game_ref = game.clone();
            let col_ref = col.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let index = col_ref.get_attribute("data-index").unwrap_or_default();
                if let Some(input) = card_input(&index) {
                    game_ref.borrow_mut().session.push_input(input);
                }
            });
            let _ = col.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        game.borrow_mut().wired_cards = cols.length() as usize;
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        for (kind, pressed) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                if pressed && is_mute_key(&key) {
                    let muted = game.borrow_mut().audio.toggle_muted();
                    log::info!("Audio {}", if muted { "muted" } else { "unmuted" });
                    return;
                }
                if let Some(input) = key_input(&key, pressed) {
                    let mut g = game.borrow_mut();
                    if g.session.fight.is_some() {
                        event.prevent_default();
                    }
                    g.session.push_input(input);
                }
            });
            let _ = window.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let (navigate, new_cards) = {
            let mut g = game.borrow_mut();
            g.update(time);
            let events = g.session.drain_events();
            let new_cards = events
                .iter()
                .any(|e| matches!(e, GameEvent::CardDealt { .. }));
            let navigate = g.present(events);
            g.render_fight();
            (navigate, new_cards)
        };

        if new_cards {
            wire_cards(game.clone());
        }

        if navigate {
            if let Some(window) = web_sys::window() {
                let _ = window.location().set_href(VICTORY_PAGE);
            }
            return;
        }

        request_animation_frame(game);
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let document = game.borrow().document.clone();
        let Some(btn) = document.get_element_by_id("restart-btn") else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let seed = js_sys::Date::now() as u64;
            let mut g = game.borrow_mut();
            // The armed twin only exists for one session
            if let Ok(cols) = g.document.query_selector_all(".col") {
                let base = soul_match::sim::Board::standard_deck().len() as u32;
                for i in (base..cols.length()).rev() {
                    if let Some(el) = cols.get(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                        el.remove();
                    }
                }
                g.wired_cards = g.wired_cards.min(base as usize);
            }
            g.session.restart(seed);
            log::info!("Game restarted with seed: {}", seed);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_mute(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        for (kind, blurred) in [("blur", true), ("focus", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.audio.settings().mute_on_blur {
                    g.audio.set_suspended(blurred);
                    log::info!("Audio {} ({})", if blurred { "suspended" } else { "resumed" }, kind);
                }
            });
            let _ = window.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Soul Match (native) starting...");
    log::info!("Native mode is a headless demo - run with `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(2024);
    demo(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play one scripted session: trigger the fight, survive it, clear the board
#[cfg(not(target_arch = "wasm32"))]
fn demo(seed: u64) {
    use soul_match::Tuning;
    use soul_match::consts::FRAME_MS;
    use soul_match::sim::{Character, GameSession, InputEvent, MatchPhase, tick};

    let mut session = GameSession::new(seed, Tuning::default());
    fn log_events(session: &mut GameSession) {
        for event in session.drain_events() {
            log::info!("[{:>6} ms] {:?}", session.scheduler.now(), event);
        }
    }

    let faces: Vec<Character> = session.matcher.board.cards.iter().map(|c| c.face).collect();
    let Some(special) = faces.iter().position(|f| *f == Character::Flowey) else {
        log::warn!("Board has no special card");
        return;
    };

    session.push_input(InputEvent::Flip(special));
    // The demo pilot is invulnerable: it sweeps the arena every frame
    while session.fight.is_none() || session.fight.as_ref().is_some_and(|f| f.is_running()) {
        tick(&mut session, FRAME_MS);
        if let Some(fight) = session.fight.as_mut() {
            fight.bullets.clear();
        }
        log_events(&mut session);
    }
    while session.fight.is_some() {
        tick(&mut session, FRAME_MS);
        log_events(&mut session);
    }

    let faces: Vec<Character> = session.matcher.board.cards.iter().map(|c| c.face).collect();
    let mut pairs: Vec<(usize, usize)> = Vec::new();
    for (i, face) in faces.iter().enumerate() {
        if let Some(j) = faces[i + 1..].iter().position(|f| f == face) {
            pairs.push((i, i + 1 + j));
        }
    }

    for (a, b) in pairs {
        if session.matcher.phase == MatchPhase::Won {
            break;
        }
        session.push_input(InputEvent::Flip(a));
        session.push_input(InputEvent::Flip(b));
        for _ in 0..40 {
            tick(&mut session, FRAME_MS);
        }
        log_events(&mut session);
    }

    println!(
        "seed {}: phase {:?}, {} pairs, {} lives, {} frames",
        seed,
        session.matcher.phase,
        session.matcher.matched,
        session.matcher.lives,
        session.frame_count
    );
}
