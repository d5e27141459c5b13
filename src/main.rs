//! Neon Invaders entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use neon_invaders::render::Renderer;
    use neon_invaders::sim::{GamePhase, GameState, TickInput, tick};
    use neon_invaders::ui::UiChrome;
    use neon_invaders::{HighScores, Settings};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        renderer: Renderer,
        ui: UiChrome,
        settings: Settings,
        highscores: HighScores,
        input: TickInput,
        last_phase: GamePhase,
        fire_shown: bool,
    }

    impl Game {
        /// One frame: simulate, sink stats, handle phase edges, draw
        fn frame(&mut self, time: f64) {
            let input = self.input;
            tick(&mut self.state, &input, time);

            // Clear one-shot inputs after processing
            self.input.pause = false;
            self.input.debug_toggle = false;
            self.input.debug_clear = false;

            if self.input.fire != self.fire_shown {
                self.fire_shown = self.input.fire;
                self.ui.set_shoot_active(self.fire_shown);
            }

            if self.state.stats_dirty {
                self.ui.update_stats(&self.state.stats());
                self.state.stats_dirty = false;
            }

            let phase = self.state.phase;
            if phase != self.last_phase {
                match (self.last_phase, phase) {
                    (_, GamePhase::Running) => self.ui.hide_screens(),
                    (GamePhase::Running, GamePhase::Idle) => self.on_game_over(),
                    _ => {}
                }
                self.last_phase = phase;
            }

            self.renderer.draw(&self.state, &self.settings);
        }

        fn on_game_over(&mut self) {
            let score = self.state.score;
            let rank = self.highscores.add_score(score);
            if rank.is_some() {
                self.highscores.save();
            }
            self.ui.render_high_scores(&self.highscores);
            self.ui.show_game_over(score, rank);
            // Held fire would instantly restart past the score screen
            self.input.fire = false;
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Neon Invaders starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let renderer = Renderer::new(&canvas, &document).expect("renderer init failed");
        let ui = UiChrome::new(&document);

        let seed = js_sys::Date::now() as u64;
        let highscores = HighScores::load();
        ui.render_high_scores(&highscores);
        ui.show_start_screen();

        let game = Rc::new(RefCell::new(Game {
            state: GameState::new(seed),
            renderer,
            ui,
            settings: Settings::load(),
            highscores,
            input: TickInput::default(),
            last_phase: GamePhase::Idle,
            fire_shown: false,
        }));

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, game.clone());
        request_animation_frame(game);

        log::info!("Neon Invaders running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Keyboard down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" => g.input.left = true,
                    "ArrowRight" => g.input.right = true,
                    " " => {
                        event.prevent_default();
                        g.input.fire = true;
                    }
                    "h" | "H" => {
                        if !event.repeat() {
                            g.input.pause = true;
                        }
                    }
                    "d" | "D" => {
                        if !event.repeat() {
                            g.input.debug_toggle = true;
                        }
                    }
                    "a" | "A" => {
                        if !event.repeat() {
                            g.input.debug_clear = true;
                        }
                    }
                    "?" => g.ui.toggle_help(),
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" => g.input.left = false,
                    "ArrowRight" => g.input.right = false,
                    " " => g.input.fire = false,
                    _ => {}
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer: hold to fire, steer toward the pointer's side of the ship
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::PointerEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                g.input.fire = true;
                steer_toward(&mut g, &canvas_clone, event.offset_x() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::PointerEvent| {
                let mut g = game.borrow_mut();
                if g.input.fire {
                    steer_toward(&mut g, &canvas_clone, event.offset_x() as f32);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::PointerEvent| {
                let mut g = game.borrow_mut();
                g.input.fire = false;
                g.input.left = false;
                g.input.right = false;
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn steer_toward(game: &mut Game, canvas: &HtmlCanvasElement, pointer_x: f32) {
        use neon_invaders::consts::{FIELD_W, PLAYER_W};

        let scale = FIELD_W / canvas.client_width().max(1) as f32;
        let target = pointer_x * scale;
        let center = game.state.player.pos.x + PLAYER_W / 2.0;
        // Dead zone so the ship settles instead of jittering under the pointer
        game.input.left = target < center - 8.0;
        game.input.right = target > center + 8.0;
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
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
    use neon_invaders::sim::{GamePhase, GameState, TickInput, tick};

    env_logger::init();
    log::info!("Neon Invaders (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    // Scripted demo: hold fire and strafe for a few simulated seconds
    let mut state = GameState::new(0xBADC0DE);
    let mut now = 0.0;
    for step in 0..1800 {
        now += 1000.0 / 60.0;
        let input = TickInput {
            fire: true,
            left: (step / 120) % 2 == 0,
            right: (step / 120) % 2 == 1,
            ..Default::default()
        };
        tick(&mut state, &input, now);
        if state.phase == GamePhase::Idle && step > 0 {
            break;
        }
    }

    println!(
        "Demo run: level {}, score {}, {} invaders remaining",
        state.level,
        state.score,
        state.invaders.len()
    );
}
