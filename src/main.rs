//! Match Connect entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, MouseEvent};

    use match_connect::audio::AudioManager;
    use match_connect::render::{Canvas2dRenderer, draw_scene};
    use match_connect::settings::Settings;
    use match_connect::sim::{GameEvent, Session};

    /// Space around the board on the canvas
    const BOARD_MARGIN: f32 = 16.0;
    /// Longest frame step fed to the session (tab switches, breakpoints)
    const MAX_FRAME_MS: f32 = 100.0;

    /// Game instance holding all state
    struct Game {
        session: Session,
        settings: Settings,
        renderer: Canvas2dRenderer,
        audio: AudioManager,
        document: Document,
        canvas_size: (f64, f64),
        last_time: f64,
    }

    impl Game {
        fn new_seed() -> u64 {
            js_sys::Date::now() as u64
        }

        /// Canvas point (CSS pixels) to board space
        fn board_point(x: i32, y: i32) -> Vec2 {
            Vec2::new(x as f32, y as f32) - Vec2::splat(BOARD_MARGIN)
        }

        fn on_mouse_down(&mut self, event: &MouseEvent) {
            self.audio.resume();
            let point = Self::board_point(event.offset_x(), event.offset_y());
            match self.session.layout().cell_at(point) {
                Some(at) => self.session.click(at),
                None => self.session.click_outside(),
            }
        }

        /// Advance the session and react to what it raised
        fn update(&mut self, dt_ms: f32) {
            self.session.tick(dt_ms.clamp(0.0, MAX_FRAME_MS));
            for event in self.session.drain_events() {
                match event {
                    GameEvent::Sound(effect) => self.audio.play(effect),
                    GameEvent::Cleared { cells, chain } if chain > 1 => {
                        log::debug!("Chain x{}: {} tiles", chain, cells);
                    }
                    GameEvent::GameOver { score } => {
                        log::info!("Game over, final score {}", score);
                    }
                    _ => {}
                }
            }
        }

        fn render(&mut self) {
            self.renderer.clear(self.canvas_size.0, self.canvas_size.1);
            draw_scene(&self.session, &mut self.renderer);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let score = self.session.score().to_string();
            if let Some(el) = self.document.query_selector("#hud-score .hud-value").ok().flatten() {
                if el.text_content().as_deref() != Some(score.as_str()) {
                    el.set_text_content(Some(&score));
                }
            }

            if let Some(el) = self.document.get_element_by_id("game-over") {
                if self.session.is_game_over() {
                    let _ = el.set_attribute("class", "");
                    if let Some(score_el) = self.document.get_element_by_id("final-score") {
                        score_el.set_text_content(Some(&score));
                    }
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }

        /// Throw the board away and deal a new one
        fn restart(&mut self, seed: u64) {
            self.session = Session::new(&self.settings, seed);
            self.last_time = 0.0;
            log::info!("Game restarted with seed: {}", self.session.seed());
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Match Connect starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let settings =
            Settings::from_json_or_default(canvas.get_attribute("data-settings").as_deref());

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let seed = Game::new_seed();
        let session = Session::new(&settings, seed);

        // Board plus margin on every side, in CSS pixels
        let side = session.layout().board_extent() + 2.0 * BOARD_MARGIN;
        let dpr = window.device_pixel_ratio();
        canvas.set_width((side as f64 * dpr) as u32);
        canvas.set_height((side as f64 * dpr) as u32);
        let style = canvas.style();
        style.set_property("width", &format!("{side}px"))?;
        style.set_property("height", &format!("{side}px"))?;
        ctx.scale(dpr, dpr)?;

        let mut renderer = Canvas2dRenderer::new(ctx, Vec2::splat(BOARD_MARGIN));
        if let Some(base) = canvas.get_attribute("data-sprites") {
            renderer.load_sprites(&base, settings.colors)?;
        }

        let audio = AudioManager::new(settings.effective_sfx_volume());

        let game = Rc::new(RefCell::new(Game {
            session,
            settings,
            renderer,
            audio,
            document: document.clone(),
            canvas_size: (side as f64, side as f64),
            last_time: 0.0,
        }));

        setup_input_handlers(&canvas, game.clone());
        setup_restart_button(&document, game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game)?;

        log::info!("Match Connect running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            game.borrow_mut().on_mouse_down(&event);
        });
        let _ = canvas
            .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        window.request_animation_frame(closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt_ms = if g.last_time > 0.0 {
                (time - g.last_time) as f32
            } else {
                0.0
            };
            g.last_time = time;

            g.update(dt_ms);
            g.render();
            g.update_hud();
        }

        if let Err(e) = request_animation_frame(game) {
            log::error!("Game loop stopped: {:?}", e);
        }
    }

    fn setup_restart_button(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(btn) = document.get_element_by_id("restart-btn") else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            game.borrow_mut().restart(Game::new_seed());
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().inspect_err(|e| log::error!("Startup failed: {:?}", e))
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Match Connect (native) starting...");
    log::info!("The playable game is the web build - run with `trunk serve`");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(1);
    autoplay::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless demo: keep playing the first legal swap until the board locks up
#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use match_connect::settings::Settings;
    use match_connect::sim::{Session, find_move};

    const FRAME_MS: f32 = 16.0;
    const MAX_TURNS: u32 = 500;
    const MAX_FRAMES_PER_TURN: u32 = 100_000;

    fn settle(session: &mut Session) -> bool {
        for _ in 0..MAX_FRAMES_PER_TURN {
            if !session.is_processing() {
                return true;
            }
            session.tick(FRAME_MS);
        }
        false
    }

    pub fn run(seed: u64) {
        let settings = Settings::default();
        let mut session = Session::new(&settings, seed);
        let mut turns = 0;

        while turns < MAX_TURNS {
            if !settle(&mut session) {
                log::error!("Board never settled on turn {}", turns);
                break;
            }
            if session.is_game_over() {
                break;
            }
            let Some((a, b)) = find_move(session.grid()) else {
                break;
            };
            log::debug!("Turn {}: {} <-> {}", turns + 1, a, b);
            session.click(a);
            session.click(b);
            turns += 1;
            for event in session.drain_events() {
                log::trace!("{:?}", event);
            }
        }

        println!("{}", session.grid());
        println!(
            "seed {}: {} turns, score {}, game over: {}",
            session.seed(),
            turns,
            session.score(),
            session.is_game_over()
        );
    }
}
