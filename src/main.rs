//! Shoot Your Shot entry point
//!
//! On the web this wires the canvas, the pointer and the frame clock to the
//! scene director and hands effects to the page. Natively it runs a scripted
//! headless playthrough and logs what would be presented.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use shoot_your_shot::audio::AudioManager;
    use shoot_your_shot::consts::SIM_DT;
    use shoot_your_shot::scene::{AssetEvent, AssetManifest};
    use shoot_your_shot::{Effect, PointerEvent, SceneDirector, Settings};

    // Drawing and asset fetching belong to the page script
    #[wasm_bindgen(inline_js = "
        export function present_effects(json) {
            const host = window.shootYourShot;
            if (host && host.present) {
                host.present(JSON.parse(json));
            }
        }

        export function load_assets(json) {
            const host = window.shootYourShot;
            if (host && host.load) {
                host.load(JSON.parse(json));
            } else {
                console.error('window.shootYourShot.load is missing');
            }
        }
    ")]
    extern "C" {
        fn present_effects(json: &str);
        fn load_assets(json: &str);
    }

    thread_local! {
        static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
    }

    struct Game {
        director: SceneDirector,
        audio: AudioManager,
        manifest: AssetManifest,
        last_time: f64,
    }

    impl Game {
        fn new(settings: Settings, seed: u64) -> Self {
            Self {
                audio: AudioManager::new(&settings),
                director: SceneDirector::new(settings, seed),
                manifest: AssetManifest::default(),
                last_time: 0.0,
            }
        }

        fn asset(&mut self, event: AssetEvent) {
            if let Err(e) = self.director.notify_assets(event) {
                log::error!("{}", e);
            }
            self.present();
        }

        /// Run simulation ticks
        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            self.last_time = time;

            if let Err(e) = self.director.frame(dt) {
                log::error!("Frame failed: {}", e);
            }
            self.present();
        }

        /// Audio effects play here, the rest go to the page
        fn present(&mut self) {
            let effects = self.director.drain_effects();
            if effects.is_empty() {
                return;
            }

            let mut visual = Vec::with_capacity(effects.len());
            for effect in effects {
                match effect {
                    Effect::ResumeAudio => self.audio.resume(),
                    Effect::PlayMusic { key, volume, looped } => {
                        match self.manifest.assets.iter().find(|a| a.key == key) {
                            Some(asset) => self.audio.play_music(&asset.path, volume, looped),
                            None => log::warn!("No music asset `{}`", key),
                        }
                    }
                    Effect::Sound(sound) => self.audio.play(sound),
                    other => visual.push(other),
                }
            }

            match serde_json::to_string(&visual) {
                Ok(json) => present_effects(&json),
                Err(e) => log::error!("Could not serialize effects: {}", e),
            }
        }
    }

    fn with_game(f: impl FnOnce(&mut Game)) {
        GAME.with(|slot| {
            if let Some(game) = slot.borrow().as_ref() {
                f(&mut game.borrow_mut());
            }
        });
    }

    /// Asset loader progress, 0..=1
    #[wasm_bindgen]
    pub fn asset_progress(progress: f32) {
        with_game(|g| g.asset(AssetEvent::Progress(progress)));
    }

    #[wasm_bindgen]
    pub fn asset_complete() {
        with_game(|g| g.asset(AssetEvent::Complete));
    }

    #[wasm_bindgen]
    pub fn asset_failed(key: String, reason: String) {
        with_game(|g| g.asset(AssetEvent::Failed { key, reason }));
    }

    /// Settings come from the canvas `data-settings` attribute
    fn read_settings(canvas: &HtmlCanvasElement) -> Settings {
        let Some(json) = canvas.get_attribute("data-settings") else {
            return Settings::default();
        };
        match Settings::from_json(&json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring data-settings: {}", e);
                Settings::default()
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Shoot Your Shot starting...");

        let Some(window) = web_sys::window() else {
            log::error!("no window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("no document");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("no canvas");
            return;
        };

        let mut settings = read_settings(&canvas);
        let client_w = canvas.client_width() as f32;
        let client_h = canvas.client_height() as f32;
        if client_w > 0.0 && client_h > 0.0 {
            settings.viewport_width = client_w;
            settings.viewport_height = client_h;
        }

        let seed = settings.seed.unwrap_or(js_sys::Date::now() as u64);
        let game = Rc::new(RefCell::new(Game::new(settings, seed)));
        GAME.with(|slot| *slot.borrow_mut() = Some(game.clone()));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, game.clone());
        setup_resize(&canvas, game.clone());

        let manifest = game.borrow().manifest.clone();
        match serde_json::to_string(&manifest) {
            Ok(json) => load_assets(&json),
            Err(e) => log::error!("Could not serialize manifest: {}", e),
        }
        game.borrow_mut().present();

        request_animation_frame(game);
        log::info!("Shoot Your Shot running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let listen = |name: &str, make: fn(f32, f32) -> PointerEvent| {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::PointerEvent| {
                event.prevent_default();
                let x = event.offset_x() as f32;
                let y = event.offset_y() as f32;
                game.borrow_mut().director.push_input(make(x, y));
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        };

        listen("pointerdown", |x, y| PointerEvent::Down { x, y });
        listen("pointermove", |x, y| PointerEvent::Move { x, y });
        listen("pointerup", |x, y| PointerEvent::Up { x, y });
    }

    fn setup_resize(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let w = canvas.client_width() as f32;
            let h = canvas.client_height() as f32;
            game.borrow_mut().director.resize(w, h);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
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
        game.borrow_mut().update(time);
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
    log::info!("Shoot Your Shot (native) starting...");
    log::info!("Native mode runs a headless scripted round - run with `trunk serve` to play");

    let settings = match std::env::args().nth(1) {
        Some(path) => match demo::load_settings(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => shoot_your_shot::Settings::default(),
    };

    let seed = settings.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    });

    if let Err(e) = demo::run(settings, seed) {
        log::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::Vec2;
    use thiserror::Error;

    use shoot_your_shot::consts::SIM_DT;
    use shoot_your_shot::scene::AssetEvent;
    use shoot_your_shot::sim::{ChallengeState, RoundResult, TargetId};
    use shoot_your_shot::{Effect, PointerEvent, SceneDirector, SceneError, SceneId, Settings, SettingsError};

    #[derive(Debug, Error)]
    pub enum DemoError {
        #[error("could not read settings file `{path}`: {source}")]
        Io {
            path: String,
            source: std::io::Error,
        },
        #[error(transparent)]
        Settings(#[from] SettingsError),
        #[error(transparent)]
        Scene(#[from] SceneError),
    }

    pub fn load_settings(path: &str) -> Result<Settings, DemoError> {
        let json = std::fs::read_to_string(path).map_err(|source| DemoError::Io {
            path: path.to_string(),
            source,
        })?;
        Ok(Settings::from_json(&json)?)
    }

    /// Drag pointer that lands the arrow on `target` after `t` seconds
    fn aim_for(state: &ChallengeState, target: Vec2, t: f32, fire_multiplier: f32) -> Vec2 {
        let from = state.aim.launch();
        let disp = target - from;
        let vel = Vec2::new(disp.x / t, (disp.y - 0.5 * state.gravity * t * t) / t);
        from + vel / fire_multiplier
    }

    fn shoot(director: &mut SceneDirector, target: TargetId) {
        let Some(main) = director.main_challenge() else {
            return;
        };
        let state = main.state();
        let p = aim_for(state, state.target(target).pos, 0.5, director.settings().fire_multiplier);
        log::info!("Shooting at {} via pointer ({:.0}, {:.0})", target.label(), p.x, p.y);
        for event in [
            PointerEvent::Down { x: p.x, y: p.y },
            PointerEvent::Move { x: p.x, y: p.y },
            PointerEvent::Up { x: p.x, y: p.y },
        ] {
            director.push_input(event);
        }
    }

    fn log_effects(director: &mut SceneDirector) {
        for effect in director.drain_effects() {
            match &effect {
                Effect::ShowText { text, .. } => log::info!("  text: {}", text.replace('\n', " ")),
                Effect::Sound(sound) => log::info!("  sound: {:?}", sound),
                Effect::SetFace(face) => log::info!("  face: {}", face.texture()),
                _ => log::debug!("  {:?}", effect),
            }
        }
    }

    fn run_for(director: &mut SceneDirector, secs: f32, mut each: impl FnMut(&mut SceneDirector) -> bool) -> Result<(), DemoError> {
        let frames = (secs / SIM_DT) as u32;
        for _ in 0..frames {
            director.frame(SIM_DT)?;
            log_effects(director);
            if each(director) {
                break;
            }
        }
        Ok(())
    }

    /// Preload, NO, catch hearts in the evasion challenge, then YES
    pub fn run(settings: Settings, seed: u64) -> Result<(), DemoError> {
        log::info!("Seed: {}", seed);
        let mut director = SceneDirector::new(settings, seed);

        director.notify_assets(AssetEvent::Progress(0.5))?;
        director.notify_assets(AssetEvent::Complete)?;
        director.push_input(PointerEvent::Down { x: 0.0, y: 0.0 });
        run_for(&mut director, 1.0, |_| false)?;

        shoot(&mut director, TargetId::No);
        run_for(&mut director, 2.0, |d| d.active_id() != SceneId::MainChallenge)?;

        if director.active_id() == SceneId::EvasionChallenge {
            // Stand under the lowest heart
            run_for(&mut director, 35.0, |d| {
                let Some(scene) = d.evasion() else {
                    return true;
                };
                let lowest = scene
                    .world()
                    .hearts
                    .iter()
                    .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                    .map(|h| h.pos.x);
                if let Some(x) = lowest {
                    d.push_input(PointerEvent::Move { x, y: 0.0 });
                }
                false
            })?;
        }

        let Some(main) = director.main_challenge() else {
            log::warn!("Ended in {:?}", director.active_id());
            return Ok(());
        };
        if main.state().result == RoundResult::NoConfirmed {
            log::info!("The NO stands");
            return Ok(());
        }

        shoot(&mut director, TargetId::Yes);
        run_for(&mut director, 3.0, |_| false)?;
        let result = director.main_challenge().map(|m| m.state().result);
        log::info!("Final result: {:?} after {} scene switches", result, director.transitions());
        Ok(())
    }
}
