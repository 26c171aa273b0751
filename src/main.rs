//! Deep Dodge entry point
//!
//! Browser: wires DOM input, the AI proxy, the vision shim and the renderer
//! to the simulation. Native: runs a headless session on the backup level.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::ops::ControlFlow;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        DeviceOrientationEvent, Document, HtmlCanvasElement, HtmlSelectElement, KeyboardEvent,
        PointerEvent, TouchEvent,
    };

    use deep_dodge::Settings;
    use deep_dodge::face::{Analysis, FacePanel, FacePresence, FaceStatus};
    use deep_dodge::platform::frame_loop::AnimationFrameScheduler;
    use deep_dodge::platform::http::HttpService;
    use deep_dodge::platform::time::PerformanceClock;
    use deep_dodge::platform::{
        Clock, FrameLoop, InputSignal, pointer_to_normalized, tilt_to_normalized,
    };
    use deep_dodge::renderer::{RenderState, shapes};
    use deep_dodge::services::{
        ScoreBand, SimilarityResult, request_commentary, request_level, request_similarity,
    };
    use deep_dodge::sim::{Difficulty, GameEvent, GamePhase, Session};
    use deep_dodge::tuning::TuningError;

    type GameLoop = Rc<FrameLoop<AnimationFrameScheduler>>;

    // Vision collaborator: the page loads the face model and camera and
    // exposes them as `window.faceMatch`
    #[wasm_bindgen(inline_js = "
        export function face_ready() {
            const f = window.faceMatch;
            return !!(f && f.ready);
        }

        export function face_error() {
            const f = window.faceMatch;
            return f && f.error ? String(f.error) : null;
        }

        export function face_count() {
            const f = window.faceMatch;
            return f && f.ready ? (f.faceCount() | 0) : 0;
        }

        export function face_capture() {
            const f = window.faceMatch;
            return f && f.ready ? (f.capture() || null) : null;
        }
    ")]
    extern "C" {
        fn face_ready() -> bool;
        fn face_error() -> Option<String>;
        fn face_count() -> u32;
        fn face_capture() -> Option<String>;
    }

    /// Game instance holding all state
    struct Game {
        session: Session,
        settings: Settings,
        render_state: Option<RenderState>,
        services: HttpService,
        clock: PerformanceClock,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(settings: Settings) -> Result<Self, TuningError> {
            Ok(Self {
                session: Session::new(settings.tuning.clone())?,
                services: HttpService::new(settings.service_endpoint.as_deref()),
                settings,
                render_state: None,
                clock: PerformanceClock::new(),
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            })
        }

        fn track_fps(&mut self, time: f64) {
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let vertices = shapes::scene(&self.session, self.settings.show_hitboxes);
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&vertices) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Per-frame HUD values
        fn update_hud(&self, document: &Document) {
            let elapsed = self.session.elapsed_ms(self.clock.now_ms());
            set_text(document, "#hud-time .hud-value", &format!("{:.1}", elapsed / 1000.0));
            if self.settings.show_fps {
                set_text(document, "#hud-fps .hud-value", &self.fps.to_string());
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = if visible {
                el.class_list().remove_1("hidden")
            } else {
                el.class_list().add_1("hidden")
            };
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Deep Dodge starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        set_visible(&document, "loading", false);

        let settings = Settings::load();
        let game = match Game::new(settings) {
            Ok(game) => Rc::new(RefCell::new(game)),
            Err(e) => {
                log::error!("Invalid tuning: {}", e);
                return;
            }
        };
        let input = InputSignal::default();

        match document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        {
            Some(canvas) => {
                init_renderer(&window, &canvas, &game).await;
                setup_input_handlers(&canvas, &input);
            }
            None => log::error!("No #canvas element, rendering disabled"),
        }
        setup_tilt_handler(&input);

        let game_loop = create_game_loop(game.clone(), input.clone());
        setup_controls(game.clone(), game_loop.clone());
        sync_difficulty_select(&game.borrow().settings);

        start_face_loop(game.borrow().services.clone());

        game.borrow_mut().render();
        show_phase(&game.borrow(), &document);

        // First level is requested right away
        request_new_level(game.clone());

        log::info!("Deep Dodge running!");
    }

    async fn init_renderer(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        game: &Rc<RefCell<Game>>,
    ) {
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let field = {
            let g = game.borrow();
            let tuning = g.session.tuning();
            glam::Vec2::new(tuning.field_width, tuning.field_height)
        };
        match RenderState::new(surface, &adapter, width, height, field).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("Renderer unavailable: {}", e),
        }
    }

    /// Input callbacks only write the signal
    fn setup_input_handlers(canvas: &HtmlCanvasElement, input: &InputSignal) {
        // Mouse / pen / touch pointer
        {
            let input = input.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let rect = canvas_clone.get_bounding_client_rect();
                if let Some(value) =
                    pointer_to_normalized(event.client_y() as f64, rect.top(), rect.height())
                {
                    input.set(value);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch drag (keeps the page from scrolling)
        {
            let input = input.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    if let Some(value) =
                        pointer_to_normalized(touch.client_y() as f64, rect.top(), rect.height())
                    {
                        input.set(value);
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_tilt_handler(input: &InputSignal) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let input = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: DeviceOrientationEvent| {
            if let Some(value) = event.beta().and_then(tilt_to_normalized) {
                input.set(value);
            }
        });
        let _ = window
            .add_event_listener_with_callback("deviceorientation", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Game loop: runs only while the session is playing
    fn create_game_loop(game: Rc<RefCell<Game>>, input: InputSignal) -> GameLoop {
        Rc::new(FrameLoop::new("game", AnimationFrameScheduler, move |time| {
            let events = {
                let mut g = game.borrow_mut();
                let now = g.clock.now_ms();
                g.session.tick(input.get(), now);
                g.track_fps(time);
                g.render();
                if let Some(document) = document() {
                    g.update_hud(&document);
                }
                g.session.drain_events()
            };
            handle_events(&game, events);

            if game.borrow().session.phase() == GamePhase::Playing {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        }))
    }

    /// Push session notifications to the DOM
    fn handle_events(game: &Rc<RefCell<Game>>, events: Vec<GameEvent>) {
        let Some(document) = document() else {
            return;
        };
        for event in events {
            match event {
                GameEvent::ScoreChanged(score) => {
                    set_text(&document, "#hud-score .hud-value", &score.to_string());
                }
                GameEvent::PhaseChanged(phase) => {
                    show_phase(&game.borrow(), &document);
                    if phase.is_finished() {
                        request_run_commentary(game.clone(), phase == GamePhase::Victory);
                    }
                }
                GameEvent::ObstacleSpawned { id } => log::debug!("Obstacle {} entered", id),
                GameEvent::ObstacleCleared { id } => log::debug!("Obstacle {} cleared", id),
            }
        }
    }

    /// Overlay visibility follows the phase
    fn show_phase(game: &Game, document: &Document) {
        let phase = game.session.phase();
        set_visible(document, "loading-overlay", phase == GamePhase::LoadingLevel);
        set_visible(document, "start-prompt", phase == GamePhase::WaitingToStart);
        set_visible(document, "result", phase.is_finished());
        set_visible(document, "hud", phase == GamePhase::Playing);

        if let Some(level) = game.session.level() {
            set_text(document, "#level-name", &level.name);
            set_text(document, "#level-description", &level.description);
            set_text(document, "#level-difficulty", &level.difficulty);
            let length_ms = level.duration_ms().max(game.session.tuning().win_floor_ms);
            set_text(document, "#level-length", &format!("{:.0}s", length_ms / 1000.0));
        }
        if phase.is_finished() {
            let title = if phase == GamePhase::Victory {
                "MISSION ACCOMPLISHED"
            } else {
                "HULL BREACH"
            };
            set_text(document, "#result-title", title);
            set_text(document, "#result-score", &game.session.score().to_string());
            set_text(document, "#result-comment", "...");
        }
    }

    fn request_new_level(game: Rc<RefCell<Game>>) {
        let (services, difficulty) = {
            let mut g = game.borrow_mut();
            if let Err(e) = g.session.request_level() {
                log::warn!("{}", e);
                return;
            }
            (g.services.clone(), g.settings.difficulty)
        };
        let events = game.borrow_mut().session.drain_events();
        handle_events(&game, events);

        wasm_bindgen_futures::spawn_local(async move {
            let seed = js_sys::Date::now() as u64;
            let level = request_level(&services, difficulty, seed).await;
            log::info!("Level loaded: {} ({} obstacles)", level.name, level.obstacles.len());
            let events = {
                let mut g = game.borrow_mut();
                if let Err(e) = g.session.level_received(level) {
                    log::warn!("{}", e);
                }
                g.render();
                g.session.drain_events()
            };
            handle_events(&game, events);
        });
    }

    fn start_run(game: &Rc<RefCell<Game>>, game_loop: &GameLoop) {
        let events = {
            let mut g = game.borrow_mut();
            let now = g.clock.now_ms();
            if let Err(e) = g.session.start(now) {
                log::warn!("{}", e);
                return;
            }
            g.session.drain_events()
        };
        handle_events(game, events);
        game_loop.start();
    }

    fn request_run_commentary(game: Rc<RefCell<Game>>, won: bool) {
        let (services, score) = {
            let g = game.borrow();
            (g.services.clone(), g.session.score())
        };
        wasm_bindgen_futures::spawn_local(async move {
            let text = request_commentary(&services, won, score).await;
            // A newer run may have started meanwhile
            if game.borrow().session.phase().is_finished() {
                if let Some(document) = document() {
                    set_text(&document, "#result-comment", &text);
                }
            }
        });
    }

    fn setup_controls(game: Rc<RefCell<Game>>, game_loop: GameLoop) {
        let Some(document) = document() else {
            return;
        };

        // Start button
        if let Some(btn) = document.get_element_by_id("start-btn") {
            let game = game.clone();
            let game_loop = game_loop.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                start_run(&game, &game_loop);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // New level buttons (start prompt and result screen)
        for id in ["new-level-btn", "retry-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                    request_new_level(game.clone());
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        // Difficulty picker
        if let Some(select) = document
            .get_element_by_id("difficulty")
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
        {
            let game = game.clone();
            let select_clone = select.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if let Ok(difficulty) = select_clone.value().parse::<Difficulty>() {
                    let mut g = game.borrow_mut();
                    g.settings.difficulty = difficulty;
                    g.settings.save();
                    log::info!("Difficulty: {}", difficulty.as_str());
                }
            });
            let _ =
                select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        if let Some(window) = web_sys::window() {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                match event.key().as_str() {
                    " " | "Enter" => {
                        let phase = game.borrow().session.phase();
                        match phase {
                            GamePhase::WaitingToStart => start_run(&game, &game_loop),
                            GamePhase::GameOver | GamePhase::Victory => {
                                request_new_level(game.clone())
                            }
                            _ => {}
                        }
                    }
                    "h" | "H" => {
                        let mut g = game.borrow_mut();
                        g.settings.show_hitboxes = !g.settings.show_hitboxes;
                        g.settings.save();
                        log::info!("Hitboxes: {}", g.settings.show_hitboxes);
                        g.render();
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn sync_difficulty_select(settings: &Settings) {
        if let Some(select) = document()
            .and_then(|d| d.get_element_by_id("difficulty"))
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
        {
            select.set_value(settings.difficulty.as_str());
        }
    }

    /// Face panel state, owned by the face loop
    #[derive(Default)]
    struct FaceState {
        presence: FacePresence,
        panel: FacePanel,
        analysis: Analysis,
        status: Option<FaceStatus>,
    }

    /// Face loop: runs independently of the game for the page's lifetime
    fn start_face_loop(services: HttpService) {
        let face = Rc::new(RefCell::new(FaceState::default()));
        let clock = PerformanceClock::new();

        let face_loop = FrameLoop::new("face", AnimationFrameScheduler, move |_time| {
            let Some(doc) = document() else {
                return ControlFlow::Break(());
            };
            let mut f = face.borrow_mut();

            if let Some(error) = face_error() {
                f.panel.fail(error.as_str());
                set_text(&doc, "#face-error", &error);
                set_visible(&doc, "face-error", true);
                return ControlFlow::Break(());
            }
            if !face_ready() {
                return ControlFlow::Continue(());
            }
            f.panel.mark_live();

            let frame = f.presence.observe(face_count() as usize, clock.now_ms());
            if f.status != Some(frame.status) {
                f.status = Some(frame.status);
                set_text(&doc, "#face-status", frame.status.label());
            }

            if frame.capture {
                match face_capture() {
                    Some(image) if f.analysis.begin() => {
                        show_analysis(&doc, &f.analysis);
                        let face = face.clone();
                        let services = services.clone();
                        wasm_bindgen_futures::spawn_local(async move {
                            let result = request_similarity(&services, &image).await;
                            let mut f = face.borrow_mut();
                            f.analysis.finish(result);
                            if let Some(doc) = document() {
                                show_analysis(&doc, &f.analysis);
                            }
                        });
                    }
                    Some(_) => log::debug!("Analysis in flight, capture ignored"),
                    None => log::warn!("Capture requested but no frame was available"),
                }
            }
            ControlFlow::Continue(())
        });
        face_loop.start();
        // Lives as long as the page
        std::mem::forget(face_loop);
    }

    fn show_analysis(document: &Document, analysis: &Analysis) {
        set_visible(document, "face-analyzing", analysis.is_analyzing());
        set_visible(document, "face-result", analysis.result().is_some());
        let Some(result) = analysis.result() else {
            return;
        };
        show_similarity(document, result);
    }

    fn show_similarity(document: &Document, result: &SimilarityResult) {
        set_text(document, "#face-score", &format!("{}%", result.score));
        set_text(document, "#face-comment", &result.comment);
        set_text(document, "#face-features", &result.features.join(" / "));
        if let Some(el) = document.get_element_by_id("face-result") {
            let band = match result.band() {
                ScoreBand::High => "band-high",
                ScoreBand::Medium => "band-medium",
                ScoreBand::Low => "band-low",
            };
            let classes = el.class_list();
            let _ = classes.remove_3("band-high", "band-medium", "band-low");
            let _ = classes.add_1(band);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::ops::ControlFlow;
    use std::rc::Rc;

    use deep_dodge::Settings;
    use deep_dodge::platform::frame_loop::{FrameLoop, ManualScheduler};
    use deep_dodge::platform::{Clock, ManualClock};
    use deep_dodge::services::fallback_level;
    use deep_dodge::sim::{GameEvent, GamePhase, Session};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Five minutes of frames
    const MAX_FRAMES: u32 = 60 * 300;

    /// Play the backup level with the submarine held at mid-depth
    pub fn run(seed: u64) {
        let settings = Settings::load();
        let clock = ManualClock::new(0.0);
        let session = match Session::new(settings.tuning) {
            Ok(session) => Rc::new(RefCell::new(session)),
            Err(e) => {
                log::error!("Invalid tuning: {}", e);
                return;
            }
        };

        {
            let mut s = session.borrow_mut();
            let level = fallback_level(seed);
            log::info!(
                "Level: {} ({} obstacles, seed {})",
                level.name,
                level.obstacles.len(),
                seed
            );
            let started = s
                .request_level()
                .and_then(|_| s.level_received(level))
                .and_then(|_| s.start(clock.now_ms()));
            if let Err(e) = started {
                log::error!("Could not start session: {}", e);
                return;
            }
            s.drain_events();
        }

        let scheduler = ManualScheduler::new();
        let step_session = session.clone();
        let step_clock = clock.clone();
        let game_loop = FrameLoop::new("headless", scheduler.clone(), move |_time| {
            step_clock.advance(FRAME_MS);
            let mut s = step_session.borrow_mut();
            s.tick(0.5, step_clock.now_ms());
            for event in s.drain_events() {
                match event {
                    GameEvent::ScoreChanged(score) => log::debug!("Score: {}", score),
                    GameEvent::ObstacleSpawned { id } => log::debug!("Obstacle {} entered", id),
                    GameEvent::ObstacleCleared { id } => log::debug!("Obstacle {} cleared", id),
                    GameEvent::PhaseChanged(_) => {}
                }
            }
            if s.phase() == GamePhase::Playing {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        });

        game_loop.start();
        let mut frames = 0;
        while game_loop.is_running() && frames < MAX_FRAMES {
            scheduler.fire(clock.now_ms());
            frames += 1;
        }
        game_loop.stop();

        let s = session.borrow();
        log::info!(
            "Finished: {} after {} frames ({:.1}s), score {}",
            s.phase().label(),
            frames,
            s.elapsed_ms(clock.now_ms()) / 1000.0,
            s.score()
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Deep Dodge (native) starting...");
    log::info!("Rendering requires the web build - run with `trunk serve`");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(1);
    headless::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
