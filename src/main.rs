//! Reflex Arcade entry point
//!
//! On the web this wires one of the three games to the page. Natively it plays
//! a short scripted session of each game headlessly and logs the outcome.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, MouseEvent, Window};

    use reflex_arcade::sim::{Bounds, ObjectId, ObjectKind, Outcome, Position};
    use reflex_arcade::{
        DifficultyPreset, GameConfig, GameEngine, GameKind, InitError, Presenter, Removal,
        RunState, Tone,
    };

    /// Delay before a resolved visual is detached, so its CSS animation can play
    const REMOVE_DELAY_MS: i32 = 240;
    /// Minimum playfield height under the HUD
    const MIN_PLAYFIELD_HEIGHT: f64 = 260.0;

    /// DOM-backed presenter
    struct DomView {
        window: Window,
        document: Document,
        kind: GameKind,
        /// Playfield (balloon/bounce) or grid (tiles)
        field: HtmlElement,
        hud: Option<HtmlElement>,
        score: Element,
        status: Option<HtmlElement>,
        start_btn: HtmlButtonElement,
        pause_btn: HtmlButtonElement,
        reset_btn: HtmlButtonElement,
        /// Grid buttons, by cell index
        cells: Vec<Element>,
        /// Live visuals by object id (balloons, balls, or the occupied cell)
        visuals: HashMap<ObjectId, Element>,
    }

    fn require(
        document: &Document,
        selector: &'static str,
        game: &'static str,
    ) -> Result<Element, InitError> {
        document
            .query_selector(selector)
            .ok()
            .flatten()
            .ok_or(InitError::MissingElement {
                game,
                element: selector,
            })
    }

    fn require_as<T: JsCast>(
        document: &Document,
        selector: &'static str,
        game: &'static str,
    ) -> Result<T, InitError> {
        require(document, selector, game)?
            .dyn_into::<T>()
            .map_err(|_| InitError::MissingElement {
                game,
                element: selector,
            })
    }

    impl DomView {
        fn new(window: Window, document: Document, kind: GameKind) -> Result<Self, InitError> {
            let game = kind.title();
            let (field, score, status, hud) = match kind {
                GameKind::Tiles => (
                    require_as::<HtmlElement>(&document, "#grid", game)?,
                    require(&document, "#score", game)?,
                    Some(require_as::<HtmlElement>(&document, "#status", game)?),
                    None,
                ),
                GameKind::Balloon | GameKind::Bounce => (
                    require_as::<HtmlElement>(&document, "#playfield", game)?,
                    require(&document, "#scoreValue", game)?,
                    None,
                    Some(require_as::<HtmlElement>(&document, ".hud", game)?),
                ),
            };
            let start_btn = require_as::<HtmlButtonElement>(&document, "#startBtn", game)?;
            let pause_btn = require_as::<HtmlButtonElement>(&document, "#pauseBtn", game)?;
            let reset_btn = require_as::<HtmlButtonElement>(&document, "#resetBtn", game)?;

            let view = Self {
                window,
                document,
                kind,
                field,
                hud,
                score,
                status,
                start_btn,
                pause_btn,
                reset_btn,
                cells: Vec::new(),
                visuals: HashMap::new(),
            };
            view.update_layout();
            Ok(view)
        }

        /// Build the tile grid (tiles game only)
        fn build_grid(&mut self, cells: usize) -> Result<(), InitError> {
            for cell in 0..cells {
                let button = self
                    .document
                    .create_element("button")
                    .map_err(|_| InitError::NoHost("cannot create grid cells"))?;
                button.set_class_name("tile");
                let _ = button.set_attribute("type", "button");
                let _ = button.set_attribute("data-state", "idle");
                let _ = button.set_attribute("data-cell", &cell.to_string());
                let _ = self.field.append_child(&button);
                self.cells.push(button);
            }
            Ok(())
        }

        /// Size the playfield to the window below the HUD
        fn update_layout(&self) {
            let Some(hud) = &self.hud else {
                return;
            };
            let width = self.window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            let height = self.window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            let hud_height = hud.offset_height() as f64;
            let field_height = (height - hud_height).max(MIN_PLAYFIELD_HEIGHT);

            if let Some(root) = self
                .document
                .document_element()
                .and_then(|e| e.dyn_into::<HtmlElement>().ok())
            {
                let style = root.style();
                let _ = style.set_property("--hud-height", &format!("{hud_height}px"));
                let _ = style.set_property("--playfield-width", &format!("{width}px"));
                let _ = style.set_property("--playfield-height", &format!("{field_height}px"));
            }
        }

        fn place(&self, element: &Element, position: Position) {
            let Position::Point(pos) = position else {
                return;
            };
            let Ok(element) = element.clone().dyn_into::<HtmlElement>() else {
                return;
            };
            let style = element.style();
            match self.kind {
                GameKind::Bounce => {
                    let _ = style.set_property(
                        "transform",
                        &format!("translate({}px, {}px)", pos.x, pos.y),
                    );
                }
                _ => {
                    let _ = style.set_property("left", &format!("{}px", pos.x));
                    let _ = style.set_property("top", &format!("{}px", pos.y));
                }
            }
        }

        fn highlight_difficulty(&self, preset: DifficultyPreset) {
            let Ok(buttons) = self.document.query_selector_all(".difficulty-btn") else {
                return;
            };
            for i in 0..buttons.length() {
                let Some(button) = buttons.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                    continue;
                };
                let active = button.get_attribute("data-difficulty").as_deref() == Some(preset.as_str());
                let _ = button.class_list().toggle_with_force("is-active", active);
                let _ = button.set_attribute("aria-pressed", if active { "true" } else { "false" });
                if let Ok(button) = button.dyn_into::<HtmlButtonElement>() {
                    button.set_disabled(active);
                }
            }
        }
    }

    impl Presenter for DomView {
        fn render_object_at(&mut self, id: ObjectId, kind: ObjectKind, position: Position) {
            let element = match position {
                Position::Cell(cell) => {
                    let Some(tile) = self.cells.get(cell).cloned() else {
                        return;
                    };
                    let _ = tile.set_attribute("data-state", kind.as_str());
                    let class = if kind == ObjectKind::Blue { "active-blue" } else { "active-red" };
                    let _ = tile.class_list().add_1(class);
                    tile
                }
                Position::Point(_) => {
                    let tag = if kind == ObjectKind::Balloon { "button" } else { "div" };
                    let Ok(element) = self.document.create_element(tag) else {
                        return;
                    };
                    element.set_class_name(kind.as_str());
                    if kind == ObjectKind::Balloon {
                        let _ = element.set_attribute("type", "button");
                        let _ = element.set_attribute("aria-label", "Pop balloon");
                    }
                    let _ = self.field.append_child(&element);
                    self.place(&element, position);
                    element
                }
            };
            let _ = element.set_attribute("data-id", &id.0.to_string());
            self.visuals.insert(id, element);
        }

        fn move_object_visual(&mut self, id: ObjectId, position: Position) {
            if let Some(element) = self.visuals.get(&id) {
                self.place(element, position);
            }
        }

        fn remove_object_visual(&mut self, id: ObjectId, removal: Removal) {
            let Some(element) = self.visuals.remove(&id) else {
                return;
            };
            if self.kind == GameKind::Tiles {
                let _ = element.set_attribute("data-state", "idle");
                let _ = element.remove_attribute("data-id");
                let _ = element.class_list().remove_2("active-red", "active-blue");
                return;
            }
            let class = match removal {
                Removal::Resolved(Outcome::Hit) if self.kind == GameKind::Bounce => "ball-pop",
                Removal::Resolved(Outcome::Hit) => "pop",
                Removal::Resolved(_) => "miss",
                Removal::Cleared => {
                    element.remove();
                    return;
                }
            };
            let _ = element.class_list().add_1(class);
            let _ = element.remove_attribute("data-id");
            let detach = Closure::once_into_js(move || element.remove());
            let _ = self
                .window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    detach.unchecked_ref(),
                    REMOVE_DELAY_MS,
                );
        }

        fn update_score_display(&mut self, score: i64, delta: i64) {
            self.score.set_text_content(Some(&score.to_string()));
            let classes = self.score.class_list();
            let _ = classes.remove_2("score-gain", "score-loss");
            if delta > 0 {
                let _ = classes.add_1("score-gain");
            } else if delta < 0 {
                let _ = classes.add_1("score-loss");
            }
        }

        fn set_status_message(&mut self, text: &str, tone: Tone) {
            let Some(status) = &self.status else {
                return;
            };
            status.set_text_content(Some(text));
            let color = match tone {
                Tone::Positive => "#2cb1bc",
                Tone::Negative => "#ef4565",
                Tone::Neutral => "var(--neutral)",
            };
            let _ = status.style().set_property("color", color);
        }

        fn set_run_state(&mut self, state: RunState) {
            let (start, pause, reset, label) = match state {
                RunState::Stopped => (true, false, self.kind != GameKind::Bounce, "Pause"),
                RunState::Running => (false, true, true, "Pause"),
                RunState::Paused => (false, true, true, "Resume"),
            };
            self.start_btn.set_disabled(!start);
            self.pause_btn.set_disabled(!pause);
            self.reset_btn.set_disabled(!reset);
            self.pause_btn.set_text_content(Some(label));
            let classes = self.pause_btn.class_list();
            let resume = state == RunState::Paused;
            let _ = classes.toggle_with_force("control-btn--resume", resume);
            let _ = classes.toggle_with_force("control-btn--pause", !resume);
        }

        fn playfield_bounds(&self) -> Bounds {
            let rect = self.field.get_bounding_client_rect();
            Bounds::new(rect.width() as f32, rect.height() as f32)
        }
    }

    /// Engine plus its view, shared by every listener
    struct Host {
        engine: GameEngine,
        view: DomView,
    }

    type Shared = Rc<RefCell<Host>>;

    fn with_host(host: &Shared, f: impl FnOnce(&mut GameEngine, &mut DomView)) {
        let mut guard = host.borrow_mut();
        let Host { engine, view } = &mut *guard;
        f(engine, view);
    }

    fn on_click(target: &Element, host: Shared, f: impl Fn(&mut GameEngine, &mut DomView) + 'static) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            with_host(&host, |engine, view| f(engine, view));
        });
        let _ = target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Pick the game and its configuration from `<body data-game=... data-config=...>`
    fn load_config(document: &Document) -> Result<GameConfig, InitError> {
        let body = document.body().ok_or(InitError::NoHost("no <body>"))?;
        let config = match body.get_attribute("data-config") {
            Some(json) => GameConfig::from_json(&json)?,
            None => {
                let name = body.get_attribute("data-game").unwrap_or_else(|| "tiles".into());
                let kind = GameKind::from_str(&name).ok_or(InitError::UnknownGame(name))?;
                GameConfig::for_kind(kind)
            }
        };
        Ok(match config.seed {
            Some(_) => config,
            None => config.with_seed(js_sys::Date::now() as u64),
        })
    }

    pub fn run() -> Result<(), InitError> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        let window = web_sys::window().ok_or(InitError::NoHost("no window"))?;
        let document = window.document().ok_or(InitError::NoHost("no document"))?;

        let config = load_config(&document)?;
        let kind = config.kind();
        log::info!("{} starting...", kind.title());

        let mut view = DomView::new(window.clone(), document.clone(), kind)?;
        if let reflex_arcade::Variant::Tiles(t) = config.variant {
            view.build_grid(t.cell_count())?;
            view.highlight_difficulty(config.preset);
        }

        let mut engine = GameEngine::new(config);
        engine.reset(&mut view);
        let host: Shared = Rc::new(RefCell::new(Host { engine, view }));

        setup_controls(&document, host.clone())?;
        setup_object_clicks(host.clone());
        setup_page_events(&window, &document, host.clone());
        request_animation_frame(host);

        log::info!("{} ready", kind.title());
        Ok(())
    }

    fn setup_controls(document: &Document, host: Shared) -> Result<(), InitError> {
        let (start, pause, reset) = {
            let h = host.borrow();
            (
                h.view.start_btn.clone(),
                h.view.pause_btn.clone(),
                h.view.reset_btn.clone(),
            )
        };
        on_click(&start, host.clone(), |engine, view| engine.start(view));
        on_click(&pause, host.clone(), |engine, view| engine.toggle_pause(view));
        on_click(&reset, host.clone(), |engine, view| engine.reset(view));

        let Ok(buttons) = document.query_selector_all(".difficulty-btn") else {
            return Ok(());
        };
        for i in 0..buttons.length() {
            let Some(button) = buttons.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let Some(preset) = button
                .get_attribute("data-difficulty")
                .and_then(|d| DifficultyPreset::from_str(&d))
            else {
                continue;
            };
            on_click(&button, host.clone(), move |engine, view| {
                engine.on_difficulty_changed(preset, view);
                view.highlight_difficulty(engine.preset());
            });
        }
        Ok(())
    }

    /// One delegated listener on the playfield resolves clicks to objects or cells
    fn setup_object_clicks(host: Shared) {
        let field = host.borrow().view.field.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let cell = target
                .closest("[data-cell]")
                .ok()
                .flatten()
                .and_then(|e| e.get_attribute("data-cell"))
                .and_then(|c| c.parse::<usize>().ok());
            let id = target
                .closest("[data-id]")
                .ok()
                .flatten()
                .and_then(|e| e.get_attribute("data-id"))
                .and_then(|c| c.parse::<u32>().ok())
                .map(ObjectId);

            with_host(&host, |engine, view| match (cell, id) {
                (Some(cell), _) => engine.on_cell_interacted(cell, view),
                (None, Some(id)) => engine.on_object_interacted(id, view),
                (None, None) => {}
            });
        });
        let _ = field.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_page_events(window: &Window, document: &Document, host: Shared) {
        // Auto-pause when the tab is hidden
        {
            let host = host.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    with_host(&host, |engine, view| engine.on_visibility_hidden(view));
                }
            });
            let _ = document
                .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                with_host(&host, |engine, view| {
                    view.update_layout();
                    engine.on_resize(view);
                });
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(host: Shared) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(host, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Timers and motion both run off the animation clock
    fn game_loop(host: Shared, time: f64) {
        with_host(&host, |engine, view| {
            engine.advance(time.max(0.0) as u64, view);
            engine.frame(time, view);
        });
        request_animation_frame(host);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().map_err(|e| {
        log::error!("{e}");
        JsValue::from_str(&e.to_string())
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Reflex Arcade (native) starting...");
    log::info!("Native mode is headless - build for wasm32 to play in the browser");

    for kind in [GameKind::Balloon, GameKind::Bounce, GameKind::Tiles] {
        let summary = demo::play(kind, 42);
        println!("{summary}");
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
use reflex_arcade::GameKind;

/// Scripted headless session
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use reflex_arcade::sim::Bounds;
    use reflex_arcade::view::ViewCall;
    use reflex_arcade::{GameConfig, GameEngine, GameKind, RecordingPresenter};

    /// Frame period of the simulated host (ms)
    const FRAME_MS: u64 = 16;
    const SESSION_MS: u64 = 20_000;
    /// The scripted player reacts to an object after this long
    const REACTION_MS: u64 = 350;

    pub fn play(kind: GameKind, seed: u64) -> String {
        let mut view = RecordingPresenter::new(Bounds::new(960.0, 640.0));
        let mut engine = GameEngine::new(GameConfig::for_kind(kind).with_seed(seed));
        engine.start(&mut view);

        let mut seen = std::collections::BTreeMap::new();
        let mut clicks = 0u32;
        let mut now = 0;
        while now < SESSION_MS {
            now += FRAME_MS;
            engine.advance(now, &mut view);
            engine.frame(now as f64, &mut view);

            // Click every other object once it has been up long enough
            for id in engine.objects().ids() {
                let born = *seen.entry(id).or_insert(now);
                if now - born >= REACTION_MS && id.0 % 2 == 0 {
                    engine.on_object_interacted(id, &mut view);
                    clicks += 1;
                }
            }
            if now == SESSION_MS / 2 {
                engine.pause(&mut view);
                engine.resume(&mut view);
            }
        }

        let spawned = view
            .calls
            .iter()
            .filter(|c| matches!(c, ViewCall::Render(..)))
            .count();
        log::info!("{} session finished at stage {}", kind.title(), engine.stage());
        format!(
            "{:<14} score {:>4}  spawned {:>3}  clicks {:>3}  live {:>2}",
            kind.title(),
            engine.score(),
            spawned,
            clicks,
            engine.objects().len()
        )
    }
}
