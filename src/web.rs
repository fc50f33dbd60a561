//! Browser host: canvas + audio element + DOM events + animation frame loop.
//!
//! Startup is two-phase. `start_game` first sets up the canvas and awaits the
//! beatmap fetch (showing "Loading..."); only when that succeeds is a
//! [`GameSession`] built, input installed and the frame loop started. A failed
//! load leaves an error screen up and returns the error to JS.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_futures::js_sys::Promise;
use web_sys::{
    CanvasGradient, CanvasRenderingContext2d, Document, HtmlAudioElement, HtmlCanvasElement,
    KeyboardEvent, MouseEvent, Response, Window, window,
};

use crate::beatmap::Beatmap;
use crate::config::GameConfig;
use crate::error::GameError;
use crate::game::{AudioClock, GameSession};
use crate::geometry::Point2;
use crate::input::{self, KeyPhase};
use crate::render::{self, Renderer};

// --- Host collaborators ----------------------------------------------------

/// [`Renderer`] over a 2D canvas context.
pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    gradient: Option<CanvasGradient>,
}

impl CanvasRenderer {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx, gradient: None }
    }

    fn background_gradient(&mut self, size: Point2) -> &CanvasGradient {
        let ctx = &self.ctx;
        self.gradient.get_or_insert_with(|| {
            let g = ctx.create_linear_gradient(0.0, 0.0, size.x, size.y);
            g.add_color_stop(0.0, "rgba(2, 0, 36, 1)").ok();
            g.add_color_stop(0.5, "rgba(9, 9, 121, 1)").ok();
            g.add_color_stop(1.0, "rgba(0, 212, 255, 1)").ok();
            g
        })
    }
}

impl Renderer for CanvasRenderer {
    fn clear(&mut self, size: Point2) {
        self.ctx.clear_rect(0.0, 0.0, size.x, size.y);
    }

    fn fill_background(&mut self, size: Point2) {
        let gradient = self.background_gradient(size).clone();
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.fill_rect(0.0, 0.0, size.x, size.y);
    }

    fn fill_rect(&mut self, position: Point2, style: &str, size: Point2) {
        self.ctx.set_fill_style_str(style);
        self.ctx.fill_rect(position.x, position.y, size.x, size.y);
    }

    fn draw_text(&mut self, text: &str, position: Point2, font: &str) {
        self.ctx.set_fill_style_str("white");
        self.ctx.set_font(font);
        self.ctx.fill_text(text, position.x, position.y).ok();
    }
}

/// [`AudioClock`] backed by an `<audio>` element's playback position.
pub struct HtmlAudioClock {
    audio: HtmlAudioElement,
}

impl HtmlAudioClock {
    pub fn new(src: &str) -> Result<Self, GameError> {
        let audio = HtmlAudioElement::new_with_src(src)?;
        Ok(Self { audio })
    }
}

impl AudioClock for HtmlAudioClock {
    fn current_time(&self) -> f64 {
        self.audio.current_time()
    }

    fn play(&mut self) {
        match self.audio.play() {
            Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = playback_started(promise).await {
                    log::error!("{e}");
                }
            }),
            Err(e) => log::error!("audio play failed: {e:?}"),
        }
    }

    fn pause(&mut self) {
        if let Err(e) = self.audio.pause() {
            log::error!("audio pause failed: {e:?}");
        }
    }
}

/// Settle the promise returned by `HTMLMediaElement.play()`. It rejects when
/// the browser blocks playback (autoplay policy, unsupported source).
pub async fn playback_started(promise: Promise) -> Result<(), GameError> {
    JsFuture::from(promise)
        .await
        .map(|_| ())
        .map_err(|e| GameError::Host(format!("audio play rejected: {e:?}")))
}

// --- Runtime state -----------------------------------------------------------

struct Game {
    session: GameSession<HtmlAudioClock>,
    renderer: CanvasRenderer,
}

thread_local! {
    static GAME: RefCell<Option<Game>> = const { RefCell::new(None) };
}

/// Run `f` against the live game, if one is installed.
fn with_game(f: impl FnOnce(&mut Game)) {
    GAME.with(|cell| {
        if let Some(game) = cell.borrow_mut().as_mut() {
            f(game);
        }
    });
}

// --- WASM Entry --------------------------------------------------------------

/// Load assets and start the game on the canvas with id `canvas_id`.
///
/// `config_json` optionally overrides [`GameConfig`] fields. In record mode the
/// beatmap URL is ignored and no tiles are spawned.
#[wasm_bindgen]
pub async fn start_game(
    canvas_id: String,
    beatmap_url: String,
    audio_url: String,
    config_json: Option<String>,
) -> Result<(), JsValue> {
    launch(&canvas_id, &beatmap_url, &audio_url, config_json.as_deref())
        .await
        .map_err(|e| {
            log::error!("game failed to start: {e}");
            JsValue::from(e)
        })
}

async fn launch(
    canvas_id: &str,
    beatmap_url: &str,
    audio_url: &str,
    config_json: Option<&str>,
) -> Result<(), GameError> {
    let win = window().ok_or(GameError::NoWindow)?;
    let doc = win.document().ok_or(GameError::NoDocument)?;

    let viewport = Point2::new(
        win.inner_width()?.as_f64().unwrap_or(800.0),
        win.inner_height()?.as_f64().unwrap_or(600.0),
    );
    let canvas = find_canvas(&doc, canvas_id)?;
    canvas.set_width(viewport.x as u32);
    canvas.set_height(viewport.y as u32);
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or(GameError::ContextUnavailable)?
        .dyn_into()
        .map_err(|_| GameError::ContextUnavailable)?;
    let mut renderer = CanvasRenderer::new(ctx);
    render::draw_loading(&mut renderer, viewport);

    // Load phase: nothing below runs until every asset is in hand.
    let loaded = load_session(&win, beatmap_url, audio_url, config_json, viewport).await;
    let session = match loaded {
        Ok(session) => session,
        Err(e) => {
            render::draw_load_error(&mut renderer, viewport, &e.to_string());
            return Err(e);
        }
    };
    log::info!(
        "loaded '{}' by {} ({} beats)",
        session.beatmap().title,
        session.beatmap().artist,
        session.beatmap().total_beats()
    );

    // Run phase.
    GAME.with(|cell| *cell.borrow_mut() = Some(Game { session, renderer }));
    install_input(&doc, &canvas)?;
    start_frame_loop();
    Ok(())
}

async fn load_session(
    win: &Window,
    beatmap_url: &str,
    audio_url: &str,
    config_json: Option<&str>,
    viewport: Point2,
) -> Result<GameSession<HtmlAudioClock>, GameError> {
    let config = GameConfig::from_json(config_json)?;
    let clock = HtmlAudioClock::new(audio_url)?;
    if config.record_mode {
        log::info!("record mode: press Space to export the hit log");
        return Ok(GameSession::recording(config, viewport, clock));
    }
    let text = fetch_text(win, beatmap_url).await?;
    let beatmap = Beatmap::from_json(&text)?;
    Ok(GameSession::new(config, viewport, beatmap, clock))
}

fn find_canvas(doc: &Document, id: &str) -> Result<HtmlCanvasElement, GameError> {
    if let Some(el) = doc.get_element_by_id(id) {
        return el
            .dyn_into()
            .map_err(|_| GameError::CanvasNotFound(id.to_string()));
    }
    // Create one when the page did not provide it
    let body = doc.body().ok_or(GameError::NoDocument)?;
    let c: HtmlCanvasElement = doc
        .create_element("canvas")?
        .dyn_into()
        .map_err(|_| GameError::CanvasNotFound(id.to_string()))?;
    c.set_id(id);
    c.set_attribute("style", "position:fixed; left:0; top:0;")?;
    body.append_child(&c)?;
    Ok(c)
}

async fn fetch_text(win: &Window, url: &str) -> Result<String, GameError> {
    let failed = |reason: String| GameError::Fetch {
        url: url.to_string(),
        reason,
    };
    let resp = JsFuture::from(win.fetch_with_str(url))
        .await
        .map_err(|e| failed(format!("{e:?}")))?;
    let resp: Response = resp
        .dyn_into()
        .map_err(|_| failed("not a Response".into()))?;
    if !resp.ok() {
        return Err(failed(format!("HTTP {}", resp.status())));
    }
    let body = JsFuture::from(resp.text()?)
        .await
        .map_err(|e| failed(format!("{e:?}")))?;
    body.as_string()
        .ok_or_else(|| failed("body is not text".into()))
}

// --- Input -------------------------------------------------------------------

fn install_input(doc: &Document, canvas: &HtmlCanvasElement) -> Result<(), GameError> {
    for (event, phase) in [("keydown", KeyPhase::Down), ("keyup", KeyPhase::Up)] {
        let closure = Closure::wrap(Box::new(move |evt: KeyboardEvent| {
            let key = evt.key();
            if key == " " {
                evt.prevent_default(); // keep Space from scrolling the page
            }
            with_game(|game| {
                input::handle_key(&mut game.session, &key, phase);
            });
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    let closure = Closure::wrap(Box::new(move |evt: MouseEvent| {
        let point = Point2::new(evt.offset_x() as f64, evt.offset_y() as f64);
        with_game(|game| {
            input::handle_pointer(&mut game.session, point);
        });
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

// --- Frame loop --------------------------------------------------------------

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_frame_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
        with_game(frame);
        request_frame(&f);
    }) as Box<dyn FnMut(f64)>));
    request_frame(&g);
}

fn request_frame(cb: &FrameCallback) {
    let Some(w) = window() else { return };
    if let Some(closure) = cb.borrow().as_ref() {
        if let Err(e) = w.request_animation_frame(closure.as_ref().unchecked_ref()) {
            log::error!("requestAnimationFrame failed: {e:?}");
        }
    }
}

fn frame(game: &mut Game) {
    let start = performance_now();
    render::draw_frame(&game.session, &mut game.renderer);
    game.session.tick();
    game.session.record_frame_duration(performance_now() - start);
}

fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
