//! Frame composition. Everything visual goes through the small [`Renderer`]
//! contract so the session can be drawn to a canvas or inspected in tests.

use crate::game::{AudioClock, GameSession};
use crate::geometry::Point2;

/// Drawing surface the frame is composed onto.
pub trait Renderer {
    fn clear(&mut self, size: Point2);
    /// Full-surface background (gradient on the canvas).
    fn fill_background(&mut self, size: Point2);
    fn fill_rect(&mut self, position: Point2, style: &str, size: Point2);
    fn draw_text(&mut self, text: &str, position: Point2, font: &str);
}

// --- Palette -------------------------------------------------------------------

pub const TRACK_COLOR: &str = "rgba(68, 87, 199, 0.616)";
pub const TILE_COLOR: &str = "rgba(39, 123, 202, 0.75)";
pub const CONTROL_ACTIVE: (&str, &str) = ("rgba(31, 102, 255, 0.8)", "rgb(0, 204, 255)");
pub const CONTROL_IDLE: (&str, &str) = ("rgba(0, 4, 255, 0.600)", "rgba(0, 204, 255, 0.750)");
pub const OVERLAY_COLOR: &str = "rgba(116, 116, 116, 0.600)";
pub const LOADING_OVERLAY_COLOR: &str = "rgba(116, 116, 116, 0.400)";

const BANNER_FONT: &str = "38px monospace";

/// Draw one complete frame for the session's current state.
pub fn draw_frame<C: AudioClock, R: Renderer>(session: &GameSession<C>, r: &mut R) {
    let size = session.viewport();
    r.clear(size);
    r.fill_background(size);

    for track in session.tracks() {
        r.fill_rect(track.position, TRACK_COLOR, track.size);
    }
    for tile in session.tiles() {
        r.fill_rect(tile.position, TILE_COLOR, tile.size);
    }
    draw_controls(session, r);
    draw_info(session, r);

    if !session.is_started() {
        draw_banner(r, size, OVERLAY_COLOR, "Press Enter to Start!", 210.0);
    } else if session.is_paused() {
        draw_banner(r, size, OVERLAY_COLOR, "Game Paused", 110.0);
    }
}

fn draw_controls<C: AudioClock, R: Renderer>(session: &GameSession<C>, r: &mut R) {
    let tw = session.config().tile_width;
    for lane in session.lanes() {
        let (main, top) = if lane.active { CONTROL_ACTIVE } else { CONTROL_IDLE };
        r.fill_rect(lane.position, main, lane.size);
        r.fill_rect(lane.position, top, Point2::new(lane.size.x, lane.size.y / 4.0));
        let label = session.config().keybinds[lane.lane_index].to_string();
        let centre = Point2::new(
            lane.position.x + (tw / 2.0 - 5.0),
            lane.position.y + (tw / 2.0 + 5.0),
        );
        r.draw_text(&label, centre, "24px monospace");
    }
}

// HUD: track metadata bottom-left, score top-left, clock top-right,
// frame time top-centre, speed bottom-right, combo above it.
fn draw_info<C: AudioClock, R: Renderer>(session: &GameSession<C>, r: &mut R) {
    let Point2 { x: w, y: h } = session.viewport();
    let map = session.beatmap();
    r.draw_text(&map.album, Point2::new(0.0, h - 5.0), "14px monospace");
    r.draw_text(&map.title, Point2::new(0.0, h - 19.0), "12px monospace");
    r.draw_text(&map.artist, Point2::new(0.0, h - 31.0), "10px monospace");

    let score = session.score().floor().to_string();
    r.draw_text(&score, Point2::new(0.0, 20.0), "24px monospace");
    r.draw_text(
        &format_clock(session.audio_time()),
        Point2::new(w - 72.0, 24.0),
        "24px monospace",
    );
    r.draw_text(
        &session.frame_duration().to_string(),
        Point2::new(w / 2.0, 12.0),
        "12px monospace",
    );
    r.draw_text(
        &session.speed_multiplier().to_string(),
        Point2::new(w - 20.0, h - 5.0),
        "12px monospace",
    );
    r.draw_text(
        &format!("{}x", session.combo()),
        Point2::new(w - 200.0, h - 40.0),
        "8rem monospace",
    );
}

fn draw_banner<R: Renderer>(r: &mut R, size: Point2, shade: &str, text: &str, half_width: f64) {
    r.fill_rect(Point2::ZERO, shade, size);
    r.draw_text(
        text,
        Point2::new(size.x / 2.0 - half_width, size.y / 2.0),
        BANNER_FONT,
    );
}

/// Shown before the beatmap has loaded.
pub fn draw_loading<R: Renderer>(r: &mut R, size: Point2) {
    r.fill_background(size);
    draw_banner(r, size, LOADING_OVERLAY_COLOR, "Loading...", 110.0);
}

/// Replaces the loading screen when assets fail to load.
pub fn draw_load_error<R: Renderer>(r: &mut R, size: Point2, message: &str) {
    r.clear(size);
    r.fill_background(size);
    draw_banner(r, size, OVERLAY_COLOR, "Failed to load", 150.0);
    r.draw_text(
        message,
        Point2::new(16.0, size.y / 2.0 + 40.0),
        "16px monospace",
    );
}

/// Playback position as `mm:ss`.
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    let hours = total / 3600;
    let minutes = (total - hours * 3600) / 60;
    let secs = total % 60;
    format!("{minutes:02}:{secs:02}")
}
