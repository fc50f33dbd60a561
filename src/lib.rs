//! Piano Tiles core crate.
//!
//! Tiles fall down four lanes in time with an audio track; the player strikes
//! each lane's control (D / F / J / K or a tap) as the tile crosses it. The
//! gameplay state machine lives in [`game`] and is plain Rust; the browser
//! glue (canvas, `<audio>`, DOM events, animation frames) lives in [`web`]
//! and is exposed to JS through [`start_game`].

use wasm_bindgen::prelude::*;

pub mod beatmap;
pub mod config;
pub mod error;
pub mod game;
pub mod geometry;
pub mod input;
pub mod render;
pub mod web;

pub use beatmap::{BeatEvent, Beatmap};
pub use config::GameConfig;
pub use error::{BeatmapError, GameError};
pub use game::{AudioClock, GameSession, HitOutcome, Phase, SpeedChange};
pub use geometry::Point2;
pub use web::start_game;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // Route `log` records to the browser console.
    #[cfg(target_arch = "wasm32")]
    {
        let level = if cfg!(debug_assertions) {
            log::Level::Debug
        } else {
            log::Level::Info
        };
        if console_log::init_with_level(level).is_err() {
            web_sys::console::warn_1(&"logger already initialised".into());
        }
    }
}
