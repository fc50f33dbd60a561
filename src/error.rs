//! Error types surfaced while loading assets and constructing a game.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Why a beatmap file could not be turned into a playable [`crate::beatmap::Beatmap`].
#[derive(Debug, Error)]
pub enum BeatmapError {
    #[error("beatmap is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("beat #{index} targets lane {lane}, expected 0..{lanes}")]
    LaneOutOfRange { index: usize, lane: i64, lanes: usize },
    #[error("beat #{index} has an invalid start time {start_time}")]
    InvalidStartTime { index: usize, start_time: f64 },
}

/// Fatal errors that stop the game before the frame loop is running.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("no window")]
    NoWindow,
    #[error("no document")]
    NoDocument,
    #[error("canvas element '{0}' not found")]
    CanvasNotFound(String),
    #[error("cannot get canvas 2D context")]
    ContextUnavailable,
    #[error("invalid game config: {0}")]
    Config(serde_json::Error),
    #[error("invalid game config: {field} = {value} ({reason})")]
    ConfigValue {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("failed to fetch '{url}': {reason}")]
    Fetch { url: String, reason: String },
    #[error(transparent)]
    Beatmap(#[from] BeatmapError),
    #[error("host call failed: {0}")]
    Host(String),
}

impl From<JsValue> for GameError {
    fn from(value: JsValue) -> Self {
        GameError::Host(format!("{value:?}"))
    }
}

impl From<GameError> for JsValue {
    fn from(err: GameError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
