//! Tunable game constants.
//!
//! Every field has a default matching the classic layout (100px wide lanes,
//! 65px tall tiles, speed x4). A host may override any subset by passing a
//! JSON object to `start_game`, e.g. `{"initial_speed": 3.0, "keybinds": ["A","S","K","L"]}`.

use serde::Deserialize;

use crate::error::GameError;
use crate::game::LANE_COUNT;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Lane / control width. Also used as hit-zone height and as the speed divisor.
    pub tile_width: f64,
    pub tile_height: f64,
    pub base_score: f64,
    pub initial_speed: f64,
    pub speed_step: f64,
    /// Floor for the speed multiplier so tiles always fall downward.
    pub min_speed: f64,
    pub lane_gap: f64,
    /// Padding (in pixels per frame) added to tile velocity before converting to seconds of lookahead.
    pub lookahead_padding: f64,
    pub keybinds: [char; LANE_COUNT],
    pub record_mode: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_width: 100.0,
            tile_height: 65.0,
            base_score: 50.0,
            initial_speed: 4.0,
            speed_step: 0.5,
            min_speed: 0.5,
            lane_gap: 2.0,
            lookahead_padding: 10.0,
            keybinds: ['D', 'F', 'J', 'K'],
            record_mode: cfg!(feature = "record"),
        }
    }
}

impl GameConfig {
    /// Parse an optional JSON override; `None` or an empty string yields the defaults.
    pub fn from_json(json: Option<&str>) -> Result<Self, GameError> {
        match json.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(text) => {
                let config: Self = serde_json::from_str(text).map_err(GameError::Config)?;
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Reject values that would stall, reverse or blow up the tile motion.
    pub fn validate(&self) -> Result<(), GameError> {
        let positive = [
            ("tile_width", self.tile_width),
            ("tile_height", self.tile_height),
            ("min_speed", self.min_speed),
            ("speed_step", self.speed_step),
        ];
        let finite = [
            ("base_score", self.base_score),
            ("initial_speed", self.initial_speed),
            ("lane_gap", self.lane_gap),
            ("lookahead_padding", self.lookahead_padding),
        ];
        for (field, value) in positive.into_iter().chain(finite) {
            if !value.is_finite() {
                return Err(GameError::ConfigValue {
                    field,
                    value,
                    reason: "must be finite",
                });
            }
        }
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(GameError::ConfigValue {
                    field,
                    value,
                    reason: "must be greater than 0",
                });
            }
        }
        Ok(())
    }

    /// Lane bound to `key`, matched case-insensitively.
    pub fn lane_for_key(&self, key: char) -> Option<usize> {
        self.keybinds
            .iter()
            .position(|k| k.eq_ignore_ascii_case(&key))
    }
}
