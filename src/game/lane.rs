// Lane entities: the hit-zone control, its backdrop track, and falling tiles.
use crate::config::GameConfig;
use crate::geometry::Point2;

use super::LANE_COUNT;

/// Hit zone at the bottom of a lane. `active` mirrors whether its key is held.
#[derive(Clone, Debug, PartialEq)]
pub struct Lane {
    pub position: Point2,
    pub size: Point2,
    pub lane_index: usize,
    pub active: bool,
}

/// Visual backdrop of a lane, from the top of the surface down to its control.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneTrack {
    pub position: Point2,
    pub size: Point2,
    pub lane_index: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub position: Point2,
    pub size: Point2,
    pub velocity: Point2, // pixels per frame
    pub lane_index: usize,
}

/// Left edge of lane `index`; the four lanes are centred on the surface.
fn lane_x(viewport: Point2, cfg: &GameConfig, index: usize) -> f64 {
    (viewport.x / 2.0 - cfg.tile_width * 2.0) + (cfg.lane_gap + cfg.tile_width) * index as f64
}

pub(crate) fn build_lanes(viewport: Point2, cfg: &GameConfig) -> [Lane; LANE_COUNT] {
    let bottom = viewport.y - cfg.tile_width;
    std::array::from_fn(|i| Lane {
        position: Point2::new(lane_x(viewport, cfg, i), bottom),
        size: Point2::new(cfg.tile_width, cfg.tile_width),
        lane_index: i,
        active: false,
    })
}

pub(crate) fn build_tracks(viewport: Point2, cfg: &GameConfig) -> [LaneTrack; LANE_COUNT] {
    std::array::from_fn(|i| LaneTrack {
        position: Point2::new(lane_x(viewport, cfg, i), 0.0),
        size: Point2::new(cfg.tile_width, viewport.y - cfg.tile_width),
        lane_index: i,
    })
}
