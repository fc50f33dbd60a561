//! Game state machine.
//!
//! A [`GameSession`] owns everything that changes during play: the four lanes and
//! their tile queues, the beatmap queue, score and combo. The host calls
//! [`GameSession::tick`] once per animation frame and forwards input through
//! [`crate::input`]. Time comes from an [`AudioClock`]; the session reads it
//! and never drives it except for play/pause on state transitions.
//!
//! ```text
//! Idle --confirm--> Running --confirm--> Paused --confirm--> Running ...
//! ```
//! Only `Running` mutates tiles, score or combo.

use std::collections::VecDeque;

use crate::beatmap::Beatmap;
use crate::config::GameConfig;
use crate::geometry::Point2;

mod lane;
mod record;

pub use lane::{Lane, LaneTrack, Tile};
pub use record::{HitLog, HitRecord};

pub const LANE_COUNT: usize = 4;

// --- Clock / Phase -----------------------------------------------------------

/// Authoritative timebase (the playing audio track).
pub trait AudioClock {
    /// Playback position in seconds.
    fn current_time(&self) -> f64;
    fn play(&mut self);
    fn pause(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Paused,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HitOutcome {
    /// Input arrived while not running, or the lane was already held.
    Ignored,
    /// No tile overlapped the hit zone.
    Whiff,
    Hit { combo: u32, gained: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeedChange {
    Up,
    Down,
}

// --- Session -----------------------------------------------------------------

pub struct GameSession<C: AudioClock> {
    config: GameConfig,
    viewport: Point2,
    clock: C,
    beatmap: Beatmap,
    lanes: [Lane; LANE_COUNT],
    tracks: [LaneTrack; LANE_COUNT],
    tiles: [VecDeque<Tile>; LANE_COUNT], // per lane, oldest (lowest) first
    phase: Phase,
    score: f64,
    combo: u32,
    combo_threshold: u32,
    speed_multiplier: f64,
    frame_ms: f64, // duration of the last rendered frame
    hit_log: HitLog,
}

impl<C: AudioClock> GameSession<C> {
    pub fn new(config: GameConfig, viewport: Point2, beatmap: Beatmap, clock: C) -> Self {
        let combo_threshold = (beatmap.total_beats() / 2) as u32;
        if combo_threshold == 0 {
            log::warn!(
                "beatmap '{}' has {} beat(s); hits will not add score",
                beatmap.title,
                beatmap.total_beats()
            );
        }
        let speed_multiplier = config.initial_speed.max(config.min_speed);
        Self {
            lanes: lane::build_lanes(viewport, &config),
            tracks: lane::build_tracks(viewport, &config),
            tiles: Default::default(),
            config,
            viewport,
            clock,
            beatmap,
            phase: Phase::Idle,
            score: 0.0,
            combo: 0,
            combo_threshold,
            speed_multiplier,
            frame_ms: 0.0,
            hit_log: HitLog::default(),
        }
    }

    /// Session for charting a new song: empty beatmap, presses are logged.
    pub fn recording(mut config: GameConfig, viewport: Point2, clock: C) -> Self {
        config.record_mode = true;
        Self::new(config, viewport, Beatmap::recording(), clock)
    }

    // --- State transitions ---------------------------------------------------

    /// Enter: start when idle, otherwise toggle pause.
    pub fn confirm(&mut self) {
        match self.phase {
            Phase::Idle => self.start(),
            Phase::Running => self.pause(),
            Phase::Paused => self.resume(),
        }
    }

    pub fn start(&mut self) {
        if self.phase == Phase::Idle {
            self.phase = Phase::Running;
            self.clock.play();
            log::info!("started '{}'", self.beatmap.title);
        }
    }

    pub fn pause(&mut self) {
        if self.phase == Phase::Running {
            self.phase = Phase::Paused;
            self.clock.pause();
            log::debug!("paused at {:.3}s", self.clock.current_time());
        }
    }

    pub fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.phase = Phase::Running;
            self.clock.play();
            log::debug!("resumed at {:.3}s", self.clock.current_time());
        }
    }

    // --- Per-frame update ----------------------------------------------------

    /// Gameplay half of a frame: spawn due tiles, then move everything down.
    pub fn tick(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.spawn_tiles();
        self.advance_tiles();
    }

    /// Current fall velocity for every tile at the current speed.
    pub fn tile_velocity(&self) -> Point2 {
        Point2::new(
            0.0,
            (self.viewport.y / self.config.tile_width) * self.speed_multiplier,
        )
    }

    /// Seconds before its beat time that a tile is spawned above the surface.
    pub fn spawn_lookahead(&self) -> f64 {
        (self.tile_velocity().y + self.config.lookahead_padding) / 100.0
    }

    /// Dequeue every beat that is due and put its tile at the top of its lane.
    pub fn spawn_tiles(&mut self) -> usize {
        // millisecond resolution, same as the clock readout
        let now = (self.clock.current_time() * 1000.0).round() / 1000.0;
        let lookahead = self.spawn_lookahead();
        let velocity = self.tile_velocity();
        let size = Point2::new(self.config.tile_width, self.config.tile_height);
        let mut spawned = 0;
        while let Some(beat) = self.beatmap.pop_due(|b| b.start_time - lookahead <= now) {
            let lane = beat.lane_index;
            self.tiles[lane].push_back(Tile {
                position: Point2::new(self.lanes[lane].position.x, -self.config.tile_height),
                size,
                velocity,
                lane_index: lane,
            });
            spawned += 1;
        }
        spawned
    }

    /// Move tiles by their velocity; tiles that left the bottom of the surface are misses.
    pub fn advance_tiles(&mut self) -> usize {
        let bottom = self.viewport.y;
        let mut missed = 0;
        for queue in self.tiles.iter_mut() {
            for tile in queue.iter_mut() {
                tile.position += tile.velocity;
            }
            while queue.front().is_some_and(|t| t.position.y > bottom) {
                queue.pop_front();
                missed += 1;
            }
        }
        if missed > 0 {
            log::debug!("{missed} tile(s) missed, combo {} -> 0", self.combo);
            self.combo = 0;
        }
        missed
    }

    pub fn record_frame_duration(&mut self, ms: f64) {
        self.frame_ms = ms;
    }

    // --- Collision / scoring -------------------------------------------------

    /// Does the vertical span `[y, y + height]` overlap the lane's hit zone?
    /// The hit zone is `tile_width` tall.
    pub fn collision_control_detector(&self, y: f64, height: f64, lane: usize) -> bool {
        let zone_y = self.lanes[lane].position.y;
        (y + height) > zone_y && (zone_y + self.config.tile_width) > y
    }

    /// Score gained by a hit that brings the combo to `combo`.
    fn score_for_combo(&self, combo: u32) -> f64 {
        if self.combo_threshold == 0 {
            return 0.0;
        }
        self.config.base_score * self.speed_multiplier * (combo as f64 / self.combo_threshold as f64)
    }

    /// Try to strike the front tile of `lane`.
    pub fn hit_lane(&mut self, lane: usize) -> HitOutcome {
        if self.phase != Phase::Running {
            return HitOutcome::Ignored;
        }
        let Some(front) = self.tiles[lane].front() else {
            return HitOutcome::Whiff;
        };
        if !self.collision_control_detector(front.position.y, front.size.y, lane) {
            return HitOutcome::Whiff;
        }
        self.tiles[lane].pop_front();
        self.combo += 1;
        let gained = self.score_for_combo(self.combo);
        self.score += gained;
        HitOutcome::Hit {
            combo: self.combo,
            gained,
        }
    }

    /// Key-down on a lane: light the control and attempt a hit.
    /// A lane that is already held (keyboard auto-repeat) is not pressed again.
    pub fn press_lane(&mut self, lane: usize) -> HitOutcome {
        if self.phase != Phase::Running || self.lanes[lane].active {
            return HitOutcome::Ignored;
        }
        self.lanes[lane].active = true;
        let outcome = self.hit_lane(lane);
        if self.config.record_mode {
            self.hit_log.press(lane, self.clock.current_time());
        }
        outcome
    }

    /// Key-up on a lane.
    pub fn release_lane(&mut self, lane: usize) {
        self.lanes[lane].active = false;
        if self.config.record_mode && self.phase == Phase::Running {
            self.hit_log.release(lane, self.clock.current_time());
        }
    }

    /// Pointer press at `point` (surface coordinates). The first tap starts the game.
    pub fn tap(&mut self, point: Point2) -> HitOutcome {
        if self.phase == Phase::Idle {
            self.start();
        }
        if self.phase != Phase::Running {
            return HitOutcome::Ignored;
        }
        let width = self.config.tile_width;
        let target = (0..LANE_COUNT).find(|&i| {
            let x = self.lanes[i].position.x;
            self.collision_control_detector(point.y, 0.0, i) && x + width > point.x && x < point.x
        });
        match target {
            Some(lane) => self.hit_lane(lane),
            None => HitOutcome::Whiff,
        }
    }

    // --- Speed -------------------------------------------------------------

    /// Step the speed multiplier and retime every tile already in flight.
    pub fn change_speed(&mut self, change: SpeedChange) {
        let step = self.config.speed_step;
        let next = match change {
            SpeedChange::Up => self.speed_multiplier + step,
            SpeedChange::Down => self.speed_multiplier - step,
        };
        self.speed_multiplier = next.max(self.config.min_speed);
        let velocity = self.tile_velocity();
        for tile in self.tiles.iter_mut().flatten() {
            tile.velocity = velocity;
        }
        log::info!("speed x{}", self.speed_multiplier);
    }

    // --- Hit log -------------------------------------------------------------

    /// Write the captured hit log to the diagnostic log. `None` outside record mode.
    pub fn export_hit_log(&self) -> Option<String> {
        if !self.config.record_mode {
            log::debug!("hit log export requested outside record mode");
            return None;
        }
        match self.hit_log.to_json() {
            Ok(json) => {
                log::info!("hit log ({} records): {json}", self.hit_log.records().len());
                Some(json)
            }
            Err(e) => {
                log::error!("hit log export failed: {e}");
                None
            }
        }
    }

    // --- Accessors -----------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_started(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn combo_threshold(&self) -> u32 {
        self.combo_threshold
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    pub fn frame_duration(&self) -> f64 {
        self.frame_ms
    }

    pub fn audio_time(&self) -> f64 {
        self.clock.current_time()
    }

    pub fn viewport(&self) -> Point2 {
        self.viewport
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn beatmap(&self) -> &Beatmap {
        &self.beatmap
    }

    pub fn lanes(&self) -> &[Lane; LANE_COUNT] {
        &self.lanes
    }

    pub fn tracks(&self) -> &[LaneTrack; LANE_COUNT] {
        &self.tracks
    }

    pub fn lane_tiles(&self, lane: usize) -> &VecDeque<Tile> {
        &self.tiles[lane]
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().flatten()
    }

    pub fn hit_log(&self) -> &HitLog {
        &self.hit_log
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}
