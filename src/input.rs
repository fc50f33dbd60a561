//! Input routing: raw key / pointer events become [`Command`]s applied to the session.
//!
//! | key            | command                     |
//! |----------------|-----------------------------|
//! | lane keybinds  | lane down / lane up         |
//! | `Enter`        | start / pause / resume      |
//! | `-` / `=`      | speed down / speed up       |
//! | `Space`        | export hit log (record mode)|
//!
//! Anything else is logged and dropped.

use crate::config::GameConfig;
use crate::game::{AudioClock, GameSession, HitOutcome, SpeedChange};
use crate::geometry::Point2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPhase {
    Down,
    Up,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    LaneDown(usize),
    LaneUp(usize),
    Confirm,
    Speed(SpeedChange),
    ExportRecord,
}

/// Map a `KeyboardEvent.key` value to a command. Known keys in the wrong phase
/// (e.g. releasing Enter) map to `None` silently.
pub fn route_key(config: &GameConfig, key: &str, phase: KeyPhase) -> Option<Command> {
    let down = phase == KeyPhase::Down;
    match key {
        "Enter" => down.then_some(Command::Confirm),
        "-" => down.then_some(Command::Speed(SpeedChange::Down)),
        "=" => down.then_some(Command::Speed(SpeedChange::Up)),
        " " => down.then_some(Command::ExportRecord),
        _ => {
            let lane = single_char(key).and_then(|c| config.lane_for_key(c));
            match (lane, phase) {
                (Some(l), KeyPhase::Down) => Some(Command::LaneDown(l)),
                (Some(l), KeyPhase::Up) => Some(Command::LaneUp(l)),
                (None, _) => {
                    log::info!("unhandled key {key:?} ({phase:?})");
                    None
                }
            }
        }
    }
}

fn single_char(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Apply a command. Returns the hit outcome for lane presses.
pub fn apply<C: AudioClock>(session: &mut GameSession<C>, command: Command) -> Option<HitOutcome> {
    match command {
        Command::LaneDown(lane) => return Some(session.press_lane(lane)),
        Command::LaneUp(lane) => session.release_lane(lane),
        Command::Confirm => session.confirm(),
        Command::Speed(change) => session.change_speed(change),
        Command::ExportRecord => {
            session.export_hit_log();
        }
    }
    None
}

/// Route and apply a keyboard event in one step.
pub fn handle_key<C: AudioClock>(
    session: &mut GameSession<C>,
    key: &str,
    phase: KeyPhase,
) -> Option<HitOutcome> {
    let command = route_key(session.config(), key, phase)?;
    apply(session, command)
}

/// Pointer press in surface coordinates.
pub fn handle_pointer<C: AudioClock>(session: &mut GameSession<C>, point: Point2) -> HitOutcome {
    session.tap(point)
}
