//! Beatmap model and JSON loader.
//!
//! File format:
//! ```json
//! { "title": "...", "artist": "...", "album": "...",
//!   "beats": [ { "start_time": 1.25, "key": 0 }, ... ] }
//! ```
//! `start_time` is in seconds of audio playback, `key` is the lane index.

use std::collections::VecDeque;

use serde::Deserialize;

use crate::error::BeatmapError;
use crate::game::LANE_COUNT;

/// A scheduled (lane, time) pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeatEvent {
    pub lane_index: usize,
    pub start_time: f64,
}

/// Loaded beatmap. Beats are kept time-ascending and consumed from the front as tiles spawn.
#[derive(Clone, Debug, Default)]
pub struct Beatmap {
    pub title: String,
    pub artist: String,
    pub album: String,
    beats: VecDeque<BeatEvent>,
    total_beats: usize,
}

// Raw file shape; validated before it becomes a `Beatmap`.
#[derive(Deserialize)]
struct RawBeatmap {
    #[serde(default)]
    title: String,
    #[serde(default)]
    artist: String,
    #[serde(default)]
    album: String,
    beats: Vec<RawBeat>,
}

#[derive(Deserialize)]
struct RawBeat {
    start_time: f64,
    key: i64,
}

impl Beatmap {
    pub fn from_json(text: &str) -> Result<Self, BeatmapError> {
        let raw: RawBeatmap = serde_json::from_str(text)?;
        let mut beats = Vec::with_capacity(raw.beats.len());
        for (index, b) in raw.beats.iter().enumerate() {
            if b.key < 0 || b.key >= LANE_COUNT as i64 {
                return Err(BeatmapError::LaneOutOfRange {
                    index,
                    lane: b.key,
                    lanes: LANE_COUNT,
                });
            }
            if !b.start_time.is_finite() || b.start_time < 0.0 {
                return Err(BeatmapError::InvalidStartTime {
                    index,
                    start_time: b.start_time,
                });
            }
            beats.push(BeatEvent {
                lane_index: b.key as usize,
                start_time: b.start_time,
            });
        }
        Ok(Self::new(raw.title, raw.artist, raw.album, beats))
    }

    /// Build a beatmap from already-validated events. Events are stably sorted by start time.
    pub fn new(title: String, artist: String, album: String, mut beats: Vec<BeatEvent>) -> Self {
        if beats.windows(2).any(|w| w[1].start_time < w[0].start_time) {
            log::warn!("beatmap '{title}' is not time-ordered; sorting {} beats", beats.len());
            beats.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        }
        let total_beats = beats.len();
        Self {
            title,
            artist,
            album,
            beats: beats.into(),
            total_beats,
        }
    }

    /// Empty map used while recording a new chart.
    pub fn recording() -> Self {
        Self::new("Recording".into(), String::new(), String::new(), Vec::new())
    }

    /// Number of beats the map was loaded with (not affected by consumption).
    pub fn total_beats(&self) -> usize {
        self.total_beats
    }

    pub fn pending(&self) -> usize {
        self.beats.len()
    }

    pub fn peek(&self) -> Option<&BeatEvent> {
        self.beats.front()
    }

    /// Dequeue the front beat if `is_due` accepts it.
    pub fn pop_due(&mut self, is_due: impl Fn(&BeatEvent) -> bool) -> Option<BeatEvent> {
        if self.beats.front().is_some_and(is_due) {
            self.beats.pop_front()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_metadata_and_beats() {
        let map = Beatmap::from_json(
            r#"{"title":"Genealogy","artist":"A","album":"B",
                "beats":[{"start_time":0.5,"key":1},{"start_time":1.0,"key":3}]}"#,
        )
        .unwrap();
        assert_eq!(map.title, "Genealogy");
        assert_eq!(map.total_beats(), 2);
        assert_eq!(
            map.peek(),
            Some(&BeatEvent {
                lane_index: 1,
                start_time: 0.5
            })
        );
    }

    #[test]
    fn unsorted_beats_are_ordered_on_load() {
        let map = Beatmap::from_json(
            r#"{"beats":[{"start_time":2.0,"key":0},{"start_time":1.0,"key":2},{"start_time":1.0,"key":1}]}"#,
        )
        .unwrap();
        let order: Vec<_> = map.beats.iter().map(|b| b.lane_index).collect();
        // stable: the two 1.0s keep file order
        assert_eq!(order, vec![2, 1, 0]);
    }

    #[test]
    fn rejects_lane_out_of_range() {
        let err = Beatmap::from_json(r#"{"beats":[{"start_time":1.0,"key":4}]}"#).unwrap_err();
        assert!(matches!(err, BeatmapError::LaneOutOfRange { index: 0, lane: 4, .. }));
        let err = Beatmap::from_json(r#"{"beats":[{"start_time":1.0,"key":-1}]}"#).unwrap_err();
        assert!(matches!(err, BeatmapError::LaneOutOfRange { lane: -1, .. }));
    }

    #[test]
    fn rejects_negative_start_time() {
        let err = Beatmap::from_json(r#"{"beats":[{"start_time":-0.1,"key":0}]}"#).unwrap_err();
        assert!(matches!(err, BeatmapError::InvalidStartTime { index: 0, .. }));
    }

    #[test]
    fn rejects_missing_beats() {
        let err = Beatmap::from_json(r#"{"title":"x"}"#).unwrap_err();
        assert!(matches!(err, BeatmapError::Parse(_)));
    }

    #[test]
    fn pop_due_only_takes_from_front() {
        let mut map = Beatmap::from_json(
            r#"{"beats":[{"start_time":1.0,"key":0},{"start_time":3.0,"key":1}]}"#,
        )
        .unwrap();
        assert!(map.pop_due(|b| b.start_time <= 0.5).is_none());
        assert_eq!(map.pop_due(|b| b.start_time <= 1.0).map(|b| b.lane_index), Some(0));
        assert!(map.pop_due(|b| b.start_time <= 1.0).is_none());
        assert_eq!(map.pending(), 1);
        assert_eq!(map.total_beats(), 2);
    }
}
