// Hit log captured in record mode. Exported as JSON in the same
// `{start_time, key}` shape the beatmap loader reads, plus `end_time`.
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HitRecord {
    #[serde(rename = "key")]
    pub lane_index: usize,
    pub start_time: f64,
    /// Release time; `None` while the key is still held.
    pub end_time: Option<f64>,
}

#[derive(Debug, Default)]
pub struct HitLog {
    records: Vec<HitRecord>,
}

impl HitLog {
    pub fn press(&mut self, lane_index: usize, time: f64) {
        self.records.push(HitRecord {
            lane_index,
            start_time: time,
            end_time: None,
        });
    }

    /// Close the most recent open record for `lane_index`.
    pub fn release(&mut self, lane_index: usize, time: f64) {
        if let Some(r) = self
            .records
            .iter_mut()
            .rev()
            .find(|r| r.lane_index == lane_index && r.end_time.is_none())
        {
            r.end_time = Some(time);
        }
    }

    pub fn records(&self) -> &[HitRecord] {
        &self.records
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_closes_latest_open_press_in_lane() {
        let mut log = HitLog::default();
        log.press(0, 1.0);
        log.press(1, 1.1);
        log.release(0, 1.3);
        log.release(2, 1.4); // nothing open in lane 2
        assert_eq!(log.records()[0].end_time, Some(1.3));
        assert_eq!(log.records()[1].end_time, None);
    }

    #[test]
    fn exports_beatmap_compatible_keys() {
        let mut log = HitLog::default();
        log.press(3, 2.5);
        log.release(3, 2.75);
        assert_eq!(
            log.to_json().unwrap(),
            r#"[{"key":3,"start_time":2.5,"end_time":2.75}]"#
        );
    }
}
