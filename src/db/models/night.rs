//! Sleep night records and the quality rating scale.

use serde::{Deserialize, Serialize};

/// One tracked night. While tracking is in progress the end time equals the
/// start time; that equality is what marks a night as still open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepNight {
    pub night_id: i64,
    pub start_time_milli: i64,
    pub end_time_milli: i64,
    pub sleep_quality: i32,
}

impl SleepNight {
    /// A fresh, unsaved night starting at `now_milli`. Storage assigns the id.
    pub fn begin(now_milli: i64) -> Self {
        Self {
            night_id: 0,
            start_time_milli: now_milli,
            end_time_milli: now_milli,
            sleep_quality: SleepQuality::UNRATED,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time_milli == self.start_time_milli
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_time_milli - self.start_time_milli
    }

    pub fn quality(&self) -> Option<SleepQuality> {
        SleepQuality::from_rating(self.sleep_quality)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SleepQuality {
    VeryBad,
    Poor,
    SoSo,
    Ok,
    PrettyGood,
    Excellent,
}

impl SleepQuality {
    pub const UNRATED: i32 = -1;

    pub fn from_rating(rating: i32) -> Option<Self> {
        match rating {
            0 => Some(SleepQuality::VeryBad),
            1 => Some(SleepQuality::Poor),
            2 => Some(SleepQuality::SoSo),
            3 => Some(SleepQuality::Ok),
            4 => Some(SleepQuality::PrettyGood),
            5 => Some(SleepQuality::Excellent),
            _ => None,
        }
    }

    pub fn rating(self) -> i32 {
        match self {
            SleepQuality::VeryBad => 0,
            SleepQuality::Poor => 1,
            SleepQuality::SoSo => 2,
            SleepQuality::Ok => 3,
            SleepQuality::PrettyGood => 4,
            SleepQuality::Excellent => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SleepQuality::VeryBad => "Very bad",
            SleepQuality::Poor => "Poor",
            SleepQuality::SoSo => "So-so",
            SleepQuality::Ok => "OK",
            SleepQuality::PrettyGood => "Pretty good",
            SleepQuality::Excellent => "Excellent",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_night_is_open_and_unrated() {
        let night = SleepNight::begin(1_000);
        assert!(night.is_open());
        assert_eq!(night.duration_ms(), 0);
        assert_eq!(night.sleep_quality, SleepQuality::UNRATED);
        assert_eq!(night.quality(), None);
    }

    #[test]
    fn closing_a_night_gives_duration() {
        let night = SleepNight {
            end_time_milli: 5_000,
            ..SleepNight::begin(1_000)
        };
        assert!(!night.is_open());
        assert_eq!(night.duration_ms(), 4_000);
    }

    #[test]
    fn rating_scale_round_trips() {
        for rating in 0..=5 {
            let quality = SleepQuality::from_rating(rating).unwrap();
            assert_eq!(quality.rating(), rating);
        }
        assert_eq!(SleepQuality::from_rating(6), None);
        assert_eq!(SleepQuality::from_rating(SleepQuality::UNRATED), None);
    }

    #[test]
    fn labels_match_rating_scale() {
        assert_eq!(SleepQuality::VeryBad.label(), "Very bad");
        assert_eq!(SleepQuality::SoSo.label(), "So-so");
        assert_eq!(SleepQuality::Excellent.label(), "Excellent");
    }

    #[test]
    fn serializes_in_camel_case() {
        let json = serde_json::to_value(SleepNight::begin(42)).unwrap();
        assert_eq!(json["nightId"], 0);
        assert_eq!(json["startTimeMilli"], 42);
        assert_eq!(json["sleepQuality"], -1);
    }
}
