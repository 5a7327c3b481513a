use crate::db::SleepNight;

use super::OneShot;

/// Everything the tracker screen renders from. Published whole through a
/// watch channel; one-shot fields reset once consumed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackerState {
    /// The night being tracked right now, if any.
    pub tonight: Option<SleepNight>,
    /// All stored nights, newest first.
    pub nights: Vec<SleepNight>,
    pub navigate_to_sleep_quality: OneShot<SleepNight>,
    pub navigate_to_sleep_detail: OneShot<i64>,
    pub show_snackbar: OneShot<()>,
    pub error: OneShot<String>,
}

impl TrackerState {
    pub fn start_button_visible(&self) -> bool {
        self.tonight.is_none()
    }

    pub fn stop_button_visible(&self) -> bool {
        self.tonight.is_some()
    }

    pub fn clear_button_visible(&self) -> bool {
        !self.nights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_state_shows_only_start() {
        let state = TrackerState::default();
        assert!(state.start_button_visible());
        assert!(!state.stop_button_visible());
        assert!(!state.clear_button_visible());
    }

    #[test]
    fn tracking_state_swaps_buttons() {
        let night = SleepNight::begin(1_000);
        let state = TrackerState {
            tonight: Some(night.clone()),
            nights: vec![night],
            ..TrackerState::default()
        };
        assert!(!state.start_button_visible());
        assert!(state.stop_button_visible());
        assert!(state.clear_button_visible());
    }
}
