use anyhow::{bail, Result};

use crate::db::models::{SleepNight, SleepQuality};

/// Rejects nights whose end precedes their start or whose rating is off-scale.
pub fn validate_night(night: &SleepNight) -> Result<()> {
    if night.end_time_milli < night.start_time_milli {
        bail!(
            "night {} ends at {} before it starts at {}",
            night.night_id,
            night.end_time_milli,
            night.start_time_milli
        );
    }

    if night.sleep_quality != SleepQuality::UNRATED
        && SleepQuality::from_rating(night.sleep_quality).is_none()
    {
        bail!(
            "night {} has invalid quality rating {}",
            night.night_id,
            night.sleep_quality
        );
    }

    Ok(())
}
