//! Conversions between the hardware's per-channel scalars and the
//! percentage / flag values exposed to callers.

use crate::models::error::ControlError;

pub const MIN_VOLUME_PERCENT: i32 = 0;
pub const MAX_VOLUME_PERCENT: i32 = 100;

/// Convert a percentage in [0, 100] to a volume scalar in [0.0, 1.0].
pub fn percent_to_scalar(percent: i32) -> Result<f32, ControlError> {
    if !(MIN_VOLUME_PERCENT..=MAX_VOLUME_PERCENT).contains(&percent) {
        return Err(ControlError::VolumeOutOfRange(percent));
    }
    Ok(percent as f32 / 100.0)
}

/// Convert a volume scalar to a percentage, rounding half away from zero.
pub fn scalar_to_percent(scalar: f32) -> i32 {
    (scalar * 100.0).round() as i32
}

/// Arithmetic mean of the channel scalars as a percentage.
///
/// Channels that disagree collapse into their average. `None` for an empty slice.
pub fn average_percent(scalars: &[f32]) -> Option<i32> {
    if scalars.is_empty() {
        return None;
    }
    let sum: f32 = scalars.iter().sum();
    Some(scalar_to_percent(sum / scalars.len() as f32))
}

/// A device is muted only if every channel is muted.
///
/// Any non-zero flag counts as muted for its channel.
pub fn all_muted(flags: &[u32]) -> bool {
    flags.iter().all(|&flag| flag != 0)
}

pub fn mute_flag(muted: bool) -> u32 {
    u32::from(muted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn percent_round_trips_through_scalar() {
        for percent in [0, 1, 29, 50, 57, 99, 100] {
            let scalar = percent_to_scalar(percent).unwrap();
            assert_eq!(scalar_to_percent(scalar), percent);
        }
    }

    #[test]
    fn rejects_out_of_range_percentages() {
        assert_eq!(percent_to_scalar(-1), Err(ControlError::VolumeOutOfRange(-1)));
        assert_eq!(percent_to_scalar(101), Err(ControlError::VolumeOutOfRange(101)));
    }

    #[test]
    fn converts_bounds_exactly() {
        assert_relative_eq!(percent_to_scalar(0).unwrap(), 0.0);
        assert_relative_eq!(percent_to_scalar(100).unwrap(), 1.0);
        assert_relative_eq!(percent_to_scalar(25).unwrap(), 0.25);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(scalar_to_percent(0.125), 13);
        assert_eq!(scalar_to_percent(0.124), 12);
    }

    #[test]
    fn averages_disagreeing_channels() {
        assert_eq!(average_percent(&[0.25, 0.75]), Some(50));
        assert_eq!(average_percent(&[0.3, 0.4]), Some(35));
        assert_eq!(average_percent(&[]), None);
    }

    #[test]
    fn mute_is_and_reduced() {
        assert!(all_muted(&[1, 1, 1]));
        assert!(!all_muted(&[1, 0, 1]));
        assert!(!all_muted(&[0, 0]));
        assert!(all_muted(&[2]));
    }
}
