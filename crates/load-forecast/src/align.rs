//! Stitching the predicted series onto the actual series' time axis.

use crate::types::{ActualSeries, AlignedOutput, NamedSeries, TimePoint};

/// Label of the observed series.
pub const ACTUAL_LOAD: &str = "Actual Load";

/// Label of the forecast series.
pub const PREDICTED_LOAD: &str = "Predicted Load";

const SECONDS_PER_HOUR: i64 = 3600;

/// Whole hours from `window_start` to `actual_start`, floored, never negative.
pub fn shift_hours(actual_start: TimePoint, window_start: TimePoint) -> usize {
    let secs = (actual_start - window_start).num_seconds();
    secs.div_euclid(SECONDS_PER_HOUR).max(0) as usize
}

/// Drop the predicted hours that fall before the actual series begins.
///
/// The actual series is passed through untouched. A shift past the end of the
/// prediction leaves the predicted series empty; this never fails.
pub fn align(
    actual: ActualSeries,
    predicted: Vec<f64>,
    predicted_timestamps: Vec<TimePoint>,
    window_start: TimePoint,
) -> AlignedOutput {
    let shift = actual
        .first_timestamp()
        .map(|first| shift_hours(first, window_start))
        .unwrap_or(0);

    let len = predicted.len().min(predicted_timestamps.len());
    let cut = shift.min(len);

    let (actual_ts, actual_values): (Vec<_>, Vec<_>) = actual.points.into_iter().unzip();

    tracing::debug!(
        "Aligning {} predicted hours against {} actual points (shift {shift}h)",
        len,
        actual_values.len()
    );

    AlignedOutput {
        actual: NamedSeries {
            name: ACTUAL_LOAD.to_string(),
            timestamps: actual_ts,
            values: actual_values,
        },
        predicted: NamedSeries {
            name: PREDICTED_LOAD.to_string(),
            timestamps: predicted_timestamps[cut..len].to_vec(),
            values: predicted[cut..len].to_vec(),
        },
        shift_hours: shift,
    }
}
