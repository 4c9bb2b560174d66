//! Feature synthesis: hourly weather samples into model-ready feature vectors.
//!
//! Every hour of the window gets the two weather readings, the calendar year,
//! sine/cosine encodings of month, weekday, hour, ISO week and day of month,
//! and a special-day flag (public holiday or Sunday).
//!
//! The encodings must match what the model was trained on, including two
//! quirks: the hour is shifted by one before encoding (so 23:00 encodes like
//! midnight), and the day of month is always divided by 30.

use std::f64::consts::PI;

use chrono::{Datelike, Duration, Timelike, Weekday};

use crate::calendar::HolidayCalendar;
use crate::types::{
    FeatureVector, ForecastError, ForecastResult, SynthesizedWindow, TimePoint, WeatherWindow,
};

/// Number of columns in a feature row.
pub const FEATURE_COUNT: usize = 14;

/// Column names, in model order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "temperature",
    "dew_point",
    "year",
    "month_sin",
    "month_cos",
    "weekday_sin",
    "weekday_cos",
    "hour_sin",
    "hour_cos",
    "week_sin",
    "week_cos",
    "day_sin",
    "day_cos",
    "is_special_day",
];

const MONTHS_PER_YEAR: f64 = 12.0;
const ISO_WEEKS_PER_YEAR: f64 = 53.0;
const DAYS_PER_WEEK: f64 = 7.0;
const HOURS_PER_DAY: f64 = 24.0;
const DAYS_PER_MONTH: f64 = 30.0;

/// Number of whole or partial hours in `[start, end)`. Zero when `start >= end`.
pub fn hours_in_window(start: TimePoint, end: TimePoint) -> usize {
    if start >= end {
        return 0;
    }
    let span = end - start;
    let secs = span.num_seconds();
    let partial = secs % 3600 != 0 || span.subsec_nanos() != 0;
    (secs / 3600) as usize + usize::from(partial)
}

/// The hourly timestamps of `[start, end)`, beginning at `start`.
pub fn hour_points(start: TimePoint, end: TimePoint) -> Vec<TimePoint> {
    let mut points = Vec::with_capacity(hours_in_window(start, end));
    let mut t = start;
    while t < end {
        points.push(t);
        t += Duration::hours(1);
    }
    points
}

/// Build the feature vector for a single hour.
pub fn encode(
    t: TimePoint,
    temperature: f64,
    dew_point: f64,
    calendar: &dyn HolidayCalendar,
) -> FeatureVector {
    let month = t.month() as f64;
    let week = t.iso_week().week() as f64;
    let weekday = t.weekday().number_from_monday() as f64;
    let hour = (t.hour() + 1) as f64;
    let day = t.day() as f64;

    let (month_sin, month_cos) = cyclical(month, MONTHS_PER_YEAR);
    let (week_sin, week_cos) = cyclical(week, ISO_WEEKS_PER_YEAR);
    let (weekday_sin, weekday_cos) = cyclical(weekday, DAYS_PER_WEEK);
    let (hour_sin, hour_cos) = cyclical(hour, HOURS_PER_DAY);
    let (day_sin, day_cos) = cyclical(day, DAYS_PER_MONTH);

    let is_special_day = t.weekday() == Weekday::Sun || calendar.is_holiday(t.date_naive());

    FeatureVector {
        temperature,
        dew_point,
        year: t.year(),
        month_sin,
        month_cos,
        weekday_sin,
        weekday_cos,
        hour_sin,
        hour_cos,
        week_sin,
        week_cos,
        day_sin,
        day_cos,
        is_special_day,
    }
}

/// Produce one feature vector per hour of the window, with matching timestamps.
///
/// An empty or inverted window yields empty sequences. Fails with
/// [`ForecastError::OutOfRange`] if either weather array is shorter than the
/// number of hours in the window.
pub fn synthesize(
    window: &WeatherWindow,
    calendar: &dyn HolidayCalendar,
) -> ForecastResult<SynthesizedWindow> {
    let required = hours_in_window(window.start_time, window.end_time);
    let available = window.sample_count();
    if available < required {
        return Err(ForecastError::OutOfRange {
            index: available,
            available,
        });
    }

    let timestamps = hour_points(window.start_time, window.end_time);
    let features = timestamps
        .iter()
        .enumerate()
        .map(|(i, &t)| encode(t, window.temperature[i], window.dew_point[i], calendar))
        .collect::<Vec<_>>();

    tracing::debug!(
        "Synthesized {} feature rows from {} to {}",
        features.len(),
        window.start_time,
        window.end_time
    );

    Ok(SynthesizedWindow {
        features,
        timestamps,
    })
}

fn cyclical(value: f64, period: f64) -> (f64, f64) {
    let angle = value / period * 2.0 * PI;
    (angle.sin(), angle.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::HolidaySet;
    use chrono::{NaiveDate, TimeZone, Utc};

    const EPS: f64 = 1e-9;

    fn at(y: i32, m: u32, d: u32, h: u32) -> TimePoint {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn no_holidays() -> HolidaySet {
        HolidaySet::default()
    }

    fn window(start: TimePoint, end: TimePoint, samples: usize) -> WeatherWindow {
        WeatherWindow::new(
            (0..samples).map(|i| 10.0 + i as f64).collect(),
            (0..samples).map(|i| 2.0 + i as f64).collect(),
            start,
            end,
        )
    }

    #[test]
    fn test_new_year_scenario() {
        let start = at(2024, 1, 1, 0);
        let end = at(2024, 1, 1, 3);
        let cal = HolidaySet::new([NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()]);

        let out = synthesize(&window(start, end, 3), &cal).unwrap();
        assert_eq!(out.features.len(), 3);
        assert_eq!(
            out.timestamps,
            vec![at(2024, 1, 1, 0), at(2024, 1, 1, 1), at(2024, 1, 1, 2)]
        );
        for f in &out.features {
            assert_eq!(f.year, 2024);
            assert!((f.month_sin - (PI / 6.0).sin()).abs() < EPS);
            assert!(f.is_special_day);
        }
        assert_eq!(out.features[1].temperature, 11.0);
        assert_eq!(out.features[2].dew_point, 4.0);
    }

    #[test]
    fn test_counts_match_ceil_of_window() {
        let start = at(2024, 3, 10, 0);
        let end = start + Duration::minutes(150);
        assert_eq!(hours_in_window(start, end), 3);

        let out = synthesize(&window(start, end, 5), &no_holidays()).unwrap();
        assert_eq!(out.features.len(), 3);
        assert_eq!(out.timestamps.len(), 3);
    }

    #[test]
    fn test_timestamps_strictly_hourly() {
        let start = at(2024, 2, 28, 20);
        let end = at(2024, 3, 1, 4);
        let out = synthesize(&window(start, end, 40), &no_holidays()).unwrap();

        assert_eq!(out.timestamps[0], start);
        for pair in out.timestamps.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::hours(1));
        }
        assert_eq!(out.len(), 32);
    }

    #[test]
    fn test_empty_and_inverted_windows() {
        let t = at(2024, 6, 1, 12);
        let out = synthesize(&window(t, t, 0), &no_holidays()).unwrap();
        assert!(out.is_empty());

        let out = synthesize(&window(t, t - Duration::hours(5), 0), &no_holidays()).unwrap();
        assert!(out.features.is_empty());
        assert_eq!(hours_in_window(t, t - Duration::hours(5)), 0);
    }

    #[test]
    fn test_short_weather_fails_out_of_range() {
        let start = at(2024, 1, 1, 0);
        let end = at(2024, 1, 1, 5);
        let err = synthesize(&window(start, end, 4), &no_holidays()).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::OutOfRange {
                index: 4,
                available: 4
            }
        ));
    }

    #[test]
    fn test_mismatched_arrays_use_shorter() {
        let start = at(2024, 1, 1, 0);
        let end = at(2024, 1, 1, 3);
        let w = WeatherWindow::new(vec![1.0; 3], vec![1.0; 2], start, end);
        assert!(matches!(
            synthesize(&w, &no_holidays()),
            Err(ForecastError::OutOfRange { available: 2, .. })
        ));
    }

    #[test]
    fn test_hour_shift_wraps_at_23() {
        let f = encode(at(2024, 4, 10, 23), 0.0, 0.0, &no_holidays());
        assert!(f.hour_sin.abs() < EPS);
        assert!((f.hour_cos - 1.0).abs() < EPS);

        // Midnight encodes as hour 1
        let f = encode(at(2024, 4, 10, 0), 0.0, 0.0, &no_holidays());
        assert!((f.hour_sin - (2.0 * PI / 24.0).sin()).abs() < EPS);
    }

    #[test]
    fn test_day_uses_fixed_thirty() {
        let f = encode(at(2024, 1, 31, 0), 0.0, 0.0, &no_holidays());
        assert!((f.day_sin - (2.0 * PI * 31.0 / 30.0).sin()).abs() < EPS);

        let f = encode(at(2024, 1, 30, 0), 0.0, 0.0, &no_holidays());
        assert!(f.day_sin.abs() < EPS);
        assert!((f.day_cos - 1.0).abs() < EPS);
    }

    #[test]
    fn test_weekday_and_week_encoding() {
        // 2024-01-07 is a Sunday in ISO week 1
        let f = encode(at(2024, 1, 7, 12), 0.0, 0.0, &no_holidays());
        assert!(f.weekday_sin.abs() < EPS);
        assert!((f.weekday_cos - 1.0).abs() < EPS);
        assert!((f.week_sin - (2.0 * PI / 53.0).sin()).abs() < EPS);

        // 2020-12-31 falls in ISO week 53
        let f = encode(at(2020, 12, 31, 12), 0.0, 0.0, &no_holidays());
        assert!(f.week_sin.abs() < EPS);
    }

    #[test]
    fn test_sundays_always_special() {
        let cal = no_holidays();
        let mut t = at(2024, 1, 7, 0);
        for _ in 0..10 {
            assert!(encode(t, 0.0, 0.0, &cal).is_special_day);
            assert!(!encode(t + Duration::days(1), 0.0, 0.0, &cal).is_special_day);
            t += Duration::weeks(1);
        }
    }

    #[test]
    fn test_holiday_dates_special() {
        let cal = HolidaySet::new([NaiveDate::from_ymd_opt(2024, 8, 15).unwrap()]);
        for h in 0..24 {
            assert!(encode(at(2024, 8, 15, h), 0.0, 0.0, &cal).is_special_day);
        }
        assert!(!encode(at(2024, 8, 16, 0), 0.0, 0.0, &cal).is_special_day);
    }

    #[test]
    fn test_row_order_matches_names() {
        let f = encode(at(2024, 1, 7, 5), 21.5, 7.25, &no_holidays());
        let row = f.to_row();
        assert_eq!(row.len(), FEATURE_NAMES.len());
        assert_eq!(row[0], 21.5);
        assert_eq!(row[1], 7.25);
        assert_eq!(row[2], 2024.0);
        assert_eq!(row[7], f.hour_sin as f32);
        assert_eq!(row[13], 1.0);
    }
}
