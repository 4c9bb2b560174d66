//! Core data types for weather windows, feature vectors, and load series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An hourly timestamp.
pub type TimePoint = DateTime<Utc>;

/// Hourly weather samples covering `[start_time, end_time)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherWindow {
    /// Air temperature at 2m, one sample per hour.
    pub temperature: Vec<f64>,
    /// Dew point at 2m, one sample per hour.
    pub dew_point: Vec<f64>,
    /// First hour of the window (inclusive).
    pub start_time: TimePoint,
    /// End of the window (exclusive).
    pub end_time: TimePoint,
}

impl WeatherWindow {
    pub fn new(
        temperature: Vec<f64>,
        dew_point: Vec<f64>,
        start_time: TimePoint,
        end_time: TimePoint,
    ) -> Self {
        Self {
            temperature,
            dew_point,
            start_time,
            end_time,
        }
    }

    /// Number of usable samples (the shorter of the two arrays).
    pub fn sample_count(&self) -> usize {
        self.temperature.len().min(self.dew_point.len())
    }
}

/// Model input for one hour. Field order matches the trained model's columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub temperature: f64,
    pub dew_point: f64,
    pub year: i32,
    pub month_sin: f64,
    pub month_cos: f64,
    pub weekday_sin: f64,
    pub weekday_cos: f64,
    pub hour_sin: f64,
    pub hour_cos: f64,
    pub week_sin: f64,
    pub week_cos: f64,
    pub day_sin: f64,
    pub day_cos: f64,
    /// Public holiday or Sunday.
    pub is_special_day: bool,
}

impl FeatureVector {
    /// Flatten into the model's column order.
    pub fn to_row(&self) -> [f32; crate::features::FEATURE_COUNT] {
        [
            self.temperature as f32,
            self.dew_point as f32,
            self.year as f32,
            self.month_sin as f32,
            self.month_cos as f32,
            self.weekday_sin as f32,
            self.weekday_cos as f32,
            self.hour_sin as f32,
            self.hour_cos as f32,
            self.week_sin as f32,
            self.week_cos as f32,
            self.day_sin as f32,
            self.day_cos as f32,
            if self.is_special_day { 1.0 } else { 0.0 },
        ]
    }
}

/// Output of the feature synthesizer: one vector per hour, plus the hours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedWindow {
    pub features: Vec<FeatureVector>,
    pub timestamps: Vec<TimePoint>,
}

impl SynthesizedWindow {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Observed load from the live-data provider.
///
/// A `None` load is an hour the provider reported without a value. It keeps
/// its place on the time axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActualSeries {
    pub points: Vec<(TimePoint, Option<f64>)>,
}

impl ActualSeries {
    pub fn new(points: Vec<(TimePoint, Option<f64>)>) -> Self {
        Self { points }
    }

    pub fn first_timestamp(&self) -> Option<TimePoint> {
        self.points.first().map(|(t, _)| *t)
    }

    /// Points that carry no load value.
    pub fn missing(&self) -> usize {
        self.points.iter().filter(|(_, v)| v.is_none()).count()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A labelled series with parallel timestamp and value sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSeries<V = f64> {
    pub name: String,
    pub timestamps: Vec<TimePoint>,
    pub values: Vec<V>,
}

impl<V> NamedSeries<V> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Actual and predicted load on a shared time axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedOutput {
    pub actual: NamedSeries<Option<f64>>,
    pub predicted: NamedSeries,
    /// Leading predicted hours dropped before the actual series begins.
    pub shift_hours: usize,
}

/// Errors that can occur in the forecasting core.
#[derive(thiserror::Error, Debug)]
pub enum ForecastError {
    #[error("Weather sample {index} out of range: only {available} samples available")]
    OutOfRange { index: usize, available: usize },

    #[error("Model error: {0}")]
    Model(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Model returned {actual} predictions for {expected} feature rows")]
    PredictionLength { expected: usize, actual: usize },

    #[error("Unsupported region: {0}")]
    UnsupportedRegion(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type ForecastResult<T> = Result<T, ForecastError>;
