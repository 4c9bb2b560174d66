//! Plotly-style chart payload for an aligned forecast.

use serde::Serialize;

use load_forecast::{AlignedOutput, NamedSeries, TimePoint};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One scatter trace: parallel `x` timestamps and `y` values.
///
/// A `null` in `y` is an hour without a reading; the chart draws a gap there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartTrace {
    pub x: Vec<String>,
    pub y: Vec<Option<f64>>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
}

impl ChartTrace {
    pub fn scatter<V: Copy + Into<Option<f64>>>(series: &NamedSeries<V>) -> Self {
        Self {
            x: series.timestamps.iter().map(format_timestamp).collect(),
            y: series.values.iter().map(|&v| v.into()).collect(),
            kind: "scatter",
            name: series.name.clone(),
        }
    }
}

/// The two traces, actual first.
pub fn traces(output: &AlignedOutput) -> Vec<ChartTrace> {
    vec![
        ChartTrace::scatter(&output.actual),
        ChartTrace::scatter(&output.predicted),
    ]
}

pub fn format_timestamp(t: &TimePoint) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}
