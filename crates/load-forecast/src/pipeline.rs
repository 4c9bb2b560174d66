//! One forecast request: synthesize, predict, align.

use crate::align::align;
use crate::calendar::HolidayCalendar;
use crate::features::synthesize;
use crate::model::LoadModel;
use crate::types::{ActualSeries, AlignedOutput, ForecastError, ForecastResult, WeatherWindow};

/// Run the full core on already-fetched inputs.
pub fn forecast(
    window: &WeatherWindow,
    actual: ActualSeries,
    model: &dyn LoadModel,
    calendar: &dyn HolidayCalendar,
) -> ForecastResult<AlignedOutput> {
    let synthesized = synthesize(window, calendar)?;

    let predicted = model.predict(&synthesized.features)?;
    if predicted.len() != synthesized.features.len() {
        return Err(ForecastError::PredictionLength {
            expected: synthesized.features.len(),
            actual: predicted.len(),
        });
    }

    let missing = actual.missing();
    let output = align(actual, predicted, synthesized.timestamps, window.start_time);

    tracing::info!(
        "Forecast ready: {} actual points ({} without load), {} predicted hours (shift {}h)",
        output.actual.len(),
        missing,
        output.predicted.len(),
        output.shift_hours
    );

    Ok(output)
}
