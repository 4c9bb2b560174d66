//! Load forecast — weather feature synthesis, model inference, and series alignment.

pub mod align;
pub mod calendar;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod types;

pub use align::{align, shift_hours, ACTUAL_LOAD, PREDICTED_LOAD};
pub use calendar::{easter_sunday, HolidayCalendar, HolidaySet, NationalCalendar};
pub use features::{encode, hour_points, hours_in_window, synthesize, FEATURE_COUNT, FEATURE_NAMES};
pub use model::{LoadModel, OnnxLoadModel};
pub use pipeline::forecast;
pub use types::*;
