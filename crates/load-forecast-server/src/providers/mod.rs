//! Upstream data providers: weather forecast and observed load.
//!
//! Both are traits so the request path can run against fakes in tests.

pub mod cache;
pub mod electricity_maps;
pub mod http;
pub mod open_meteo;

use async_trait::async_trait;
use load_forecast::{ActualSeries, WeatherWindow};

use crate::error::ServerResult;

pub use cache::CachedWeather;
pub use electricity_maps::ElectricityMapsClient;
pub use open_meteo::OpenMeteoClient;

/// Source of the hourly weather window the forecast is computed over.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_window(&self) -> ServerResult<WeatherWindow>;
}

/// Source of the observed load series.
#[async_trait]
pub trait LoadSource: Send + Sync {
    async fn fetch_actual(&self) -> ServerResult<ActualSeries>;
}
