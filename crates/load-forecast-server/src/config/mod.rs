//! Configuration loading and resolution.
//!
//! Every setting resolves in the same order: explicit CLI value, then
//! environment variable, then a built-in default.

use std::path::{Path, PathBuf};

use load_forecast::{HolidaySet, NationalCalendar};

use crate::error::{ServerError, ServerResult};

pub const DEFAULT_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_REGION: &str = "ES";
pub const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com";
pub const DEFAULT_LOAD_URL: &str = "https://api.electricitymap.org";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_WEATHER_CACHE_SECS: u64 = 3600;

const MODEL_FILENAME: &str = "model.onnx";
const MODEL_DIR: &str = ".load-forecast";

/// Open-Meteo query settings.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherConfig {
    pub base_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub past_days: u32,
    pub forecast_days: u32,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_URL.to_string(),
            latitude: 40.0,
            longitude: -4.0,
            past_days: 2,
            forecast_days: 3,
        }
    }
}

/// Electricity Maps query settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadConfig {
    pub base_url: String,
    pub zone: String,
    pub token: Option<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LOAD_URL.to_string(),
            zone: DEFAULT_REGION.to_string(),
            token: None,
        }
    }
}

/// Fully resolved server settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: String,
    pub model_path: PathBuf,
    pub region: String,
    pub holidays_path: Option<PathBuf>,
    pub weather: WeatherConfig,
    pub load: LoadConfig,
    pub timeout_ms: u64,
    pub weather_cache_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            model_path: PathBuf::from(MODEL_FILENAME),
            region: DEFAULT_REGION.to_string(),
            holidays_path: None,
            weather: WeatherConfig::default(),
            load: LoadConfig::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            weather_cache_secs: DEFAULT_WEATHER_CACHE_SECS,
        }
    }
}

impl ServerConfig {
    /// National calendar for the configured region, plus any extra dates file.
    pub fn calendar(&self) -> ServerResult<NationalCalendar> {
        let calendar = NationalCalendar::for_region(&self.region)?;
        match &self.holidays_path {
            Some(path) => {
                let extra = load_holidays(path)?;
                tracing::info!("Extra holidays: {} dates from {}", extra.len(), path.display());
                Ok(calendar.with_extra_dates(extra.iter()))
            }
            None => Ok(calendar),
        }
    }
}

fn load_holidays(path: &Path) -> ServerResult<HolidaySet> {
    if !path.exists() {
        return Err(ServerError::Config(format!(
            "holidays file not found: {}",
            path.display()
        )));
    }
    Ok(HolidaySet::from_json_file(path)?)
}

/// Pick the first of explicit value, environment value, default.
fn pick(explicit: Option<&str>, env: Option<String>, default: &str) -> String {
    explicit
        .map(str::to_string)
        .or(env)
        .unwrap_or_else(|| default.to_string())
}

/// Resolve the listen address.
pub fn resolve_addr(explicit: Option<&str>) -> String {
    pick(explicit, std::env::var("LOAD_FORECAST_ADDR").ok(), DEFAULT_ADDR)
}

/// Resolve the region code used for the holiday calendar.
pub fn resolve_region(explicit: Option<&str>) -> String {
    pick(explicit, std::env::var("LOAD_FORECAST_REGION").ok(), DEFAULT_REGION)
}

/// Resolve the Open-Meteo base URL.
pub fn resolve_weather_url(explicit: Option<&str>) -> String {
    pick(
        explicit,
        std::env::var("LOAD_FORECAST_WEATHER_URL").ok(),
        DEFAULT_WEATHER_URL,
    )
}

/// Resolve the Electricity Maps base URL.
pub fn resolve_load_url(explicit: Option<&str>) -> String {
    pick(
        explicit,
        std::env::var("LOAD_FORECAST_LOAD_URL").ok(),
        DEFAULT_LOAD_URL,
    )
}

/// Resolve the Electricity Maps auth token, if any.
pub fn resolve_load_token(explicit: Option<&str>) -> Option<String> {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var("ELECTRICITYMAPS_TOKEN").ok())
        .filter(|t| !t.is_empty())
}

/// Resolve the extra holidays file, if any.
pub fn resolve_holidays_path(explicit: Option<&str>) -> Option<PathBuf> {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var("LOAD_FORECAST_HOLIDAYS").ok())
        .map(PathBuf::from)
}

/// Resolve the ONNX model path.
pub fn resolve_model_path(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var("LOAD_FORECAST_MODEL") {
        return PathBuf::from(env_path);
    }

    let cwd_model = PathBuf::from(MODEL_FILENAME);
    if cwd_model.exists() {
        return cwd_model;
    }

    resolve_default_model_path()
}

fn resolve_default_model_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());

    PathBuf::from(home).join(MODEL_DIR).join(MODEL_FILENAME)
}
