//! Open-Meteo hourly forecast client.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use load_forecast::WeatherWindow;

use super::http::get_json;
use super::WeatherSource;
use crate::config::WeatherConfig;
use crate::error::{ServerError, ServerResult};

const PROVIDER: &str = "weather";
const HOURLY_VARIABLES: &str = "temperature_2m,dew_point_2m";
const INTERVAL_SECS: i64 = 3600;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: HourlyBlock,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Vec<i64>,
    temperature_2m: Vec<Option<f64>>,
    dew_point_2m: Vec<Option<f64>>,
}

/// Fetches temperature and dew point for a fixed location.
pub struct OpenMeteoClient {
    client: reqwest::Client,
    config: WeatherConfig,
}

impl OpenMeteoClient {
    pub fn new(client: reqwest::Client, config: WeatherConfig) -> Self {
        Self { client, config }
    }

    fn request(&self) -> reqwest::RequestBuilder {
        let url = format!("{}/v1/forecast", self.config.base_url.trim_end_matches('/'));
        self.client.get(url).query(&[
            ("latitude", self.config.latitude.to_string()),
            ("longitude", self.config.longitude.to_string()),
            ("hourly", HOURLY_VARIABLES.to_string()),
            ("past_days", self.config.past_days.to_string()),
            ("forecast_days", self.config.forecast_days.to_string()),
            ("timeformat", "unixtime".to_string()),
            // Window starts at UTC midnight; all feature and alignment math is UTC.
            ("timezone", "GMT".to_string()),
        ])
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn fetch_window(&self) -> ServerResult<WeatherWindow> {
        let response: ForecastResponse = get_json(PROVIDER, self.request()).await?;
        let window = into_window(response.hourly)?;
        tracing::info!(
            "Weather window {} .. {} ({} samples)",
            window.start_time,
            window.end_time,
            window.sample_count()
        );
        Ok(window)
    }
}

/// The window spans `[time[0], time[last] + 1h)`.
fn into_window(hourly: HourlyBlock) -> ServerResult<WeatherWindow> {
    let (first, last) = match (hourly.time.first(), hourly.time.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Err(ServerError::provider(PROVIDER, "hourly block has no timestamps")),
    };

    let start_time = from_unix(first)?;
    let end_time = from_unix(last)? + Duration::seconds(INTERVAL_SECS);

    let temperature = require_values("temperature_2m", hourly.temperature_2m)?;
    let dew_point = require_values("dew_point_2m", hourly.dew_point_2m)?;

    Ok(WeatherWindow::new(temperature, dew_point, start_time, end_time))
}

fn from_unix(secs: i64) -> ServerResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| ServerError::provider(PROVIDER, format!("timestamp {secs} out of range")))
}

fn require_values(variable: &str, values: Vec<Option<f64>>) -> ServerResult<Vec<f64>> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.ok_or_else(|| ServerError::provider(PROVIDER, format!("{variable} missing at hour {i}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const JAN_1_2024: i64 = 1_704_067_200;

    fn client_for(server: &MockServer) -> OpenMeteoClient {
        let config = WeatherConfig {
            base_url: server.uri(),
            ..WeatherConfig::default()
        };
        OpenMeteoClient::new(reqwest::Client::new(), config)
    }

    #[tokio::test]
    async fn test_fetch_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("hourly", HOURLY_VARIABLES))
            .and(query_param("timeformat", "unixtime"))
            .and(query_param("timezone", "GMT"))
            .and(query_param("past_days", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "latitude": 40.0,
                "longitude": -4.0,
                "hourly": {
                    "time": [JAN_1_2024, JAN_1_2024 + 3600, JAN_1_2024 + 7200],
                    "temperature_2m": [5.1, 4.8, 4.2],
                    "dew_point_2m": [1.0, 0.9, 0.7]
                }
            })))
            .mount(&server)
            .await;

        let window = client_for(&server).fetch_window().await.unwrap();
        assert_eq!(window.start_time, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(window.end_time, Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap());
        assert_eq!(window.temperature, vec![5.1, 4.8, 4.2]);
        assert_eq!(window.dew_point, vec![1.0, 0.9, 0.7]);
    }

    #[tokio::test]
    async fn test_upstream_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid latitude"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_window().await.unwrap_err();
        assert!(matches!(err, ServerError::Provider { provider: "weather", .. }));
        assert!(err.to_string().contains("invalid latitude"));
    }

    #[test]
    fn test_empty_hourly_rejected() {
        let hourly = HourlyBlock {
            time: vec![],
            temperature_2m: vec![],
            dew_point_2m: vec![],
        };
        assert!(into_window(hourly).is_err());
    }

    #[test]
    fn test_null_sample_rejected() {
        let hourly = HourlyBlock {
            time: vec![JAN_1_2024, JAN_1_2024 + 3600],
            temperature_2m: vec![Some(3.0), None],
            dew_point_2m: vec![Some(1.0), Some(1.0)],
        };
        let err = into_window(hourly).unwrap_err();
        assert!(err.to_string().contains("temperature_2m missing at hour 1"));
    }
}
