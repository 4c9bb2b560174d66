//! Electricity Maps power-breakdown history client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use load_forecast::ActualSeries;

use super::http::get_json;
use super::LoadSource;
use crate::config::LoadConfig;
use crate::error::ServerResult;

const PROVIDER: &str = "load";

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    history: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryEntry {
    datetime: DateTime<Utc>,
    power_consumption_total: Option<f64>,
}

/// Fetches the last 24 hours of total consumption for a zone.
pub struct ElectricityMapsClient {
    client: reqwest::Client,
    config: LoadConfig,
}

impl ElectricityMapsClient {
    pub fn new(client: reqwest::Client, config: LoadConfig) -> Self {
        Self { client, config }
    }

    fn request(&self) -> reqwest::RequestBuilder {
        let url = format!(
            "{}/v3/power-breakdown/history",
            self.config.base_url.trim_end_matches('/')
        );
        let request = self.client.get(url).query(&[("zone", &self.config.zone)]);
        match &self.config.token {
            Some(token) => request.header("auth-token", token),
            None => request,
        }
    }
}

#[async_trait]
impl LoadSource for ElectricityMapsClient {
    async fn fetch_actual(&self) -> ServerResult<ActualSeries> {
        let response: HistoryResponse = get_json(PROVIDER, self.request()).await?;

        let actual = ActualSeries::new(
            response
                .history
                .into_iter()
                .map(|e| (e.datetime, e.power_consumption_total))
                .collect(),
        );

        let missing = actual.missing();
        if missing > 0 {
            tracing::warn!(
                "{missing} of {} history entries for {} had no consumption total",
                actual.len(),
                self.config.zone
            );
        }
        tracing::info!("Actual load: {} points for {}", actual.len(), self.config.zone);

        Ok(actual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use load_forecast::{align, hour_points};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, token: Option<&str>) -> ElectricityMapsClient {
        let config = LoadConfig {
            base_url: server.uri(),
            zone: "ES".to_string(),
            token: token.map(str::to_string),
        };
        ElectricityMapsClient::new(reqwest::Client::new(), config)
    }

    #[tokio::test]
    async fn test_fetch_actual_keeps_every_entry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/power-breakdown/history"))
            .and(query_param("zone", "ES"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "zone": "ES",
                "history": [
                    { "datetime": "2024-01-01T05:00:00.000Z", "powerConsumptionTotal": 24100.0 },
                    { "datetime": "2024-01-01T06:00:00.000Z", "powerConsumptionTotal": null },
                    { "datetime": "2024-01-01T07:00:00.000Z", "powerConsumptionTotal": 26350 }
                ]
            })))
            .mount(&server)
            .await;

        let actual = client_for(&server, None).fetch_actual().await.unwrap();
        assert_eq!(actual.len(), 3);
        assert_eq!(actual.missing(), 1);
        assert_eq!(actual.points[0].1, Some(24_100.0));
        assert_eq!(actual.points[1].1, None);
        assert_eq!(actual.points[2].1, Some(26_350.0));
    }

    #[tokio::test]
    async fn test_leading_missing_totals_keep_first_timestamp() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/power-breakdown/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "zone": "ES",
                "history": [
                    { "datetime": "2024-01-01T05:00:00.000Z", "powerConsumptionTotal": null },
                    { "datetime": "2024-01-01T06:00:00.000Z", "powerConsumptionTotal": null },
                    { "datetime": "2024-01-01T07:00:00.000Z", "powerConsumptionTotal": 26350 }
                ]
            })))
            .mount(&server)
            .await;

        let actual = client_for(&server, None).fetch_actual().await.unwrap();
        let window_start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            actual.first_timestamp(),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 5, 0, 0).unwrap())
        );

        let hours = hour_points(window_start, window_start + Duration::hours(10));
        let out = align(actual, vec![0.0; hours.len()], hours, window_start);
        assert_eq!(out.shift_hours, 5);
        assert_eq!(out.actual.values, vec![None, None, Some(26_350.0)]);
    }

    #[tokio::test]
    async fn test_sends_auth_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("auth-token", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "history": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let actual = client_for(&server, Some("secret")).fetch_actual().await.unwrap();
        assert!(actual.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server, None).fetch_actual().await.unwrap_err();
        assert!(err.to_string().contains("malformed response"));
    }
}
