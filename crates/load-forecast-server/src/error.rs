//! Error types and HTTP error mapping for the forecast server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

/// Stable error codes returned in error bodies.
pub mod error_codes {
    pub const WEATHER_OUT_OF_RANGE: &str = "E_WEATHER_OUT_OF_RANGE";
    pub const MODEL: &str = "E_MODEL";
    pub const PROVIDER: &str = "E_PROVIDER";
    pub const CONFIG: &str = "E_CONFIG";
    pub const INTERNAL: &str = "E_INTERNAL";
}

/// All errors that can occur while serving a forecast.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("Forecast error: {0}")]
    Forecast(#[from] load_forecast::ForecastError),

    #[error("{provider} provider error: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ServerError {
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        ServerError::Provider {
            provider,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        use error_codes::*;
        use load_forecast::ForecastError;
        match self {
            ServerError::Forecast(ForecastError::OutOfRange { .. }) => WEATHER_OUT_OF_RANGE,
            ServerError::Forecast(
                ForecastError::Model(_)
                | ForecastError::ModelNotAvailable(_)
                | ForecastError::PredictionLength { .. },
            ) => MODEL,
            ServerError::Forecast(_) => INTERNAL,
            ServerError::Provider { .. } | ServerError::Http(_) => PROVIDER,
            ServerError::Config(_) => CONFIG,
            ServerError::Join(_) => INTERNAL,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Provider { .. } | ServerError::Http(_) => StatusCode::BAD_GATEWAY,
            // Weather shorter than its own window is bad upstream data.
            ServerError::Forecast(load_forecast::ForecastError::OutOfRange { .. }) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {self}");
        (
            self.status(),
            Json(serde_json::json!({
                "error": {
                    "code": self.code(),
                    "message": self.to_string(),
                }
            })),
        )
            .into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
