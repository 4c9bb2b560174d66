//! HTTP routes for the forecast server.
//!
//! `GET /` returns the actual and predicted load as two chart traces.
//! `GET /health` reports liveness and what the server was started with.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tracing::Instrument;

use load_forecast::{AlignedOutput, HolidayCalendar, LoadModel};

use crate::chart::{traces, ChartTrace};
use crate::error::ServerResult;
use crate::providers::{LoadSource, WeatherSource};

/// Everything a request needs, built once at startup.
pub struct AppState {
    pub model: Arc<dyn LoadModel>,
    pub calendar: Arc<dyn HolidayCalendar>,
    pub weather: Arc<dyn WeatherSource>,
    pub load: Arc<dyn LoadSource>,
    /// Shown on /health, e.g. the model file path.
    pub model_label: String,
    pub region: String,
}

/// Fetch both inputs, then run synthesis, inference and alignment.
pub async fn run_forecast(state: &AppState) -> ServerResult<AlignedOutput> {
    let (window, actual) = tokio::try_join!(state.weather.fetch_window(), state.load.fetch_actual())?;

    let model = Arc::clone(&state.model);
    let calendar = Arc::clone(&state.calendar);

    // Inference is CPU-bound; keep it off the async workers.
    let output = tokio::task::spawn_blocking(move || {
        load_forecast::forecast(&window, actual, model.as_ref(), calendar.as_ref())
    })
    .await??;

    Ok(output)
}

/// Build the axum Router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_chart))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

/// Serve until the process is stopped.
pub async fn serve(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Forecast server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn handle_chart(State(state): State<Arc<AppState>>) -> ServerResult<Json<Vec<ChartTrace>>> {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("forecast", %request_id);

    let output = run_forecast(&state).instrument(span).await?;
    Ok(Json(traces(&output)))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.model_label,
        "region": state.region,
    }))
}
