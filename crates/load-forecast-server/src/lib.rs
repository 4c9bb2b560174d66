//! Load forecast server — actual vs predicted regional electricity load over HTTP.

pub mod chart;
pub mod config;
pub mod error;
pub mod providers;
pub mod routes;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use routes::{router, run_forecast, serve, AppState};
