//! Load forecast server — entry point.

use std::sync::Arc;
use std::time::Duration;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use load_forecast::{synthesize, OnnxLoadModel, FEATURE_NAMES};
use load_forecast_server::chart::{format_timestamp, traces};
use load_forecast_server::config::{
    self, LoadConfig, ServerConfig, WeatherConfig, DEFAULT_TIMEOUT_MS, DEFAULT_WEATHER_CACHE_SECS,
};
use load_forecast_server::providers::{
    http::build_client, CachedWeather, ElectricityMapsClient, OpenMeteoClient, WeatherSource,
};
use load_forecast_server::routes::{run_forecast, serve, AppState};

#[derive(Parser)]
#[command(
    name = "load-forecast-server",
    about = "Actual vs predicted regional electricity load, served as chart-ready JSON",
    version
)]
struct Cli {
    #[command(flatten)]
    options: Options,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Options {
    /// Listen address (host:port). Also reads LOAD_FORECAST_ADDR.
    #[arg(long)]
    addr: Option<String>,

    /// Path to the ONNX load model. Also reads LOAD_FORECAST_MODEL.
    #[arg(long)]
    model: Option<String>,

    /// Holiday region code. Also reads LOAD_FORECAST_REGION.
    #[arg(long)]
    region: Option<String>,

    /// JSON array of extra holiday dates (YYYY-MM-DD). Also reads LOAD_FORECAST_HOLIDAYS.
    #[arg(long)]
    holidays: Option<String>,

    /// Forecast location latitude.
    #[arg(long, default_value_t = 40.0, allow_negative_numbers = true)]
    latitude: f64,

    /// Forecast location longitude.
    #[arg(long, default_value_t = -4.0, allow_negative_numbers = true)]
    longitude: f64,

    /// Days of past weather to include.
    #[arg(long, default_value_t = 2)]
    past_days: u32,

    /// Days of forecast weather to include.
    #[arg(long, default_value_t = 3)]
    forecast_days: u32,

    /// Open-Meteo base URL. Also reads LOAD_FORECAST_WEATHER_URL.
    #[arg(long)]
    weather_url: Option<String>,

    /// Electricity Maps base URL. Also reads LOAD_FORECAST_LOAD_URL.
    #[arg(long)]
    load_url: Option<String>,

    /// Electricity Maps zone.
    #[arg(long, default_value = "ES")]
    zone: String,

    /// Electricity Maps auth token. Also reads ELECTRICITYMAPS_TOKEN.
    #[arg(long)]
    load_token: Option<String>,

    /// Upstream request timeout in milliseconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Seconds to reuse a fetched weather window (0 disables).
    #[arg(long, default_value_t = DEFAULT_WEATHER_CACHE_SECS)]
    weather_cache_secs: u64,
}

impl Options {
    fn resolve(self) -> ServerConfig {
        ServerConfig {
            addr: config::resolve_addr(self.addr.as_deref()),
            model_path: config::resolve_model_path(self.model.as_deref()),
            region: config::resolve_region(self.region.as_deref()),
            holidays_path: config::resolve_holidays_path(self.holidays.as_deref()),
            weather: WeatherConfig {
                base_url: config::resolve_weather_url(self.weather_url.as_deref()),
                latitude: self.latitude,
                longitude: self.longitude,
                past_days: self.past_days,
                forecast_days: self.forecast_days,
            },
            load: LoadConfig {
                base_url: config::resolve_load_url(self.load_url.as_deref()),
                zone: self.zone,
                token: config::resolve_load_token(self.load_token.as_deref()),
            },
            timeout_ms: self.timeout_ms,
            weather_cache_secs: self.weather_cache_secs,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default).
    Serve,

    /// Fetch, predict once, and print the chart JSON.
    Forecast,

    /// Fetch the weather window and print its feature matrix as JSON.
    Features,

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

fn weather_source(config: &ServerConfig, client: reqwest::Client) -> Arc<dyn WeatherSource> {
    let source = OpenMeteoClient::new(client, config.weather.clone());
    Arc::new(CachedWeather::new(
        source,
        Duration::from_secs(config.weather_cache_secs),
    ))
}

/// Load the model and wire up providers once, for the life of the process.
fn build_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    let client = build_client(config.timeout_ms)?;
    let model = OnnxLoadModel::load(&config.model_path)?;
    let calendar = config.calendar()?;

    Ok(AppState {
        model: Arc::new(model),
        calendar: Arc::new(calendar),
        weather: weather_source(config, client.clone()),
        load: Arc::new(ElectricityMapsClient::new(client, config.load.clone())),
        model_label: config.model_path.display().to_string(),
        region: config.region.clone(),
    })
}

async fn print_features(config: &ServerConfig) -> anyhow::Result<()> {
    let client = build_client(config.timeout_ms)?;
    let calendar = config.calendar()?;
    let window = weather_source(config, client).fetch_window().await?;
    let synthesized = synthesize(&window, &calendar)?;

    let rows: Vec<_> = synthesized.features.iter().map(|f| f.to_row()).collect();
    let timestamps: Vec<_> = synthesized.timestamps.iter().map(format_timestamp).collect();
    let matrix = serde_json::json!({
        "columns": FEATURE_NAMES,
        "timestamps": timestamps,
        "rows": rows,
    });
    println!("{}", serde_json::to_string_pretty(&matrix)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.options.resolve();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            tracing::info!("Load forecast server");
            tracing::info!("Model: {}", config.model_path.display());
            tracing::info!("Region: {}", config.region);
            let state = build_state(&config)?;
            serve(&config.addr, Arc::new(state)).await?;
        }

        Commands::Forecast => {
            let state = build_state(&config)?;
            let output = run_forecast(&state).await?;
            println!("{}", serde_json::to_string_pretty(&traces(&output))?);
        }

        Commands::Features => {
            print_features(&config).await?;
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(
                shell,
                &mut cmd,
                "load-forecast-server",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}
