//! Time-boxed reuse of the last weather window.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use load_forecast::WeatherWindow;

use super::WeatherSource;
use crate::error::ServerResult;

struct CacheEntry {
    window: WeatherWindow,
    fetched_at: Instant,
}

/// Wraps a weather source and serves its last window until `ttl` elapses.
///
/// A zero `ttl` disables caching. Failed fetches are never cached.
pub struct CachedWeather<S> {
    inner: S,
    ttl: Duration,
    entry: Mutex<Option<CacheEntry>>,
}

impl<S: WeatherSource> CachedWeather<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entry: Mutex::new(None),
        }
    }
}

#[async_trait]
impl<S: WeatherSource> WeatherSource for CachedWeather<S> {
    async fn fetch_window(&self) -> ServerResult<WeatherWindow> {
        if self.ttl.is_zero() {
            return self.inner.fetch_window().await;
        }

        // Held across the fetch so concurrent misses trigger one upstream call.
        let mut entry = self.entry.lock().await;
        if let Some(cached) = entry.as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                tracing::debug!("Weather cache hit");
                return Ok(cached.window.clone());
            }
        }

        let window = self.inner.fetch_window().await?;
        *entry = Some(CacheEntry {
            window: window.clone(),
            fetched_at: Instant::now(),
        });
        Ok(window)
    }
}
