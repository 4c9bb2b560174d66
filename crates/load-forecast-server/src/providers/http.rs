//! Shared reqwest plumbing for the provider clients.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::{ServerError, ServerResult};

const USER_AGENT: &str = concat!("load-forecast-server/", env!("CARGO_PKG_VERSION"));

/// Build an HTTP client with the given request timeout.
pub fn build_client(timeout_ms: u64) -> ServerResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .redirect(reqwest::redirect::Policy::limited(5))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Send a prepared GET and decode a JSON body.
///
/// Non-2xx statuses become a provider error carrying the status and a
/// snippet of the body. No retries.
pub async fn get_json<T: DeserializeOwned>(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> ServerResult<T> {
    let response = request.send().await?;
    let status = response.status();
    let url = response.url().to_string();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(200).collect();
        return Err(ServerError::provider(
            provider,
            format!("{url} returned {status}: {snippet}"),
        ));
    }

    tracing::debug!("{provider}: {url} returned {status}");

    let body = response.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| ServerError::provider(provider, format!("malformed response from {url}: {e}")))
}
