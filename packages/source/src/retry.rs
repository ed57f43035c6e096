//! HTTP retry helpers for transient errors.
//!
//! Every upstream request goes through [`send_json`] or [`send_text`]
//! instead of calling `reqwest::RequestBuilder::send()` directly, so
//! timeouts, connection resets, rate limiting and server errors get
//! retried with exponential backoff.
//!
//! These retries live below the map: a request that still fails after
//! them is reported to the caller, which decides whether to try again.
//!
//! ```ignore
//! let states: Vec<IbgeState> =
//!     retry::send_json(|| client.get(&url), config.max_retries).await?;
//! ```

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::SourceError;

/// Delay before the first retry; doubles on each further attempt.
const BASE_DELAY: Duration = Duration::from_millis(500);

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 300;

/// Sends an HTTP request and decodes the response body as JSON.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`] (builders are consumed by `.send()`).
///
/// # Errors
///
/// Returns [`SourceError`] if the request fails after all retries, the
/// server returns a non-retryable status, or the body is not the expected
/// JSON.
pub async fn send_json<T, F>(build_request: F, max_retries: u32) -> Result<T, SourceError>
where
    T: DeserializeOwned,
    F: Fn() -> reqwest::RequestBuilder + Send + Sync,
{
    let response = send_inner(&build_request, max_retries).await?;
    let url = response.url().to_string();
    let text = response.text().await?;

    serde_json::from_str(&text).map_err(|e| {
        log::error!(
            "JSON decode failed\n  url: {url}\n  received: {} bytes\n  error: {e}\n  body preview: {}",
            text.len(),
            preview(&text),
        );
        SourceError::Json(e)
    })
}

/// Sends an HTTP request and returns the response body as a `String`.
///
/// Used for `GeoJSON` meshes, which are parsed by the geometry layer.
///
/// # Errors
///
/// Returns [`SourceError`] if the request fails after all retries or the
/// body cannot be read.
pub async fn send_text<F>(build_request: F, max_retries: u32) -> Result<String, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder + Send + Sync,
{
    let response = send_inner(&build_request, max_retries).await?;
    Ok(response.text().await?)
}

/// Core retry loop shared by [`send_json`] and [`send_text`].
///
/// Returns the first response with a 2xx/3xx status.
async fn send_inner<F>(build_request: &F, max_retries: u32) -> Result<reqwest::Response, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder + Send + Sync,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = backoff_delay(attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }
        let can_retry = attempt < max_retries;
        attempt += 1;

        match build_request().send().await {
            Err(e) => {
                if can_retry && is_transient(&e) {
                    log::warn!("  transient error: {e}");
                    continue;
                }
                return Err(SourceError::Http(e));
            }
            Ok(response) => {
                let status = response.status();
                if status.is_success() || status.is_redirection() {
                    return Ok(response);
                }

                if can_retry && is_retryable_status(status) {
                    log::warn!("  HTTP {status} from {}", response.url());
                    continue;
                }

                return Err(SourceError::Status {
                    status: status.as_u16(),
                    url: response.url().to_string(),
                });
            }
        }
    }
}

/// 429 and 5xx are worth retrying; every other 4xx is permanent.
#[must_use]
pub fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Delay before retry number `attempt` (1-based): 0.5s, 1s, 2s, ...
#[must_use]
pub fn backoff_delay(attempt: u32) -> Duration {
    BASE_DELAY.saturating_mul(1 << attempt.saturating_sub(1).min(10))
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}

fn preview(text: &str) -> &str {
    if text.len() <= BODY_PREVIEW_LEN {
        return text;
    }
    let mut end = BODY_PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn rate_limits_and_server_errors_are_retryable() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
    }

    #[test]
    fn client_errors_are_permanent() {
        assert!(!is_retryable_status(StatusCode::BAD_REQUEST));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(StatusCode::FORBIDDEN));
    }

    #[test]
    fn backoff_doubles() {
        assert_eq!(backoff_delay(1), Duration::from_millis(500));
        assert_eq!(backoff_delay(2), Duration::from_secs(1));
        assert_eq!(backoff_delay(3), Duration::from_secs(2));
        assert!(backoff_delay(u32::MAX) >= backoff_delay(11));
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let long = "ç".repeat(BODY_PREVIEW_LEN);
        let cut = preview(&long);
        assert!(cut.len() <= BODY_PREVIEW_LEN);
        assert!(cut.chars().all(|c| c == 'ç'));
        assert_eq!(preview("short"), "short");
    }

    #[tokio::test]
    async fn unreachable_host_fails_without_retrying() {
        let client = reqwest::Client::new();
        let result: Result<serde_json::Value, _> =
            send_json(|| client.get("http://127.0.0.1:9/unreachable"), 0).await;
        assert!(result.unwrap_err().is_network());
    }
}
