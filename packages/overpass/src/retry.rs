//! HTTP retry helper for transient Overpass failures.
//!
//! The public Overpass instances shed load with 429 and 504 responses,
//! so the interpreter call goes through [`send_json`] which retries
//! connection errors, timeouts, 429 and 5xx with exponential backoff
//! (2s, 4s, ...). Other 4xx responses are permanent and returned
//! immediately.

use std::time::Duration;

use crate::OverpassError;

/// Sends the request built by `build_request` and parses the body as
/// JSON, retrying transient failures up to `max_retries` times.
///
/// The closure is called once per attempt because a
/// [`reqwest::RequestBuilder`] is consumed by `send()`.
///
/// # Errors
///
/// Returns [`OverpassError`] if the request still fails after all
/// retries, the server answers with a non-retryable status, or the
/// body is not valid JSON.
pub async fn send_json<F>(build_request: F, max_retries: u32) -> Result<serde_json::Value, OverpassError>
where
    F: Fn() -> reqwest::RequestBuilder + Send + Sync,
{
    let response = send_inner(&build_request, max_retries).await?;
    let text = response.text().await?;

    serde_json::from_str(&text).map_err(|e| OverpassError::Parse {
        message: format!("JSON parse failed: {e} (received {} bytes)", text.len()),
    })
}

async fn send_inner<F>(build_request: &F, max_retries: u32) -> Result<reqwest::Response, OverpassError>
where
    F: Fn() -> reqwest::RequestBuilder + Send + Sync,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = Duration::from_secs(1u64 << attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    attempt += 1;
                    continue;
                }
                return Err(OverpassError::Http(e));
            }
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    return Ok(response);
                }

                let retryable = status == reqwest::StatusCode::TOO_MANY_REQUESTS
                    || status.is_server_error();

                if retryable && attempt < max_retries {
                    log::warn!("  HTTP {status} from Overpass");
                    attempt += 1;
                    continue;
                }

                return Err(OverpassError::Status {
                    status: status.as_u16(),
                });
            }
        }
    }
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}
