//! Shared HTTP plumbing for providers: client construction, retries, and
//! status → `ProviderError` mapping.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::warn;

use super::ProviderError;

/// Transport timeout for one provider request. The cascade itself has none.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_ATTEMPTS: u32 = 3;

pub fn build_client() -> Result<Client, reqwest::Error> {
    Client::builder().timeout(REQUEST_TIMEOUT).build()
}

/// Sends the request built by `make_request` and deserializes a JSON body.
///
/// Transport failures and 5xx responses are retried with exponential backoff
/// (1s, 2s). Anything else, 429 included, returns immediately so quota is not
/// burned on a provider that will not answer.
pub async fn send_json<T, F>(provider: &str, make_request: F) -> Result<T, ProviderError>
where
    T: DeserializeOwned,
    F: Fn() -> RequestBuilder,
{
    let mut last_error: Option<ProviderError> = None;

    for attempt in 0..MAX_ATTEMPTS {
        if attempt > 0 {
            let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
            warn!(
                "{provider} call attempt {} failed, retrying after {}ms...",
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        let response = match make_request().send().await {
            Ok(r) => r,
            Err(e) => {
                last_error = Some(ProviderError::Unavailable(e.to_string()));
                continue;
            }
        };

        let status = response.status();

        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("{provider} returned {status}: {body}");
            last_error = Some(classify_status(status, &error_message(&body)));
            continue;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &error_message(&body)));
        }

        return response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Unknown(format!("invalid {provider} response body: {e}")));
    }

    Err(last_error.unwrap_or_else(|| {
        ProviderError::Unavailable(format!("{provider} gave no response after {MAX_ATTEMPTS} attempts"))
    }))
}

/// Maps an HTTP failure onto the provider error taxonomy.
pub fn classify_status(status: StatusCode, message: &str) -> ProviderError {
    let detail = format!("{status}: {message}");
    let lower = message.to_lowercase();

    match status.as_u16() {
        429 => ProviderError::Quota(detail),
        401 | 403 => ProviderError::Forbidden(detail),
        404 => ProviderError::NotFound(detail),
        500..=599 => ProviderError::Unavailable(detail),
        _ if lower.contains("quota") => ProviderError::Quota(detail),
        _ if lower.contains("api key") || lower.contains("api_key") => {
            ProviderError::Forbidden(detail)
        }
        _ => ProviderError::Unknown(detail),
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pulls `error.message` out of a JSON error body; all three vendors use that
/// shape. Falls back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}
