//! Fetch-and-validate helper shared by the providers and the now-playing
//! source.
//!
//! The serde target type is the schema: a body that does not deserialise into
//! `T` is treated the same as a transport failure.

use crate::error::{MetadataError, Result};
use bridge_traits::http::{HttpClient, HttpRequest};
use core_runtime::logging::redact_url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Timeout for a single provider request
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub(crate) const USER_AGENT: &str = concat!("listening-to/", env!("CARGO_PKG_VERSION"));

/// GETs `url` and deserialises the JSON body into `T`.
///
/// Returns `None` on transport errors, non-2xx statuses and bodies that do not
/// match `T`. Each failure is logged with the URL's credentials redacted.
pub async fn fetch_validated<T: DeserializeOwned>(client: &dyn HttpClient, url: &str) -> Option<T> {
    match fetch_json(client, url).await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(url = %redact_url(url), error = %e, "Fetch failed");
            None
        }
    }
}

async fn fetch_json<T: DeserializeOwned>(client: &dyn HttpClient, url: &str) -> Result<T> {
    debug!(url = %redact_url(url), "Fetching");

    let request = HttpRequest::get(url)
        .header("Accept", "application/json")
        .header("User-Agent", USER_AGENT)
        .timeout(REQUEST_TIMEOUT);

    let response = client.execute(request).await?;

    if !response.is_success() {
        return Err(MetadataError::HttpStatus {
            status: response.status,
            url: redact_url(url),
        });
    }

    serde_json::from_slice(&response.body)
        .map_err(|e| MetadataError::InvalidResponse(format!("Schema mismatch: {}", e)))
}
