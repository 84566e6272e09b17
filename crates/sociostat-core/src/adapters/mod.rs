//! Provider adapters.
//!
//! One module per platform. Each module owns its endpoint configuration,
//! its raw serde payload shapes, and a pure `normalize` function mapping
//! those shapes into [`PlatformStats`](crate::PlatformStats). The
//! normalizers are where upstream schema drift lands, so every fallback
//! chain is an ordered sequence of accessors testable against fixed JSON
//! fixtures with no network.

pub mod tiktok;
pub mod twitch;
pub mod twitter;

pub use tiktok::TikTokAdapter;
pub use twitch::TwitchAdapter;
pub use twitter::TwitterAdapter;

use std::sync::Arc;

use crate::classify::{classify_message, classify_response};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::{FetchError, Handle};

/// Execute a transport call and convert failures into classified errors.
pub(crate) async fn execute_checked(
    client: &Arc<dyn HttpClient>,
    provider: &'static str,
    request: HttpRequest,
) -> Result<HttpResponse, FetchError> {
    let response = client.execute(request).await.map_err(|error| {
        classify_message(format!("{provider} transport error: {}", error.message()))
    })?;

    if !response.is_success() {
        let snippet = body_snippet(&response.body);
        let message = if snippet.is_empty() {
            format!("{provider} upstream returned status {}", response.status)
        } else {
            format!(
                "{provider} upstream returned status {}: {snippet}",
                response.status
            )
        };
        return Err(classify_response(response.status, message));
    }

    Ok(response)
}

/// Deterministic per-handle seed for the offline mock payloads.
pub(crate) fn handle_seed(handle: &Handle) -> u64 {
    handle.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(u64::from(byte))
    })
}

/// First 160 characters of a response body, for error messages.
fn body_snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= 160 {
        trimmed.to_owned()
    } else {
        trimmed.chars().take(160).collect()
    }
}

/// Drop empty-after-trim strings from optional fields.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
