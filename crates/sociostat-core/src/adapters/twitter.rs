use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use super::{execute_checked, handle_seed, non_empty};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, NoopHttpClient};
use crate::stats_source::StatsSource;
use crate::{
    FetchError, Handle, PlatformCounts, PlatformId, PlatformProfile, PlatformStats, UtcDateTime,
};

const RAPIDAPI_HOST: &str = "twitter241.p.rapidapi.com";

/// Twitter adapter supporting both real API calls and mock mode.
///
/// The user endpoint wraps everything in a `result.data.user.result`
/// chain; the metric counters live in a `legacy` sub-object that newer
/// API versions omit entirely, so every counter falls back to zero.
#[derive(Clone)]
pub struct TwitterAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    timeout_ms: u64,
    use_real_api: bool,
}

impl Default for TwitterAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            auth: HttpAuth::None,
            timeout_ms: 10_000,
            use_real_api: false,
        }
    }
}

impl TwitterAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        let is_real = !http_client.is_mock();
        Self {
            http_client,
            auth: HttpAuth::Header {
                name: String::from("x-rapidapi-key"),
                value: api_key.into(),
            },
            use_real_api: is_real,
            ..Self::default()
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn fetch_real(&self, handle: &Handle) -> Result<PlatformStats, FetchError> {
        let endpoint = format!(
            "https://{RAPIDAPI_HOST}/user?username={}",
            urlencoding::encode(handle.as_str())
        );
        tracing::debug!(handle = %handle, "fetching twitter user");

        let request = HttpRequest::get(&endpoint)
            .with_header("x-rapidapi-host", RAPIDAPI_HOST)
            .with_auth(&self.auth)
            .with_timeout_ms(self.timeout_ms);
        let response = execute_checked(&self.http_client, "twitter", request).await?;

        let raw: Value = serde_json::from_str(&response.body).map_err(|error| {
            FetchError::generic(format!("twitter returned malformed json: {error}"))
        })?;

        parse_and_normalize(raw, handle)
    }

    async fn fetch_mock(&self, handle: &Handle) -> Result<PlatformStats, FetchError> {
        let request =
            HttpRequest::get(format!("https://{RAPIDAPI_HOST}/user")).with_timeout_ms(self.timeout_ms);
        execute_checked(&self.http_client, "twitter", request).await?;

        let seed = handle_seed(handle);
        let followers = 8_000 + seed % 150_000;
        let following = 200 + seed % 2_000;
        let tweets = 500 + seed % 30_000;
        let likes = tweets.saturating_mul(35);

        let raw = json!({
            "result": {
                "data": {
                    "user": {
                        "result": {
                            "core": {
                                "name": handle.as_str(),
                                "screen_name": handle.as_str(),
                            },
                            "legacy": {
                                "followers_count": followers,
                                "friends_count": following,
                                "statuses_count": tweets,
                                "favourites_count": likes,
                                "description": "mock bio",
                                "profile_image_url_https":
                                    format!("https://pbs.twimg.example/{}.jpg", handle),
                            },
                            "avatar": {
                                "image_url": format!("https://pbs.twimg.example/{}.jpg", handle),
                            },
                            "is_blue_verified": seed % 3 == 0,
                        }
                    }
                }
            }
        });

        parse_and_normalize(raw, handle)
    }
}

impl StatsSource for TwitterAdapter {
    fn id(&self) -> PlatformId {
        PlatformId::Twitter
    }

    fn fetch<'a>(
        &'a self,
        handle: &'a Handle,
    ) -> Pin<Box<dyn Future<Output = Result<PlatformStats, FetchError>> + Send + 'a>> {
        Box::pin(async move {
            if self.use_real_api {
                self.fetch_real(handle).await
            } else {
                self.fetch_mock(handle).await
            }
        })
    }
}

fn parse_and_normalize(raw: Value, handle: &Handle) -> Result<PlatformStats, FetchError> {
    let payload: TwitterUserResponse = serde_json::from_value(raw.clone()).map_err(|error| {
        FetchError::generic(format!(
            "twitter payload did not match the expected shape: {error}"
        ))
    })?;
    normalize(payload, handle, UtcDateTime::now(), raw)
}

/// Map a Twitter user payload into the unified record. Pure; no I/O.
pub fn normalize(
    payload: TwitterUserResponse,
    handle: &Handle,
    fetched_at: UtcDateTime,
    raw: Value,
) -> Result<PlatformStats, FetchError> {
    let user = payload
        .result
        .and_then(|envelope| envelope.data)
        .and_then(|data| data.user)
        .and_then(|wrapper| wrapper.result)
        .ok_or_else(|| FetchError::not_found(format!("twitter user '{handle}' not found")))?;

    let display_name = user
        .core
        .as_ref()
        .and_then(|core| non_empty(core.name.clone()))
        .or_else(|| {
            user.legacy
                .as_ref()
                .and_then(|legacy| non_empty(legacy.name.clone()))
        })
        .unwrap_or_else(|| handle.as_str().to_owned());

    let profile_image_url = user
        .avatar
        .as_ref()
        .and_then(|avatar| non_empty(avatar.image_url.clone()))
        .or_else(|| {
            user.legacy
                .as_ref()
                .and_then(|legacy| non_empty(legacy.profile_image_url_https.clone()))
        });

    let verified = user
        .is_blue_verified
        .or_else(|| user.legacy.as_ref().and_then(|legacy| legacy.verified))
        .unwrap_or(false);

    // The legacy block carries every counter; absent block means zeros.
    let legacy = user.legacy.as_ref();
    let counts = PlatformCounts {
        followers: legacy.and_then(|l| l.followers_count).unwrap_or(0),
        following: legacy.and_then(|l| l.friends_count).unwrap_or(0),
        total_content: legacy.and_then(|l| l.statuses_count).unwrap_or(0),
        total_engagement: legacy.and_then(|l| l.favourites_count).unwrap_or(0),
    };

    let profile = PlatformProfile {
        display_name,
        profile_image_url,
        bio: user
            .legacy
            .as_ref()
            .and_then(|legacy| non_empty(legacy.description.clone())),
        verified,
    };

    PlatformStats::new(
        PlatformId::Twitter,
        handle.clone(),
        profile,
        counts,
        fetched_at,
        raw,
    )
    .map_err(|error| FetchError::generic(error.to_string()))
}

/// Twitter user response shape: `result.data.user.result` with
/// `core`/`legacy`/`avatar` sub-objects.
#[derive(Debug, Clone, Deserialize)]
pub struct TwitterUserResponse {
    #[serde(default)]
    result: Option<TwitterResultEnvelope>,
}

#[derive(Debug, Clone, Deserialize)]
struct TwitterResultEnvelope {
    #[serde(default)]
    data: Option<TwitterData>,
}

#[derive(Debug, Clone, Deserialize)]
struct TwitterData {
    #[serde(default)]
    user: Option<TwitterUserWrapper>,
}

#[derive(Debug, Clone, Deserialize)]
struct TwitterUserWrapper {
    #[serde(default)]
    result: Option<TwitterUserResult>,
}

#[derive(Debug, Clone, Deserialize)]
struct TwitterUserResult {
    #[serde(default)]
    core: Option<TwitterCore>,
    #[serde(default)]
    legacy: Option<TwitterLegacy>,
    #[serde(default)]
    avatar: Option<TwitterAvatar>,
    #[serde(default)]
    is_blue_verified: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
struct TwitterCore {
    #[serde(default)]
    name: Option<String>,
}

/// Counter block present only in some API versions.
#[derive(Debug, Clone, Deserialize)]
struct TwitterLegacy {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    followers_count: Option<u64>,
    #[serde(default)]
    friends_count: Option<u64>,
    #[serde(default)]
    statuses_count: Option<u64>,
    #[serde(default)]
    favourites_count: Option<u64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    verified: Option<bool>,
    #[serde(default)]
    profile_image_url_https: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TwitterAvatar {
    #[serde(default)]
    image_url: Option<String>,
}
