use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use super::{execute_checked, handle_seed, non_empty};
use crate::classify::classify_message;
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, NoopHttpClient};
use crate::stats_source::StatsSource;
use crate::{
    FetchError, Handle, PlatformCounts, PlatformId, PlatformProfile, PlatformStats, UtcDateTime,
};

const RAPIDAPI_HOST: &str = "tiktok-scraper7.p.rapidapi.com";

/// TikTok adapter supporting both real API calls and mock mode.
///
/// The user-info endpoint reports counters twice: a legacy numeric `stats`
/// object and a string-valued `statsV2` object added when the numeric one
/// started saturating on the largest accounts. `statsV2` wins when it
/// parses.
#[derive(Clone)]
pub struct TikTokAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    timeout_ms: u64,
    use_real_api: bool,
}

impl Default for TikTokAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            auth: HttpAuth::None,
            timeout_ms: 10_000,
            use_real_api: false,
        }
    }
}

impl TikTokAdapter {
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
            "https://{RAPIDAPI_HOST}/user/info?unique_id={}",
            urlencoding::encode(handle.as_str())
        );
        tracing::debug!(handle = %handle, "fetching tiktok user info");

        let request = HttpRequest::get(&endpoint)
            .with_header("x-rapidapi-host", RAPIDAPI_HOST)
            .with_auth(&self.auth)
            .with_timeout_ms(self.timeout_ms);
        let response = execute_checked(&self.http_client, "tiktok", request).await?;

        let raw: Value = serde_json::from_str(&response.body).map_err(|error| {
            FetchError::generic(format!("tiktok returned malformed json: {error}"))
        })?;

        parse_and_normalize(raw, handle)
    }

    async fn fetch_mock(&self, handle: &Handle) -> Result<PlatformStats, FetchError> {
        let request = HttpRequest::get(format!("https://{RAPIDAPI_HOST}/user/info"))
            .with_timeout_ms(self.timeout_ms);
        execute_checked(&self.http_client, "tiktok", request).await?;

        let seed = handle_seed(handle);
        let followers = 25_000 + seed % 400_000;
        let following = 150 + seed % 900;
        let hearts = followers.saturating_mul(12);
        let videos = 40 + seed % 260;

        let raw = json!({
            "userInfo": {
                "user": {
                    "uniqueId": handle.as_str(),
                    "nickname": handle.as_str(),
                    "avatarLarger": format!("https://p16.tiktokcdn.example/{}/avatar.jpeg", handle),
                    "signature": "mock bio",
                    "verified": seed % 7 == 0,
                },
                "stats": {
                    "followerCount": followers,
                    "followingCount": following,
                    "heart": hearts,
                    "heartCount": hearts,
                    "videoCount": videos,
                },
                "statsV2": {
                    "followerCount": followers.to_string(),
                    "followingCount": following.to_string(),
                    "heartCount": hearts.to_string(),
                    "videoCount": videos.to_string(),
                },
            }
        });

        parse_and_normalize(raw, handle)
    }
}

impl StatsSource for TikTokAdapter {
    fn id(&self) -> PlatformId {
        PlatformId::Tiktok
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
    let payload: TikTokUserResponse = serde_json::from_value(raw.clone()).map_err(|error| {
        FetchError::generic(format!(
            "tiktok payload did not match the expected shape: {error}"
        ))
    })?;
    normalize(payload, handle, UtcDateTime::now(), raw)
}

/// Map a TikTok user-info payload into the unified record. Pure; no I/O.
pub fn normalize(
    payload: TikTokUserResponse,
    handle: &Handle,
    fetched_at: UtcDateTime,
    raw: Value,
) -> Result<PlatformStats, FetchError> {
    if let Some(message) = payload.status_msg.as_deref() {
        if payload.status_code.unwrap_or(0) != 0 {
            return Err(classify_message(format!("tiktok: {message}")));
        }
    }

    let user_info = payload
        .user_info
        .ok_or_else(|| FetchError::not_found(format!("tiktok user '{handle}' not found")))?;

    let user = user_info.user.unwrap_or_default();
    let stats = user_info.stats;
    let stats_v2 = user_info.stats_v2;

    // Per-field fallback: statsV2 string, then legacy number, then zero.
    let followers = stats_v2
        .as_ref()
        .and_then(|v2| parse_count(v2.follower_count.as_deref()))
        .or_else(|| stats.as_ref().and_then(|s| s.follower_count))
        .unwrap_or(0);
    let following = stats_v2
        .as_ref()
        .and_then(|v2| parse_count(v2.following_count.as_deref()))
        .or_else(|| stats.as_ref().and_then(|s| s.following_count))
        .unwrap_or(0);
    let total_engagement = stats_v2
        .as_ref()
        .and_then(|v2| parse_count(v2.heart_count.as_deref()))
        .or_else(|| stats.as_ref().and_then(|s| s.heart_count))
        .or_else(|| stats.as_ref().and_then(|s| s.heart))
        .unwrap_or(0);
    let total_content = stats_v2
        .as_ref()
        .and_then(|v2| parse_count(v2.video_count.as_deref()))
        .or_else(|| stats.as_ref().and_then(|s| s.video_count))
        .unwrap_or(0);

    let profile = PlatformProfile {
        display_name: non_empty(user.nickname)
            .unwrap_or_else(|| handle.as_str().to_owned()),
        profile_image_url: non_empty(user.avatar_larger).or(non_empty(user.avatar_thumb)),
        bio: non_empty(user.signature),
        verified: user.verified.unwrap_or(false),
    };
    let counts = PlatformCounts {
        followers,
        following,
        total_content,
        total_engagement,
    };

    PlatformStats::new(
        PlatformId::Tiktok,
        handle.clone(),
        profile,
        counts,
        fetched_at,
        raw,
    )
    .map_err(|error| FetchError::generic(error.to_string()))
}

fn parse_count(value: Option<&str>) -> Option<u64> {
    value.and_then(|raw| raw.trim().parse::<u64>().ok())
}

/// TikTok user-info response shape.
#[derive(Debug, Clone, Deserialize)]
pub struct TikTokUserResponse {
    #[serde(rename = "userInfo", default)]
    user_info: Option<TikTokUserInfo>,
    #[serde(rename = "statusCode", default)]
    status_code: Option<i64>,
    #[serde(rename = "statusMsg", default)]
    status_msg: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TikTokUserInfo {
    #[serde(default)]
    user: Option<TikTokUser>,
    #[serde(default)]
    stats: Option<TikTokStats>,
    #[serde(rename = "statsV2", default)]
    stats_v2: Option<TikTokStatsV2>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TikTokUser {
    #[serde(default)]
    nickname: Option<String>,
    #[serde(rename = "avatarLarger", default)]
    avatar_larger: Option<String>,
    #[serde(rename = "avatarThumb", default)]
    avatar_thumb: Option<String>,
    #[serde(default)]
    signature: Option<String>,
    #[serde(default)]
    verified: Option<bool>,
}

/// Legacy numeric counters; saturates on the largest accounts.
#[derive(Debug, Clone, Deserialize)]
struct TikTokStats {
    #[serde(rename = "followerCount", default)]
    follower_count: Option<u64>,
    #[serde(rename = "followingCount", default)]
    following_count: Option<u64>,
    #[serde(default)]
    heart: Option<u64>,
    #[serde(rename = "heartCount", default)]
    heart_count: Option<u64>,
    #[serde(rename = "videoCount", default)]
    video_count: Option<u64>,
}

/// Overflow-safe string counters.
#[derive(Debug, Clone, Deserialize)]
struct TikTokStatsV2 {
    #[serde(rename = "followerCount", default)]
    follower_count: Option<String>,
    #[serde(rename = "followingCount", default)]
    following_count: Option<String>,
    #[serde(rename = "heartCount", default)]
    heart_count: Option<String>,
    #[serde(rename = "videoCount", default)]
    video_count: Option<String>,
}
