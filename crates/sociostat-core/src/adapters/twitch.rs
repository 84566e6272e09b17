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

const RAPIDAPI_HOST: &str = "twitch-scraper2.p.rapidapi.com";

/// Twitch adapter supporting both real API calls and mock mode.
///
/// The channel endpoint has shipped both camelCase and snake_case field
/// spellings over time, so the payload structs accept either. Twitch
/// exposes no following/content counters on this endpoint; those resolve
/// to zero and the derived engagement average with them.
#[derive(Clone)]
pub struct TwitchAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    timeout_ms: u64,
    use_real_api: bool,
}

impl Default for TwitchAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            auth: HttpAuth::None,
            timeout_ms: 10_000,
            use_real_api: false,
        }
    }
}

impl TwitchAdapter {
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
            "https://{RAPIDAPI_HOST}/api/channel?channel={}",
            urlencoding::encode(handle.as_str())
        );
        tracing::debug!(handle = %handle, "fetching twitch channel");

        let request = HttpRequest::get(&endpoint)
            .with_header("x-rapidapi-host", RAPIDAPI_HOST)
            .with_auth(&self.auth)
            .with_timeout_ms(self.timeout_ms);
        let response = execute_checked(&self.http_client, "twitch", request).await?;

        let raw: Value = serde_json::from_str(&response.body).map_err(|error| {
            FetchError::generic(format!("twitch returned malformed json: {error}"))
        })?;

        parse_and_normalize(raw, handle)
    }

    async fn fetch_mock(&self, handle: &Handle) -> Result<PlatformStats, FetchError> {
        let request = HttpRequest::get(format!("https://{RAPIDAPI_HOST}/api/channel"))
            .with_timeout_ms(self.timeout_ms);
        execute_checked(&self.http_client, "twitch", request).await?;

        let seed = handle_seed(handle);
        let followers = 3_000 + seed % 2_000_000;

        let raw = json!({
            "data": {
                "user": {
                    "login": handle.as_str(),
                    "displayName": handle.as_str(),
                    "description": "mock channel",
                    "profileImageURL":
                        format!("https://static-cdn.jtvnw.example/{}.png", handle),
                    "followers": { "totalCount": followers },
                    "roles": { "isPartner": seed % 5 == 0 },
                }
            }
        });

        parse_and_normalize(raw, handle)
    }
}

impl StatsSource for TwitchAdapter {
    fn id(&self) -> PlatformId {
        PlatformId::Twitch
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
    let payload: TwitchChannelResponse = serde_json::from_value(raw.clone()).map_err(|error| {
        FetchError::generic(format!(
            "twitch payload did not match the expected shape: {error}"
        ))
    })?;
    normalize(payload, handle, UtcDateTime::now(), raw)
}

/// Map a Twitch channel payload into the unified record. Pure; no I/O.
pub fn normalize(
    payload: TwitchChannelResponse,
    handle: &Handle,
    fetched_at: UtcDateTime,
    raw: Value,
) -> Result<PlatformStats, FetchError> {
    if let Some(message) = payload.message.as_deref().filter(|m| !m.trim().is_empty()) {
        if payload.data.is_none() {
            return Err(classify_message(format!("twitch: {message}")));
        }
    }

    let user = payload
        .data
        .and_then(|data| data.user)
        .ok_or_else(|| FetchError::not_found(format!("twitch channel '{handle}' not found")))?;

    let profile = PlatformProfile {
        display_name: non_empty(user.display_name)
            .or(non_empty(user.login))
            .unwrap_or_else(|| handle.as_str().to_owned()),
        profile_image_url: non_empty(user.profile_image_url),
        bio: non_empty(user.description),
        verified: user
            .roles
            .as_ref()
            .and_then(|roles| roles.is_partner)
            .unwrap_or(false),
    };

    let counts = PlatformCounts {
        followers: user
            .followers
            .as_ref()
            .and_then(|followers| followers.total_count)
            .unwrap_or(0),
        ..PlatformCounts::default()
    };

    PlatformStats::new(
        PlatformId::Twitch,
        handle.clone(),
        profile,
        counts,
        fetched_at,
        raw,
    )
    .map_err(|error| FetchError::generic(error.to_string()))
}

/// Twitch channel response shape: `data.user` with `followers`/`roles`
/// sub-objects, in either field-name spelling.
#[derive(Debug, Clone, Deserialize)]
pub struct TwitchChannelResponse {
    #[serde(default)]
    data: Option<TwitchData>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TwitchData {
    #[serde(default)]
    user: Option<TwitchUser>,
}

#[derive(Debug, Clone, Deserialize)]
struct TwitchUser {
    #[serde(default)]
    login: Option<String>,
    #[serde(rename = "displayName", alias = "display_name", default)]
    display_name: Option<String>,
    #[serde(rename = "profileImageURL", alias = "profile_image_url", default)]
    profile_image_url: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    followers: Option<TwitchFollowers>,
    #[serde(default)]
    roles: Option<TwitchRoles>,
}

#[derive(Debug, Clone, Deserialize)]
struct TwitchFollowers {
    #[serde(rename = "totalCount", alias = "total_count", default)]
    total_count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
struct TwitchRoles {
    #[serde(rename = "isPartner", alias = "is_partner", default)]
    is_partner: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FetchErrorKind;

    fn fixture_handle() -> Handle {
        Handle::parse("pokimane").expect("valid handle")
    }

    fn fixture_time() -> UtcDateTime {
        UtcDateTime::parse("2025-06-01T00:00:00Z").expect("timestamp")
    }

    fn normalize_fixture(body: &str) -> Result<PlatformStats, FetchError> {
        let raw: Value = serde_json::from_str(body).expect("fixture is valid json");
        let payload: TwitchChannelResponse =
            serde_json::from_value(raw.clone()).expect("fixture matches shape");
        normalize(payload, &fixture_handle(), fixture_time(), raw)
    }

    #[test]
    fn reads_camel_case_fields() {
        let stats = normalize_fixture(
            r#"{
                "data": {
                    "user": {
                        "login": "pokimane",
                        "displayName": "Pokimane",
                        "description": "variety streams",
                        "profileImageURL": "https://static-cdn.example/poki.png",
                        "followers": { "totalCount": 9300000 },
                        "roles": { "isPartner": true }
                    }
                }
            }"#,
        )
        .expect("fixture should normalize");

        assert_eq!(stats.display_name, "Pokimane");
        assert_eq!(stats.followers, 9_300_000);
        assert!(stats.verified);
        assert_eq!(
            stats.profile_image_url.as_deref(),
            Some("https://static-cdn.example/poki.png")
        );
    }

    #[test]
    fn reads_snake_case_fields() {
        let stats = normalize_fixture(
            r#"{
                "data": {
                    "user": {
                        "display_name": "Pokimane",
                        "profile_image_url": "https://static-cdn.example/poki.png",
                        "followers": { "total_count": 9300000 },
                        "roles": { "is_partner": true }
                    }
                }
            }"#,
        )
        .expect("fixture should normalize");

        assert_eq!(stats.display_name, "Pokimane");
        assert_eq!(stats.followers, 9_300_000);
        assert!(stats.verified);
    }

    #[test]
    fn no_content_counters_means_zero_average() {
        let stats = normalize_fixture(
            r#"{ "data": { "user": { "displayName": "Pokimane" } } }"#,
        )
        .expect("fixture should normalize");

        assert_eq!(stats.following, 0);
        assert_eq!(stats.total_content, 0);
        assert_eq!(stats.total_engagement, 0);
        assert_eq!(stats.average_engagement, 0.0);
    }

    #[test]
    fn display_name_falls_back_through_login_to_handle() {
        let from_login = normalize_fixture(r#"{ "data": { "user": { "login": "poki2" } } }"#)
            .expect("fixture should normalize");
        assert_eq!(from_login.display_name, "poki2");

        let from_handle = normalize_fixture(r#"{ "data": { "user": {} } }"#)
            .expect("fixture should normalize");
        assert_eq!(from_handle.display_name, "pokimane");
    }

    #[test]
    fn missing_user_is_not_found() {
        for body in [r#"{}"#, r#"{ "data": {} }"#] {
            let error = normalize_fixture(body).expect_err("must fail");
            assert_eq!(error.kind(), FetchErrorKind::NotFound, "body: {body}");
        }
    }

    #[test]
    fn provider_message_without_data_is_classified() {
        let error = normalize_fixture(r#"{ "message": "monthly quota exceeded" }"#)
            .expect_err("must fail");
        assert_eq!(error.kind(), FetchErrorKind::QuotaExceeded);
    }

    #[tokio::test]
    async fn mock_fetch_yields_consistent_record() {
        let adapter = TwitchAdapter::default();
        let handle = fixture_handle();

        let stats = adapter.fetch(&handle).await.expect("mock fetch succeeds");
        assert_eq!(stats.platform, PlatformId::Twitch);
        assert!(stats.followers > 0);
        assert_eq!(stats.average_engagement, 0.0);
    }
}
