//! Cache-first, partial-failure-isolating fan-out over platform adapters.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::adapters::{TikTokAdapter, TwitchAdapter, TwitterAdapter};
use crate::cache::StatsCache;
use crate::http_client::ReqwestHttpClient;
use crate::platform::cache_key;
use crate::stats_source::StatsSource;
use crate::{FetchError, Handle, PlatformId, PlatformIdentity, PlatformStats};

struct AggregatorInner {
    adapters: HashMap<PlatformId, Arc<dyn StatsSource>>,
    cache: StatsCache,
    /// Per-key guards collapsing concurrent misses for one identity into a
    /// single upstream call. Best-effort: a guard removed while a straggler
    /// still holds its Arc may let one duplicate through, which the cache
    /// contract tolerates.
    in_flight: tokio::sync::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

/// Adapter registry plus caching policy.
///
/// Cheap to clone; all clones share the same adapters, cache, and
/// in-flight registry.
#[derive(Clone)]
pub struct StatsAggregator {
    inner: Arc<AggregatorInner>,
}

impl StatsAggregator {
    /// Build from explicit adapters and a cache. Later adapters replace
    /// earlier ones registered for the same platform.
    pub fn new(adapters: Vec<Arc<dyn StatsSource>>, cache: StatsCache) -> Self {
        let mut map: HashMap<PlatformId, Arc<dyn StatsSource>> = HashMap::new();
        for adapter in adapters {
            map.insert(adapter.id(), adapter);
        }

        Self {
            inner: Arc::new(AggregatorInner {
                adapters: map,
                cache,
                in_flight: tokio::sync::Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Platforms with a registered adapter, in declaration order.
    pub fn platforms(&self) -> Vec<PlatformId> {
        PlatformId::ALL
            .into_iter()
            .filter(|platform| self.inner.adapters.contains_key(platform))
            .collect()
    }

    /// Whether a fresh cached record exists for this identity.
    pub async fn is_cached(&self, identity: &PlatformIdentity) -> bool {
        self.inner.cache.get(&identity.cache_key()).await.is_some()
    }

    /// Fetch one identity, cache-first.
    ///
    /// A fresh cached record is returned without touching the network.
    /// On a miss the adapter is invoked and the normalized record stored.
    /// Failures are never cached, so the next call retries upstream.
    pub async fn fetch_one(
        &self,
        identity: &PlatformIdentity,
    ) -> Result<PlatformStats, FetchError> {
        let key = identity.cache_key();

        if let Some(hit) = self.inner.cache.get(&key).await {
            tracing::debug!(identity = %identity, "cache hit");
            return Ok(hit);
        }

        let guard_slot = {
            let mut in_flight = self.inner.in_flight.lock().await;
            Arc::clone(
                in_flight
                    .entry(key.clone())
                    .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
            )
        };
        let guard = guard_slot.lock().await;

        // A concurrent miss may have refreshed the entry while we waited.
        if let Some(hit) = self.inner.cache.get(&key).await {
            tracing::debug!(identity = %identity, "cache hit after in-flight wait");
            self.clear_in_flight(&key).await;
            return Ok(hit);
        }

        let result = self.fetch_upstream(identity).await;
        if let Ok(stats) = &result {
            self.inner.cache.put(key.clone(), stats.clone()).await;
        }

        self.clear_in_flight(&key).await;
        drop(guard);
        result
    }

    /// Fetch several identities concurrently, isolating failures.
    ///
    /// Every requested platform appears in the returned map; a failed or
    /// panicked fetch surfaces as `None` for that platform without
    /// cancelling or blocking the others.
    pub async fn fetch_many(
        &self,
        identities: &[PlatformIdentity],
    ) -> HashMap<PlatformId, Option<PlatformStats>> {
        let mut results: HashMap<PlatformId, Option<PlatformStats>> = identities
            .iter()
            .map(|identity| (identity.platform(), None))
            .collect();

        let mut tasks = JoinSet::new();
        for identity in identities {
            let aggregator = self.clone();
            let identity = identity.clone();
            tasks.spawn(async move {
                let outcome = aggregator.fetch_one(&identity).await;
                (identity, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((identity, Ok(stats))) => {
                    results.insert(identity.platform(), Some(stats));
                }
                Ok((identity, Err(error))) => {
                    tracing::warn!(
                        identity = %identity,
                        code = error.code(),
                        "platform fetch failed: {}",
                        error.message()
                    );
                }
                Err(join_error) => {
                    tracing::error!("platform fetch task aborted: {join_error}");
                }
            }
        }

        results
    }

    /// Drop the cached record for one identity.
    pub async fn invalidate(&self, platform: PlatformId, handle: &Handle) {
        self.inner.cache.invalidate(&cache_key(platform, handle)).await;
    }

    /// Drop every cached record.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all().await;
    }

    async fn fetch_upstream(
        &self,
        identity: &PlatformIdentity,
    ) -> Result<PlatformStats, FetchError> {
        let Some(adapter) = self.inner.adapters.get(&identity.platform()) else {
            return Err(FetchError::generic(format!(
                "no adapter registered for platform '{}'",
                identity.platform()
            )));
        };

        tracing::debug!(identity = %identity, "fetching upstream");
        adapter.fetch(identity.handle()).await
    }

    async fn clear_in_flight(&self, key: &str) {
        let mut in_flight = self.inner.in_flight.lock().await;
        in_flight.remove(key);
    }
}

/// Builder wiring adapters, credentials and the cache.
///
/// `with_real_clients` reads the shared gateway credential from
/// `SOCIOSTAT_RAPIDAPI_KEY` (fallback `RAPIDAPI_KEY`). A platform with no
/// usable credential falls back to its offline mock adapter.
pub struct StatsAggregatorBuilder {
    use_mock: bool,
    rapidapi_key: Option<String>,
    timeout_ms: u64,
    enable_tiktok: bool,
    enable_twitter: bool,
    enable_twitch: bool,
    cache: Option<StatsCache>,
    extra_adapters: Vec<Arc<dyn StatsSource>>,
}

impl Default for StatsAggregatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsAggregatorBuilder {
    pub fn new() -> Self {
        Self {
            use_mock: false,
            rapidapi_key: None,
            timeout_ms: 10_000,
            enable_tiktok: true,
            enable_twitter: true,
            enable_twitch: true,
            cache: None,
            extra_adapters: Vec::new(),
        }
    }

    /// All adapters serve deterministic offline data; no network access.
    pub fn with_mock_mode(mut self) -> Self {
        self.use_mock = true;
        self
    }

    /// Use real HTTP clients, reading the shared credential from the
    /// environment.
    pub fn with_real_clients(mut self) -> Self {
        self.use_mock = false;
        self.rapidapi_key = env::var("SOCIOSTAT_RAPIDAPI_KEY")
            .or_else(|_| env::var("RAPIDAPI_KEY"))
            .ok();
        self
    }

    /// Set the shared gateway credential explicitly.
    pub fn with_rapidapi_key(mut self, key: impl Into<String>) -> Self {
        self.rapidapi_key = Some(key.into());
        self
    }

    /// Per-request transport timeout applied to every adapter.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_tiktok_enabled(mut self, enabled: bool) -> Self {
        self.enable_tiktok = enabled;
        self
    }

    pub fn with_twitter_enabled(mut self, enabled: bool) -> Self {
        self.enable_twitter = enabled;
        self
    }

    pub fn with_twitch_enabled(mut self, enabled: bool) -> Self {
        self.enable_twitch = enabled;
        self
    }

    /// Inject a cache (e.g. with a test clock or a non-default TTL).
    pub fn with_cache(mut self, cache: StatsCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Register an extra adapter, replacing any default for its platform.
    pub fn with_adapter(mut self, adapter: Arc<dyn StatsSource>) -> Self {
        self.extra_adapters.push(adapter);
        self
    }

    pub fn build(self) -> StatsAggregator {
        let mut adapters: Vec<Arc<dyn StatsSource>> = Vec::new();

        if self.enable_tiktok {
            adapters.push(self.tiktok_adapter());
        }
        if self.enable_twitter {
            adapters.push(self.twitter_adapter());
        }
        if self.enable_twitch {
            adapters.push(self.twitch_adapter());
        }
        let cache = self.cache.unwrap_or_else(StatsCache::with_default_ttl);
        adapters.extend(self.extra_adapters);

        StatsAggregator::new(adapters, cache)
    }

    fn tiktok_adapter(&self) -> Arc<dyn StatsSource> {
        match self.real_key() {
            Some(key) => Arc::new(
                TikTokAdapter::with_http_client(Arc::new(ReqwestHttpClient::new()), key)
                    .with_timeout_ms(self.timeout_ms),
            ),
            None => Arc::new(TikTokAdapter::default().with_timeout_ms(self.timeout_ms)),
        }
    }

    fn twitter_adapter(&self) -> Arc<dyn StatsSource> {
        match self.real_key() {
            Some(key) => Arc::new(
                TwitterAdapter::with_http_client(Arc::new(ReqwestHttpClient::new()), key)
                    .with_timeout_ms(self.timeout_ms),
            ),
            None => Arc::new(TwitterAdapter::default().with_timeout_ms(self.timeout_ms)),
        }
    }

    fn twitch_adapter(&self) -> Arc<dyn StatsSource> {
        match self.real_key() {
            Some(key) => Arc::new(
                TwitchAdapter::with_http_client(Arc::new(ReqwestHttpClient::new()), key)
                    .with_timeout_ms(self.timeout_ms),
            ),
            None => Arc::new(TwitchAdapter::default().with_timeout_ms(self.timeout_ms)),
        }
    }

    fn real_key(&self) -> Option<String> {
        if self.use_mock {
            return None;
        }
        self.rapidapi_key.clone()
    }
}
