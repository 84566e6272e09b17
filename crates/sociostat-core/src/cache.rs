//! In-memory TTL caching for normalized platform records.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::PlatformStats;

/// Time source for freshness checks, injectable so tests can pin the clock.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

/// Wall-clock time source used outside of tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: PlatformStats,
    stored_at: Instant,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl CacheInner {
    fn new(ttl: Duration) -> Self {
        Self {
            map: HashMap::new(),
            ttl,
        }
    }

    fn get(&self, key: &str, now: Instant) -> Option<PlatformStats> {
        self.map.get(key).and_then(|entry| {
            if now.duration_since(entry.stored_at) < self.ttl {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    fn put(&mut self, key: String, value: PlatformStats, now: Instant) {
        self.map.insert(
            key,
            CacheEntry {
                value,
                stored_at: now,
            },
        );
    }
}

/// Thread-safe TTL store of (platform, handle) → last successful record.
///
/// Freshness is evaluated at read time; an expired entry behaves as absent
/// and is dropped on the next overwrite or [`StatsCache::purge_expired`]
/// call. There is no background eviction task. Keys are case-sensitive as
/// supplied.
#[derive(Debug, Clone)]
pub struct StatsCache {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
    clock: Arc<dyn Clock>,
}

impl StatsCache {
    /// Create a cache with an explicit TTL and the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a cache with the uniform 5-minute provider TTL.
    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(300))
    }

    /// Create a cache with an injected time source.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner::new(ttl))),
            clock,
        }
    }

    /// Create a disabled cache: never stores, never returns entries.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Get the cached record for a key if present and fresh.
    pub async fn get(&self, key: &str) -> Option<PlatformStats> {
        let store = self.inner.read().await;
        store.get(key, self.clock.now())
    }

    /// Store a record under a key, refreshing its timestamp.
    ///
    /// No-op when the cache is disabled (TTL is zero).
    pub async fn put(&self, key: String, value: PlatformStats) {
        let mut store = self.inner.write().await;

        if store.ttl == Duration::ZERO {
            return;
        }

        let now = self.clock.now();
        store.put(key, value, now);
    }

    /// Remove one entry regardless of freshness.
    pub async fn invalidate(&self, key: &str) {
        let mut store = self.inner.write().await;
        store.map.remove(key);
    }

    /// Remove every entry.
    pub async fn invalidate_all(&self) {
        let mut store = self.inner.write().await;
        store.map.clear();
    }

    /// Drop entries whose TTL has elapsed.
    pub async fn purge_expired(&self) {
        let mut store = self.inner.write().await;
        let now = self.clock.now();
        let ttl = store.ttl;
        store
            .map
            .retain(|_, entry| now.duration_since(entry.stored_at) < ttl);
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Whether the cache was constructed disabled.
    pub async fn is_disabled(&self) -> bool {
        let store = self.inner.read().await;
        store.ttl == Duration::ZERO
    }
}

/// Manually advanced clock for deterministic cache and aggregator tests.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct ManualClock {
    base: Instant,
    offset: std::sync::Mutex<Duration>,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: std::sync::Mutex::new(Duration::ZERO),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().expect("clock lock is not poisoned");
        *offset += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = self.offset.lock().expect("clock lock is not poisoned");
        self.base + *offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Handle, PlatformCounts, PlatformId, PlatformProfile, UtcDateTime};

    fn sample_stats(handle: &str) -> PlatformStats {
        PlatformStats::new(
            PlatformId::Tiktok,
            Handle::parse(handle).expect("valid handle"),
            PlatformProfile {
                display_name: handle.to_owned(),
                profile_image_url: None,
                bio: None,
                verified: false,
            },
            PlatformCounts {
                followers: 100,
                following: 10,
                total_content: 5,
                total_engagement: 50,
            },
            UtcDateTime::parse("2025-06-01T00:00:00Z").expect("timestamp"),
            serde_json::Value::Null,
        )
        .expect("stats should build")
    }

    #[tokio::test]
    async fn basic_get_put_and_overwrite() {
        let cache = StatsCache::new(Duration::from_secs(60));

        assert!(cache.get("tiktok:creator").await.is_none());

        cache
            .put("tiktok:creator".to_owned(), sample_stats("creator"))
            .await;
        let hit = cache.get("tiktok:creator").await.expect("entry is fresh");
        assert_eq!(hit.handle.as_str(), "creator");

        let mut replacement = sample_stats("creator");
        replacement.followers = 200;
        cache
            .put("tiktok:creator".to_owned(), replacement)
            .await;
        let hit = cache.get("tiktok:creator").await.expect("entry is fresh");
        assert_eq!(hit.followers, 200);
    }

    #[tokio::test]
    async fn expired_entries_behave_as_absent() {
        let clock = Arc::new(ManualClock::new());
        let cache = StatsCache::with_clock(Duration::from_secs(300), clock.clone());

        cache
            .put("tiktok:creator".to_owned(), sample_stats("creator"))
            .await;
        clock.advance(Duration::from_secs(299));
        assert!(cache.get("tiktok:creator").await.is_some());

        clock.advance(Duration::from_secs(2));
        assert!(cache.get("tiktok:creator").await.is_none());
    }

    #[tokio::test]
    async fn purge_expired_drops_stale_entries_only() {
        let clock = Arc::new(ManualClock::new());
        let cache = StatsCache::with_clock(Duration::from_secs(300), clock.clone());

        cache.put("tiktok:old".to_owned(), sample_stats("old")).await;
        clock.advance(Duration::from_secs(301));
        cache.put("tiktok:new".to_owned(), sample_stats("new")).await;

        assert_eq!(cache.len().await, 2);
        cache.purge_expired().await;
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("tiktok:new").await.is_some());
    }

    #[tokio::test]
    async fn invalidate_removes_one_key() {
        let cache = StatsCache::new(Duration::from_secs(60));

        cache.put("tiktok:a".to_owned(), sample_stats("a")).await;
        cache.put("tiktok:b".to_owned(), sample_stats("b")).await;

        cache.invalidate("tiktok:a").await;
        assert!(cache.get("tiktok:a").await.is_none());
        assert!(cache.get("tiktok:b").await.is_some());
    }

    #[tokio::test]
    async fn invalidate_all_clears_everything() {
        let cache = StatsCache::new(Duration::from_secs(60));

        cache.put("tiktok:a".to_owned(), sample_stats("a")).await;
        cache.put("twitch:b".to_owned(), sample_stats("b")).await;

        cache.invalidate_all().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn disabled_cache_stores_nothing() {
        let cache = StatsCache::disabled();
        assert!(cache.is_disabled().await);

        cache.put("tiktok:a".to_owned(), sample_stats("a")).await;
        assert!(cache.get("tiktok:a").await.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn keys_are_case_sensitive() {
        let cache = StatsCache::new(Duration::from_secs(60));

        cache.put("twitch:User".to_owned(), sample_stats("User")).await;
        assert!(cache.get("twitch:user").await.is_none());
        assert!(cache.get("twitch:User").await.is_some());
    }
}
