//! Behavior-driven tests for the aggregator.
//!
//! These verify HOW the system behaves across caching, concurrency and
//! partial-failure scenarios, using scripted adapters and short real TTLs.

use std::time::Duration;

use sociostat_tests::*;

// =============================================================================
// Caching behavior
// =============================================================================

#[tokio::test]
async fn when_cache_is_fresh_second_fetch_skips_the_network() {
    // Given: an aggregator with a counting adapter and a roomy TTL
    let source = ScriptedSource::succeeding(PlatformId::Tiktok);
    let aggregator = StatsAggregatorBuilder::new()
        .with_mock_mode()
        .with_cache(StatsCache::new(Duration::from_secs(60)))
        .with_adapter(source.clone())
        .build();
    let identity = identity(PlatformId::Tiktok, "creator");

    // When: the same identity is fetched twice
    let first = aggregator.fetch_one(&identity).await.expect("first fetch");
    let second = aggregator.fetch_one(&identity).await.expect("second fetch");

    // Then: identical data, one upstream call
    assert_eq!(first, second);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn when_ttl_elapses_exactly_one_new_upstream_call_is_made() {
    let source = ScriptedSource::succeeding(PlatformId::Twitch);
    let aggregator = StatsAggregatorBuilder::new()
        .with_mock_mode()
        .with_cache(StatsCache::new(Duration::from_millis(80)))
        .with_adapter(source.clone())
        .build();
    let identity = identity(PlatformId::Twitch, "streamer");

    aggregator.fetch_one(&identity).await.expect("first fetch");
    tokio::time::sleep(Duration::from_millis(120)).await;

    aggregator.fetch_one(&identity).await.expect("refetch");
    assert_eq!(source.calls(), 2);

    // the refreshed entry serves the next call
    aggregator.fetch_one(&identity).await.expect("cached fetch");
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn when_a_fetch_fails_nothing_is_cached() {
    let source = ScriptedSource::new(PlatformId::Twitter, ScriptedOutcome::QuotaExceeded);
    let aggregator = StatsAggregatorBuilder::new()
        .with_mock_mode()
        .with_cache(StatsCache::new(Duration::from_secs(60)))
        .with_adapter(source.clone())
        .build();
    let identity = identity(PlatformId::Twitter, "someone");

    for _ in 0..3 {
        let error = aggregator
            .fetch_one(&identity)
            .await
            .expect_err("scripted failure");
        assert_eq!(error.kind(), FetchErrorKind::QuotaExceeded);
    }

    // every call after a failure went back upstream
    assert_eq!(source.calls(), 3);
}

#[tokio::test]
async fn when_invalidate_all_is_called_entries_are_refetched() {
    let source = ScriptedSource::succeeding(PlatformId::Tiktok);
    let aggregator = StatsAggregatorBuilder::new()
        .with_mock_mode()
        .with_cache(StatsCache::new(Duration::from_secs(60)))
        .with_adapter(source.clone())
        .build();
    let identity = identity(PlatformId::Tiktok, "creator");

    aggregator.fetch_one(&identity).await.expect("first fetch");
    aggregator.invalidate_all().await;
    aggregator.fetch_one(&identity).await.expect("refetch");

    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn when_handles_differ_only_by_case_they_cache_separately() {
    let source = ScriptedSource::succeeding(PlatformId::Twitch);
    let aggregator = StatsAggregatorBuilder::new()
        .with_mock_mode()
        .with_cache(StatsCache::new(Duration::from_secs(60)))
        .with_adapter(source.clone())
        .build();

    aggregator
        .fetch_one(&identity(PlatformId::Twitch, "Streamer"))
        .await
        .expect("fetch");
    aggregator
        .fetch_one(&identity(PlatformId::Twitch, "streamer"))
        .await
        .expect("fetch");

    assert_eq!(source.calls(), 2);
}

// =============================================================================
// Partial-failure isolation
// =============================================================================

#[tokio::test]
async fn when_one_platform_fails_the_others_still_resolve() {
    // Given: three platforms, the second of which always fails
    let tiktok = ScriptedSource::succeeding(PlatformId::Tiktok);
    let twitter = ScriptedSource::new(PlatformId::Twitter, ScriptedOutcome::Generic);
    let twitch = ScriptedSource::succeeding(PlatformId::Twitch);
    let aggregator = StatsAggregatorBuilder::new()
        .with_mock_mode()
        .with_adapter(tiktok)
        .with_adapter(twitter)
        .with_adapter(twitch)
        .build();

    let identities = vec![
        identity(PlatformId::Tiktok, "a"),
        identity(PlatformId::Twitter, "b"),
        identity(PlatformId::Twitch, "c"),
    ];

    // When: all three are fetched in one batch
    let results = aggregator.fetch_many(&identities).await;

    // Then: a three-entry map with only the failing platform null
    assert_eq!(results.len(), 3);
    assert!(results[&PlatformId::Tiktok].is_some());
    assert!(results[&PlatformId::Twitter].is_none());
    assert!(results[&PlatformId::Twitch].is_some());
}

#[tokio::test]
async fn when_a_quota_limited_platform_is_in_the_batch_it_does_not_blank_the_rest() {
    let tiktok = ScriptedSource::new(PlatformId::Tiktok, ScriptedOutcome::QuotaExceeded);
    let twitch = ScriptedSource::succeeding(PlatformId::Twitch);
    let aggregator = StatsAggregatorBuilder::new()
        .with_mock_mode()
        .with_adapter(tiktok)
        .with_adapter(twitch)
        .build();

    let results = aggregator
        .fetch_many(&[
            identity(PlatformId::Tiktok, "creator"),
            identity(PlatformId::Twitch, "creator"),
        ])
        .await;

    assert!(results[&PlatformId::Tiktok].is_none());
    let twitch_stats = results[&PlatformId::Twitch]
        .as_ref()
        .expect("twitch must survive the tiktok quota failure");
    assert_eq!(twitch_stats.followers, 12_000);
}

// =============================================================================
// Combined metrics
// =============================================================================

#[tokio::test]
async fn when_no_records_exist_combine_returns_all_zeroes() {
    let combined = combine(&[]);

    assert_eq!(combined.total_followers, 0);
    assert_eq!(combined.total_engagement, 0);
    assert_eq!(combined.average_engagement_rate, 0.0);
    assert_eq!(combined.platform_count, 0);
}

#[tokio::test]
async fn combine_over_a_fetch_many_batch_sums_reach() {
    let aggregator = StatsAggregatorBuilder::new()
        .with_mock_mode()
        .with_adapter(ScriptedSource::succeeding(PlatformId::Tiktok))
        .with_adapter(ScriptedSource::succeeding(PlatformId::Twitter))
        .build();

    let results = aggregator
        .fetch_many(&[
            identity(PlatformId::Tiktok, "creator"),
            identity(PlatformId::Twitter, "creator"),
        ])
        .await;

    let records: Vec<PlatformStats> = results.values().flatten().cloned().collect();
    let combined = combine(&records);

    assert_eq!(combined.platform_count, 2);
    assert_eq!(combined.total_followers, 24_000);
    assert_eq!(combined.total_engagement, 8_000);
    // both scripted records average 4000/80 = 50
    assert_eq!(combined.average_engagement_rate, 50.0);
}
