//! # Sociostat Core
//!
//! Core contracts and platform adapters for the sociostat creator
//! statistics toolkit.
//!
//! ## Overview
//!
//! Given a creator's per-platform handles, this crate fetches each
//! provider's public profile endpoint, normalizes the wildly different
//! response shapes into one [`PlatformStats`] record, caches results for
//! five minutes to bound external call volume, and combines records into
//! aggregate reach figures.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (TikTok, Twitter, Twitch) with pure normalizers |
//! | [`aggregator`] | Cache-first concurrent fan-out over the adapters |
//! | [`cache`] | TTL response cache with injectable clock |
//! | [`classify`] | Failure classification (quota / not-found / generic) |
//! | [`combine`] | Reduction into combined reach metrics |
//! | [`domain`] | Unified record, handle and timestamp types |
//! | [`envelope`] | Response envelope for machine-readable outputs |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`platform`] | Platform identifiers and identities |
//! | [`stats_source`] | Adapter contract |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sociostat_core::{
//!     Handle, PlatformId, PlatformIdentity, StatsAggregatorBuilder, combine,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let aggregator = StatsAggregatorBuilder::new().with_real_clients().build();
//!
//!     let identities = vec![
//!         PlatformIdentity::new(PlatformId::Tiktok, Handle::parse("somecreator")?),
//!         PlatformIdentity::new(PlatformId::Twitch, Handle::parse("somecreator")?),
//!     ];
//!
//!     let results = aggregator.fetch_many(&identities).await;
//!     let records: Vec<_> = results.values().flatten().cloned().collect();
//!     let combined = combine(&records);
//!     println!("total reach: {}", combined.total_followers);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Expected failures never panic and never escape raw; adapters and the
//! aggregator return classified [`FetchError`] values:
//!
//! ```rust
//! use sociostat_core::{FetchError, FetchErrorKind};
//!
//! fn handle_error(error: FetchError) {
//!     match error.kind() {
//!         FetchErrorKind::QuotaExceeded => {
//!             // provider cap hit; retry later
//!         }
//!         FetchErrorKind::NotFound => {
//!             // bad handle; ask the user to correct it
//!         }
//!         FetchErrorKind::Generic => {
//!             // transport or parse failure; retry is reasonable
//!         }
//!     }
//! }
//! ```
//!
//! One platform's failure never blanks out the others: `fetch_many`
//! resolves every identity to completion and surfaces failed platforms as
//! `None` in the result map.
//!
//! ## Security
//!
//! - The shared gateway credential is read from environment variables
//!   only and never logged
//! - All real HTTP requests go through a single audited transport

pub mod adapters;
pub mod aggregator;
pub mod cache;
pub mod classify;
pub mod combine;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod platform;
pub mod stats_source;

// Re-export commonly used types at crate root for convenience

// Adapter implementations
pub use adapters::{TikTokAdapter, TwitchAdapter, TwitterAdapter};

// Aggregation
pub use aggregator::{StatsAggregator, StatsAggregatorBuilder};

// Caching
pub use cache::{Clock, StatsCache, SystemClock};

// Classification
pub use classify::{classify_message, classify_response, FetchError, FetchErrorKind};

// Combined metrics
pub use combine::{combine, CombinedMetrics};

// Domain models
pub use domain::{Handle, PlatformCounts, PlatformProfile, PlatformStats, UtcDateTime};

// Envelope types
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};

// Error types
pub use error::{CoreError, ValidationError};

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};

// Platform identifiers
pub use platform::{cache_key, PlatformId, PlatformIdentity};

// Adapter contract
pub use stats_source::StatsSource;
