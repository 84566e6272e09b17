//! Adapter contract for platform statistics sources.

use std::future::Future;
use std::pin::Pin;

use crate::{FetchError, Handle, PlatformId, PlatformStats};

/// Platform adapter contract.
///
/// One implementation per provider, owning its endpoint, credentials and
/// query-parameter naming. Implementations convert every expected failure
/// mode into a classified [`FetchError`]; nothing escapes raw. Adapters
/// never touch the response cache; caching policy is centralized in the
/// aggregator.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the aggregator shares them
/// across concurrently spawned fetch tasks.
pub trait StatsSource: Send + Sync {
    /// Returns the platform this adapter serves.
    fn id(&self) -> PlatformId;

    /// Fetches and normalizes public statistics for one handle.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] with kind:
    /// - `QuotaExceeded` when the provider reports a usage cap
    /// - `NotFound` when the handle does not exist on the provider
    /// - `Generic` for transport failures and malformed payloads
    fn fetch<'a>(
        &'a self,
        handle: &'a Handle,
    ) -> Pin<Box<dyn Future<Output = Result<PlatformStats, FetchError>> + Send + 'a>>;
}
