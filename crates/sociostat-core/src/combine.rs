//! Reduction of normalized records into combined reach figures.

use serde::{Deserialize, Serialize};

use crate::PlatformStats;

/// Aggregate reach/engagement across platforms. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedMetrics {
    pub total_followers: u64,
    pub total_engagement: u64,
    pub average_engagement_rate: f64,
    pub platform_count: usize,
}

impl CombinedMetrics {
    pub const fn zero() -> Self {
        Self {
            total_followers: 0,
            total_engagement: 0,
            average_engagement_rate: 0.0,
            platform_count: 0,
        }
    }
}

/// Combine normalized records into aggregate totals.
///
/// `average_engagement_rate` is the arithmetic mean of each record's
/// per-platform average. It is deliberately not re-derived from the
/// summed totals and not weighted by followers: a small platform's
/// engagement counts as much as a large one's. Empty input yields the
/// all-zero value.
pub fn combine(records: &[PlatformStats]) -> CombinedMetrics {
    if records.is_empty() {
        return CombinedMetrics::zero();
    }

    let total_followers = records
        .iter()
        .fold(0_u64, |acc, record| acc.saturating_add(record.followers));
    let total_engagement = records.iter().fold(0_u64, |acc, record| {
        acc.saturating_add(record.total_engagement)
    });
    let average_engagement_rate = records
        .iter()
        .map(|record| record.average_engagement)
        .sum::<f64>()
        / records.len() as f64;

    CombinedMetrics {
        total_followers,
        total_engagement,
        average_engagement_rate,
        platform_count: records.len(),
    }
}
