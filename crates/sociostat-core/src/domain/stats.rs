use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Handle, PlatformId, UtcDateTime, ValidationError};

/// Profile fields shared by every provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformProfile {
    pub display_name: String,
    pub profile_image_url: Option<String>,
    pub bio: Option<String>,
    pub verified: bool,
}

/// Raw count fields shared by every provider. Unsigned by construction,
/// so the "never negative" contract holds at the type level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformCounts {
    pub followers: u64,
    pub following: u64,
    pub total_content: u64,
    pub total_engagement: u64,
}

/// Unified, provider-agnostic statistics record.
///
/// `average_engagement` is always derived from `total_engagement` and
/// `total_content` by the constructor; it is never read from a provider
/// payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub platform: PlatformId,
    pub handle: Handle,
    pub display_name: String,
    pub profile_image_url: Option<String>,
    pub bio: Option<String>,
    pub verified: bool,
    pub followers: u64,
    pub following: u64,
    pub total_content: u64,
    pub total_engagement: u64,
    pub average_engagement: f64,
    pub fetched_at: UtcDateTime,
    /// The provider payload as received, for downstream debugging.
    pub raw: Value,
}

impl PlatformStats {
    pub fn new(
        platform: PlatformId,
        handle: Handle,
        profile: PlatformProfile,
        counts: PlatformCounts,
        fetched_at: UtcDateTime,
        raw: Value,
    ) -> Result<Self, ValidationError> {
        if profile.display_name.trim().is_empty() {
            return Err(ValidationError::EmptyDisplayName);
        }

        let average_engagement = if counts.total_content > 0 {
            counts.total_engagement as f64 / counts.total_content as f64
        } else {
            0.0
        };

        Ok(Self {
            platform,
            handle,
            display_name: profile.display_name,
            profile_image_url: profile.profile_image_url,
            bio: profile.bio,
            verified: profile.verified,
            followers: counts.followers,
            following: counts.following,
            total_content: counts.total_content,
            total_engagement: counts.total_engagement,
            average_engagement,
            fetched_at,
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> PlatformProfile {
        PlatformProfile {
            display_name: name.to_owned(),
            profile_image_url: None,
            bio: None,
            verified: false,
        }
    }

    #[test]
    fn derives_average_engagement_from_counts() {
        let stats = PlatformStats::new(
            PlatformId::Tiktok,
            Handle::parse("creator").expect("valid handle"),
            profile("Creator"),
            PlatformCounts {
                followers: 1_000,
                following: 50,
                total_content: 40,
                total_engagement: 10_000,
            },
            UtcDateTime::parse("2025-06-01T00:00:00Z").expect("timestamp"),
            Value::Null,
        )
        .expect("stats should build");

        assert_eq!(stats.average_engagement, 250.0);
    }

    #[test]
    fn zero_content_yields_zero_average() {
        let stats = PlatformStats::new(
            PlatformId::Twitch,
            Handle::parse("streamer").expect("valid handle"),
            profile("Streamer"),
            PlatformCounts {
                followers: 9,
                total_engagement: 999,
                ..PlatformCounts::default()
            },
            UtcDateTime::parse("2025-06-01T00:00:00Z").expect("timestamp"),
            Value::Null,
        )
        .expect("stats should build");

        assert_eq!(stats.average_engagement, 0.0);
    }

    #[test]
    fn rejects_empty_display_name() {
        let err = PlatformStats::new(
            PlatformId::Twitter,
            Handle::parse("someone").expect("valid handle"),
            profile("  "),
            PlatformCounts::default(),
            UtcDateTime::parse("2025-06-01T00:00:00Z").expect("timestamp"),
            Value::Null,
        )
        .expect_err("must fail");

        assert!(matches!(err, ValidationError::EmptyDisplayName));
    }
}
