use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Handle, ValidationError};

/// Canonical platform identifiers used in cache keys and envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    Tiktok,
    Twitter,
    Twitch,
}

impl PlatformId {
    pub const ALL: [Self; 3] = [Self::Tiktok, Self::Twitter, Self::Twitch];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tiktok => "tiktok",
            Self::Twitter => "twitter",
            Self::Twitch => "twitch",
        }
    }
}

impl Display for PlatformId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tiktok" => Ok(Self::Tiktok),
            "twitter" | "x" => Ok(Self::Twitter),
            "twitch" => Ok(Self::Twitch),
            other => Err(ValidationError::InvalidPlatform {
                value: other.to_owned(),
            }),
        }
    }
}

/// One creator handle on one platform. Immutable; supplied per call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformIdentity {
    platform: PlatformId,
    handle: Handle,
}

impl PlatformIdentity {
    pub fn new(platform: PlatformId, handle: Handle) -> Self {
        Self { platform, handle }
    }

    pub const fn platform(&self) -> PlatformId {
        self.platform
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Stable cache key for this identity.
    ///
    /// The handle portion is case-sensitive as supplied; "User" and "user"
    /// map to distinct keys even where the upstream provider resolves them
    /// to the same account.
    pub fn cache_key(&self) -> String {
        cache_key(self.platform, &self.handle)
    }
}

impl Display for PlatformIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.platform, self.handle)
    }
}

/// Cache key for a (platform, handle) pair.
pub fn cache_key(platform: PlatformId, handle: &Handle) -> String {
    format!("{}:{}", platform.as_str(), handle.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_platform_names() {
        assert_eq!("tiktok".parse::<PlatformId>(), Ok(PlatformId::Tiktok));
        assert_eq!(" Twitch ".parse::<PlatformId>(), Ok(PlatformId::Twitch));
        assert_eq!("x".parse::<PlatformId>(), Ok(PlatformId::Twitter));
        assert!(matches!(
            "myspace".parse::<PlatformId>(),
            Err(ValidationError::InvalidPlatform { .. })
        ));
    }

    #[test]
    fn cache_key_preserves_handle_case() {
        let upper = PlatformIdentity::new(
            PlatformId::Twitch,
            Handle::parse("StreamerOne").expect("valid handle"),
        );
        let lower = PlatformIdentity::new(
            PlatformId::Twitch,
            Handle::parse("streamerone").expect("valid handle"),
        );

        assert_eq!(upper.cache_key(), "twitch:StreamerOne");
        assert_ne!(upper.cache_key(), lower.cache_key());
    }
}
