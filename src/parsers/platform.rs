//! Platform detection from a competition URL.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Competition-management site family a page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Bcoem,
    Reggie,
    Bap,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Bcoem, Platform::Reggie, Platform::Bap];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Bcoem => "bcoem",
            Platform::Reggie => "reggie",
            Platform::Bap => "bap",
        }
    }

    /// Classify a URL by its hostname.
    ///
    /// Hosts containing `reggiebeer.com` are Reggie, `beerawardsplatform.com`
    /// is BAP, and anything else is treated as a self-hosted BCOEM install.
    pub fn detect(url: &str) -> Result<Platform, ParseError> {
        let parsed = Url::parse(url).map_err(|source| ParseError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let host = parsed.host_str().unwrap_or_default().to_lowercase();

        let platform = if host.contains("reggiebeer.com") {
            Platform::Reggie
        } else if host.contains("beerawardsplatform.com") {
            Platform::Bap
        } else {
            Platform::Bcoem
        };
        Ok(platform)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::UnsupportedPlatform(s.to_string()))
    }
}

/// Detect the platform a URL belongs to.
pub fn detect_platform(url: &str) -> Result<Platform, ParseError> {
    Platform::detect(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_reggie() {
        let p = detect_platform("https://reggiebeer.com/ReggieWeb.php?Web=1000882").unwrap();
        assert_eq!(p, Platform::Reggie);
    }

    #[test]
    fn test_detects_bap() {
        let p = detect_platform("https://beerawardsplatform.com/2025-ash-copper-state-cup/results")
            .unwrap();
        assert_eq!(p, Platform::Bap);
    }

    #[test]
    fn test_defaults_to_bcoem() {
        let p = detect_platform("https://example.com/competition").unwrap();
        assert_eq!(p, Platform::Bcoem);
    }

    #[test]
    fn test_subdomains_and_case() {
        assert_eq!(
            detect_platform("https://subdomain.reggiebeer.com/results").unwrap(),
            Platform::Reggie
        );
        assert_eq!(
            detect_platform("https://WWW.BeerAwardsPlatform.com/x/results").unwrap(),
            Platform::Bap
        );
    }

    #[test]
    fn test_only_hostname_is_considered() {
        let p = detect_platform("https://example.com/reggiebeer.com/results").unwrap();
        assert_eq!(p, Platform::Bcoem);
    }

    #[test]
    fn test_malformed_url_is_invalid() {
        let err = detect_platform("reggiebeer.com/results").unwrap_err();
        assert!(matches!(err, ParseError::InvalidUrl { .. }));
    }

    #[test]
    fn test_from_str_round_trips_names() {
        for p in Platform::ALL {
            assert_eq!(p.as_str().parse::<Platform>().unwrap(), p);
        }
        assert_eq!("BAP".parse::<Platform>().unwrap(), Platform::Bap);
        assert!(matches!(
            "untappd".parse::<Platform>(),
            Err(ParseError::UnsupportedPlatform(_))
        ));
    }
}
