//! Error types shared by the parsers.
//!
//! Only [`ParseError::InvalidUrl`] and [`ParseError::UnsupportedPlatform`] are
//! meant to reach a caller. The structural conditions (`TableNotFound`,
//! `NoResultsFound`, `NoDateFound`, `ApiFetchFailed`) are logged where they
//! occur and turned into an absent or empty result.

use crate::parsers::Platform;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("no winner tables found")]
    TableNotFound,

    #[error("no results found in {platform} format")]
    NoResultsFound { platform: Platform },

    #[error("no date ranges found in {0:?}")]
    NoDateFound(String),

    #[error("api fetch failed: {0}")]
    ApiFetchFailed(String),

    #[error("{platform} {operation} parsing is not implemented")]
    NotImplemented {
        platform: Platform,
        operation: &'static str,
    },
}

impl From<crate::api::FetchError> for ParseError {
    fn from(e: crate::api::FetchError) -> Self {
        ParseError::ApiFetchFailed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_implemented_message_names_platform() {
        let e = ParseError::NotImplemented {
            platform: Platform::Bap,
            operation: "metadata",
        };
        assert_eq!(e.to_string(), "bap metadata parsing is not implemented");
    }

    #[test]
    fn test_invalid_url_keeps_source() {
        let source = url::Url::parse("not a url").unwrap_err();
        let e = ParseError::InvalidUrl {
            url: "not a url".to_string(),
            source,
        };
        assert!(std::error::Error::source(&e).is_some());
        assert!(e.to_string().contains("not a url"));
    }
}
