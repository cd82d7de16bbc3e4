//! Competition result parsers for each supported platform.
//!
//! Every platform implements [`CompetitionParser`]. [`Parser`] is the tagged
//! variant the factory hands out, so callers never need to know which
//! concrete strategy they hold.
//!
//! # Supported Platforms
//!
//! | Platform | Module | Sources, in order | Metadata |
//! |----------|--------|-------------------|----------|
//! | BCOEM | [`bcoem`] | winner tables | yes |
//! | Reggie | [`reggie`] | embedded script arrays, rendered tables | no |
//! | Beer Awards Platform | [`bap`] | JSON API, rendered cards | no |
//!
//! Each extraction strategy returns a possibly-empty row set and the first
//! non-empty one wins. Strategy failures are logged and never raised.

pub mod bap;
pub mod bcoem;
pub mod dates;
pub mod platform;
pub mod reggie;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::api::Fetch;
use crate::error::ParseError;
use crate::models::{Filter, MetadataResult, ParsedResult};

pub use bap::BapParser;
pub use bcoem::BcoemParser;
pub use platform::{Platform, detect_platform};
pub use reggie::ReggieParser;

/// The contract shared by all platform parsers.
#[allow(async_fn_in_trait)]
pub trait CompetitionParser {
    /// Extract medal rows from a results page.
    ///
    /// `source_url` lets a parser consult a platform API through `fetcher`
    /// before falling back to the document. `None` means no usable data was
    /// found.
    async fn parse_results<F: Fetch>(
        &self,
        fetcher: &F,
        html: &str,
        filter: &Filter,
        source_url: Option<&str>,
    ) -> Option<ParsedResult>;

    /// Extract the competition's key dates from its information page.
    fn parse_metadata(&self, html: &str) -> Result<MetadataResult, ParseError>;
}

/// A parser bound to one platform.
#[derive(Debug, Clone)]
pub enum Parser {
    Bcoem(BcoemParser),
    Reggie(ReggieParser),
    Bap(BapParser),
}

impl Parser {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Bcoem => Parser::Bcoem(BcoemParser),
            Platform::Reggie => Parser::Reggie(ReggieParser),
            Platform::Bap => Parser::Bap(BapParser::default()),
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            Parser::Bcoem(_) => Platform::Bcoem,
            Parser::Reggie(_) => Platform::Reggie,
            Parser::Bap(_) => Platform::Bap,
        }
    }

    /// Only BCOEM publishes its key dates in a parseable form.
    pub fn supports_metadata(&self) -> bool {
        matches!(self, Parser::Bcoem(_))
    }
}

impl CompetitionParser for Parser {
    async fn parse_results<F: Fetch>(
        &self,
        fetcher: &F,
        html: &str,
        filter: &Filter,
        source_url: Option<&str>,
    ) -> Option<ParsedResult> {
        match self {
            Parser::Bcoem(p) => p.parse_results(fetcher, html, filter, source_url).await,
            Parser::Reggie(p) => p.parse_results(fetcher, html, filter, source_url).await,
            Parser::Bap(p) => p.parse_results(fetcher, html, filter, source_url).await,
        }
    }

    fn parse_metadata(&self, html: &str) -> Result<MetadataResult, ParseError> {
        match self {
            Parser::Bcoem(p) => p.parse_metadata(html),
            Parser::Reggie(p) => p.parse_metadata(html),
            Parser::Bap(p) => p.parse_metadata(html),
        }
    }
}

/// Pick the parser for the platform a URL belongs to.
pub fn get_parser(url: &str) -> Result<Parser, ParseError> {
    Ok(Parser::for_platform(Platform::detect(url)?))
}

/// Pick a parser by platform name, e.g. from a command-line override.
pub fn get_parser_by_name(name: &str) -> Result<Parser, ParseError> {
    Ok(Parser::for_platform(name.parse()?))
}

// ---------------------------------------------------------------------------
// Shared cleanup rules
// ---------------------------------------------------------------------------

static ENTRIES_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\((\d+)\s+entries\)$").expect("static regex"));
static COUNT_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\((\d+)\)$").expect("static regex"));
static LOCATION_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\([^)]+\)\s*$").expect("static regex"));

/// Split `"IPA (12 entries)"` into `("IPA", "12")`.
///
/// A name without the annotation comes back unmodified with an empty count.
pub fn split_entry_count(raw: &str) -> (String, String) {
    split_suffix(&ENTRIES_SUFFIX, raw)
}

/// Split the BAP form `"IPA (12)"` into `("IPA", "12")`.
pub fn split_bare_count(raw: &str) -> (String, String) {
    split_suffix(&COUNT_SUFFIX, raw)
}

fn split_suffix(re: &Regex, raw: &str) -> (String, String) {
    let raw = raw.trim();
    match re.captures(raw) {
        Some(caps) => {
            let count = caps[1].to_string();
            let name = re.replace(raw, "").trim().to_string();
            (name, count)
        }
        None => (raw.to_string(), String::new()),
    }
}

/// Drop the `" MHP"` badge BCOEM appends to opted-in brewers.
pub fn strip_mhp_badge(s: &str) -> String {
    s.replace(" MHP", "")
}

/// `"Name (City, State)"` → `"Name"`.
pub fn strip_location(club: &str) -> String {
    LOCATION_SUFFIX.replace(club, "").trim().to_string()
}

/// Medal label for a 1-4 placement number.
fn medal_label(n: &str) -> Option<&'static str> {
    match n {
        "1" => Some("1st"),
        "2" => Some("2nd"),
        "3" => Some("3rd"),
        "4" => Some("HM"),
        _ => None,
    }
}

/// Reggie convention: unknown placements become `"<N>th"`.
pub fn reggie_placement(place: &str) -> String {
    medal_label(place)
        .map(String::from)
        .unwrap_or_else(|| format!("{place}th"))
}

/// BAP convention: `"1"` or `"#1"` style, unknown values pass through.
pub fn bap_placement(place: &str) -> String {
    medal_label(&place.replacen('#', "", 1))
        .map(String::from)
        .unwrap_or_else(|| place.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_entry_count() {
        assert_eq!(
            split_entry_count("IPA (12 entries)"),
            ("IPA".to_string(), "12".to_string())
        );
        assert_eq!(
            split_entry_count("Table 1: Light Lager (7 entries)"),
            ("Table 1: Light Lager".to_string(), "7".to_string())
        );
    }

    #[test]
    fn test_split_entry_count_without_annotation() {
        assert_eq!(split_entry_count("IPA"), ("IPA".to_string(), String::new()));
        assert_eq!(
            split_entry_count("IPA (12 entries) extra"),
            ("IPA (12 entries) extra".to_string(), String::new())
        );
    }

    #[test]
    fn test_split_bare_count() {
        assert_eq!(
            split_bare_count("Stout (14)"),
            ("Stout".to_string(), "14".to_string())
        );
        assert_eq!(split_bare_count("Stout"), ("Stout".to_string(), String::new()));
    }

    #[test]
    fn test_strip_mhp_badge_only_removes_suffix_form() {
        assert_eq!(strip_mhp_badge("Jane Roe MHP"), "Jane Roe");
        assert_eq!(strip_mhp_badge("MHP Brewing"), "MHP Brewing");
        assert_eq!(strip_mhp_badge("JaneMHP"), "JaneMHP");
    }

    #[test]
    fn test_strip_location() {
        assert_eq!(
            strip_location("Lakewood Fermentation Club (Lakewood, CO)"),
            "Lakewood Fermentation Club"
        );
        assert_eq!(strip_location("No Location"), "No Location");
    }

    #[test]
    fn test_reggie_placement() {
        let got: Vec<String> = ["1", "2", "3", "4", "5"].iter().map(|p| reggie_placement(p)).collect();
        assert_eq!(got, vec!["1st", "2nd", "3rd", "HM", "5th"]);
    }

    #[test]
    fn test_bap_placement() {
        assert_eq!(bap_placement("#1"), "1st");
        assert_eq!(bap_placement("2"), "2nd");
        assert_eq!(bap_placement("#3"), "3rd");
        assert_eq!(bap_placement("#4"), "HM");
        assert_eq!(bap_placement("5"), "5");
        assert_eq!(bap_placement("Honorable Mention"), "Honorable Mention");
    }

    #[test]
    fn test_factory_matches_detector() {
        let cases = [
            ("https://reggiebeer.com/ReggieWeb.php?Web=1", Platform::Reggie),
            ("https://beerawardsplatform.com/comp/results", Platform::Bap),
            ("https://myclub.brewcompetition.com/", Platform::Bcoem),
        ];
        for (url, platform) in cases {
            assert_eq!(get_parser(url).unwrap().platform(), platform);
        }
    }

    #[test]
    fn test_factory_errors() {
        assert!(matches!(get_parser("::nope"), Err(ParseError::InvalidUrl { .. })));
        assert!(matches!(
            get_parser_by_name("brewfest"),
            Err(ParseError::UnsupportedPlatform(_))
        ));
    }

    #[test]
    fn test_metadata_is_platform_conditional() {
        let html = "<html></html>";
        for platform in [Platform::Reggie, Platform::Bap] {
            let err = Parser::for_platform(platform).parse_metadata(html).unwrap_err();
            assert!(matches!(err, ParseError::NotImplemented { .. }));
        }
        assert!(Parser::for_platform(Platform::Bcoem).parse_metadata(html).is_ok());
    }
}
