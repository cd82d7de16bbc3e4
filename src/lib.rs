//! # brew_medals
//!
//! Scrapes medal results and key competition dates from the three common
//! homebrew competition platforms:
//!
//! - **BCOEM** (Brew Competition Online Entry & Management) winner tables
//! - **Reggie** result pages, from either embedded script data or tables
//! - **Beer Awards Platform**, through its results API or the rendered page
//!
//! Results are normalized to a `|`-delimited header and data lines
//! ([`ParsedResult`]) and can be filtered by brewer names or club.
//!
//! ```no_run
//! use brew_medals::{Filter, api::default_fetcher, scrape::scrape_medals};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = default_fetcher();
//! let filter = Filter::new(Some("Jane Roe".into()), None);
//! if let Some(result) =
//!     scrape_medals(&fetcher, "https://myclub.brewcompetition.com/", &filter, None).await?
//! {
//!     println!("{}\n{}", result.header, result.data);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod outputs;
pub mod parsers;
pub mod scrape;
pub mod utils;

pub use error::ParseError;
pub use models::{DELIMITER, Filter, MetadataResult, ParsedResult};
pub use parsers::{CompetitionParser, Parser, Platform, detect_platform, get_parser, get_parser_by_name};
