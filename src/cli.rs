//! Command-line interface definitions.
//!
//! Each subcommand takes either a single competition URL or a batch config
//! file (`--file`), never both.

use brew_medals::Platform;
use brew_medals::outputs::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

/// Homebrew competition results scraper.
///
/// # Examples
///
/// ```sh
/// # Medals for two brewers at one competition
/// brew_medals medals https://reggiebeer.com/ReggieWeb.php?Web=1000882 -b "Jane Roe,Sam Stout"
///
/// # Every medal a club won, as raw delimited rows
/// brew_medals medals https://myclub.brewcompetition.com/ -c "Foam Rangers" -o csv
///
/// # Key dates for a batch of competitions
/// brew_medals competitions --file competitions.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape medal results
    Medals(MedalsArgs),
    /// Scrape competition key dates
    Competitions(CommonArgs),
}

#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Competition results or information page
    pub url: Option<String>,

    /// Batch config file listing competitions (YAML or JSON)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    /// Skip platform detection and use this parser (bcoem, reggie, bap)
    #[arg(long, env = "BREW_MEDALS_PLATFORM")]
    pub platform: Option<Platform>,

    /// Competitions scraped at once in batch mode
    #[arg(long, default_value_t = 8)]
    pub concurrency: usize,
}

#[derive(Args, Debug)]
pub struct MedalsArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Comma-separated brewer names
    #[arg(short, long)]
    pub brewers: Option<String>,

    /// Club name
    #[arg(short, long)]
    pub club: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("--file cannot be combined with a url")]
    FileWithUrl,
    #[error("--file cannot be combined with --brewers or --club; put them in the config")]
    FileWithFilter,
    #[error("either a url or --file is required")]
    MissingTarget,
}

/// Where the competitions to scrape come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Url(String),
    File(PathBuf),
}

impl CommonArgs {
    pub fn target(&self) -> Result<Target, UsageError> {
        match (&self.file, &self.url) {
            (Some(_), Some(_)) => Err(UsageError::FileWithUrl),
            (Some(file), None) => Ok(Target::File(file.clone())),
            (None, Some(url)) => Ok(Target::Url(url.clone())),
            (None, None) => Err(UsageError::MissingTarget),
        }
    }
}

impl MedalsArgs {
    pub fn target(&self) -> Result<Target, UsageError> {
        if self.common.file.is_some() && (self.brewers.is_some() || self.club.is_some()) {
            return Err(UsageError::FileWithFilter);
        }
        self.common.target()
    }
}
