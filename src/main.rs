//! # brew_medals
//!
//! Command-line front end: scrape one competition or a batch of them and
//! print the results to stdout as JSON or raw `|`-delimited rows.
//!
//! ## Usage
//!
//! ```sh
//! brew_medals medals https://reggiebeer.com/ReggieWeb.php?Web=1000882 -b "Jane Roe"
//! brew_medals competitions --file competitions.yaml -o csv
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` to change verbosity.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use brew_medals::api::default_fetcher;
use brew_medals::config::BatchConfig;
use brew_medals::models::Filter;
use brew_medals::outputs::{self, OutputFormat, ResultKind};
use brew_medals::scrape::{BatchOutcome, scrape_medals_batch, scrape_metadata_batch};
use brew_medals::ParsedResult;
use cli::{Cli, Command, Target};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let fetcher = default_fetcher();

    let (failed, total) = match args.command {
        Command::Medals(medals) => {
            let (urls, filter) = match medals.target()? {
                Target::Url(url) => (vec![url], Filter::new(medals.brewers, medals.club)),
                Target::File(path) => {
                    let config = BatchConfig::load(&path).await?;
                    let filter = config.filter();
                    (config.competitions, filter)
                }
            };
            info!(competitions = urls.len(), ?filter, "Scraping medals");
            let common = medals.common;
            let outcomes =
                scrape_medals_batch(&fetcher, &urls, &filter, common.platform, common.concurrency)
                    .await;
            let outcomes = in_input_order(&urls, outcomes)
                .into_iter()
                .map(|(url, result)| {
                    let result = result.map(|found| {
                        found.unwrap_or_else(|| {
                            warn!(%url, "No results found");
                            ParsedResult::default()
                        })
                    });
                    (url, result)
                })
                .collect();
            emit(outcomes, common.output, ResultKind::Medals)?
        }
        Command::Competitions(common) => {
            let urls = match common.target()? {
                Target::Url(url) => vec![url],
                Target::File(path) => BatchConfig::load(&path).await?.competitions,
            };
            info!(competitions = urls.len(), "Scraping competition dates");
            let outcomes =
                scrape_metadata_batch(&fetcher, &urls, common.platform, common.concurrency).await;
            emit(in_input_order(&urls, outcomes), common.output, ResultKind::Metadata)?
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        total,
        failed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    if total > 0 && failed == total {
        return Err("every competition failed; see log for details".into());
    }
    Ok(())
}

/// Batches complete out of order; print in the order the user listed.
fn in_input_order<T>(urls: &[String], mut outcomes: BatchOutcome<T>) -> BatchOutcome<T> {
    outcomes.sort_by_key(|(url, _)| urls.iter().position(|u| u == url).unwrap_or(usize::MAX));
    outcomes
}

/// Print successful results to stdout. Returns `(failed, total)`.
fn emit(
    outcomes: BatchOutcome<ParsedResult>,
    format: OutputFormat,
    kind: ResultKind,
) -> Result<(usize, usize), serde_json::Error> {
    let total = outcomes.len();
    let mut failed = 0;
    for (url, result) in outcomes {
        match result {
            Ok(parsed) => {
                if parsed.header.is_empty() {
                    continue;
                }
                println!("{}", outputs::render(&parsed, format, kind)?);
            }
            Err(e) => {
                error!(%url, error = %e, "Skipping competition");
                failed += 1;
            }
        }
    }
    Ok((failed, total))
}
