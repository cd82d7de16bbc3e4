//! Fetch-and-parse pipeline for one competition URL, and batches of them.
//!
//! Each URL is independent: a fetch or parse failure is reported for that
//! URL and never stops the rest of a batch.

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::api::{Fetch, FetchError};
use crate::error::ParseError;
use crate::models::{Filter, MetadataResult, ParsedResult};
use crate::parsers::{CompetitionParser, Parser, Platform};

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

fn parser_for(url: &str, platform: Option<Platform>) -> Result<Parser, ParseError> {
    match platform {
        Some(p) => Ok(Parser::for_platform(p)),
        None => Ok(Parser::for_platform(Platform::detect(url)?)),
    }
}

/// Medal results for one competition. `Ok(None)` means the page had no
/// results in the expected format.
#[instrument(level = "info", skip(fetcher, filter))]
pub async fn scrape_medals<F: Fetch>(
    fetcher: &F,
    url: &str,
    filter: &Filter,
    platform: Option<Platform>,
) -> Result<Option<ParsedResult>, ScrapeError> {
    let parser = parser_for(url, platform)?;
    let html = fetcher.fetch(url).await?;
    let result = parser.parse_results(fetcher, &html, filter, Some(url)).await;
    match &result {
        Some(r) => info!(platform = %parser.platform(), rows = r.row_count(), "Scraped medals"),
        None => warn!(platform = %parser.platform(), "No medal results on page"),
    }
    Ok(result)
}

/// Key dates for one competition.
#[instrument(level = "info", skip(fetcher))]
pub async fn scrape_metadata<F: Fetch>(
    fetcher: &F,
    url: &str,
    platform: Option<Platform>,
) -> Result<MetadataResult, ScrapeError> {
    let parser = parser_for(url, platform)?;
    if !parser.supports_metadata() {
        return Err(ParseError::NotImplemented {
            platform: parser.platform(),
            operation: "metadata",
        }
        .into());
    }
    let html = fetcher.fetch(url).await?;
    Ok(parser.parse_metadata(&html)?)
}

/// Per-URL outcome of a batch, in completion order.
pub type BatchOutcome<T> = Vec<(String, Result<T, ScrapeError>)>;

/// Scrape medals for many competitions, up to `concurrency` at a time.
#[instrument(level = "info", skip_all, fields(count = urls.len(), concurrency = concurrency))]
pub async fn scrape_medals_batch<F: Fetch>(
    fetcher: &F,
    urls: &[String],
    filter: &Filter,
    platform: Option<Platform>,
    concurrency: usize,
) -> BatchOutcome<Option<ParsedResult>> {
    let outcomes: BatchOutcome<Option<ParsedResult>> = stream::iter(urls.iter().cloned())
        .map(|url| async move {
            let result = scrape_medals(fetcher, &url, filter, platform).await;
            if let Err(e) = &result {
                error!(%url, error = %e, "Competition failed");
            }
            (url, result)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let failed = outcomes.iter().filter(|(_, r)| r.is_err()).count();
    info!(total = outcomes.len(), failed, "Batch complete");
    outcomes
}

/// Scrape metadata for many competitions, up to `concurrency` at a time.
#[instrument(level = "info", skip_all, fields(count = urls.len(), concurrency = concurrency))]
pub async fn scrape_metadata_batch<F: Fetch>(
    fetcher: &F,
    urls: &[String],
    platform: Option<Platform>,
    concurrency: usize,
) -> BatchOutcome<MetadataResult> {
    stream::iter(urls.iter().cloned())
        .map(|url| async move {
            let result = scrape_metadata(fetcher, &url, platform).await;
            if let Err(e) = &result {
                error!(%url, error = %e, "Competition failed");
            }
            (url, result)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}
