//! Beer Awards Platform (beerawardsplatform.com) parser.
//!
//! Results pages are a client-rendered app backed by a JSON API. Given the
//! page URL, the competition key (the first path segment, e.g.
//! `2025-ash-copper-state-cup`) is resolved to a competition id and the
//! results are read from the API. Without a URL, or when the API fails, the
//! rendered Material UI cards of a saved page are parsed instead.
//!
//! # API Flow
//!
//! 1. `GET /api/loadCompetitionInfo?competitionKey=<key>&includeEntryCount`
//!    → `competition.competitionId`
//! 2. `GET /api/getResults?competitionId=<id>` → `results.miniBos`, a map of
//!    category id to `{ name: "Stout (6)", positions: { "1": [entry, ...] } }`
//!
//! Best of Show categories are skipped on both paths.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use super::{CompetitionParser, Platform, bap_placement, split_bare_count};
use crate::api::{Fetch, fetch_json};
use crate::error::ParseError;
use crate::models::{Column, Filter, MetadataResult, ParsedResult, ResultRow, rows_to_result};
use crate::utils::element_text;

pub const DEFAULT_API_BASE: &str = "https://beerawardsplatform.com";
const BAP_HOST: &str = "beerawardsplatform.com";
const BEST_OF_SHOW: &str = "Best of Show";

pub const LAYOUT: [(Column, &str); 7] = [
    (Column::Category, "Table / Category"),
    (Column::Place, "Place"),
    (Column::EntryCount, "Entry Count"),
    (Column::EntryName, "Entry Name"),
    (Column::Style, "Style"),
    (Column::Brewer, "Brewer"),
    (Column::Club, "Club"),
];

static CARD: Lazy<Selector> = Lazy::new(|| Selector::parse(".MuiCard-root").expect("static selector"));
static CARD_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".MuiCardHeader-title").expect("static selector"));
static AWARD: Lazy<Selector> = Lazy::new(|| Selector::parse(".jss95").expect("static selector"));
static PLACE: Lazy<Selector> = Lazy::new(|| Selector::parse(".jss99").expect("static selector"));
static DETAILS: Lazy<Selector> = Lazy::new(|| Selector::parse(".jss96").expect("static selector"));
static EM: Lazy<Selector> = Lazy::new(|| Selector::parse("em").expect("static selector"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("static selector"));

#[derive(Debug, Deserialize)]
pub struct CompetitionInfo {
    pub competition: Option<CompetitionRef>,
}

#[derive(Debug, Deserialize)]
pub struct CompetitionRef {
    #[serde(rename = "competitionId")]
    pub competition_id: Option<Value>,
}

impl CompetitionInfo {
    pub fn competition_id(&self) -> Option<String> {
        match self.competition.as_ref()?.competition_id.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ResultsResponse {
    pub results: Option<ResultsBody>,
}

#[derive(Debug, Deserialize)]
pub struct ResultsBody {
    #[serde(rename = "miniBos")]
    pub mini_bos: Option<serde_json::Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct ApiCategory {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    positions: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "styleSubcategory")]
    style_subcategory: Option<String>,
    #[serde(default)]
    participant: Option<ApiParticipant>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiParticipant {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "displayName")]
    display_name: Option<String>,
    #[serde(default)]
    club: Option<String>,
}

impl ApiParticipant {
    fn brewer(&self) -> String {
        [&self.name, &self.display_name]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or_default()
            .to_string()
    }
}

fn trimmed(s: &Option<String>) -> String {
    s.as_deref().unwrap_or_default().trim().to_string()
}

/// Beer Awards Platform parser with its API endpoint.
#[derive(Debug, Clone)]
pub struct BapParser {
    api_base: String,
}

impl Default for BapParser {
    fn default() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }
}

impl BapParser {
    /// Point the API path at another host.
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Rows from the results API, or an error that sends the caller to the
    /// card fallback.
    #[instrument(level = "info", skip(self, fetcher, filter))]
    pub async fn fetch_api_rows<F: Fetch>(
        &self,
        fetcher: &F,
        competition_key: &str,
        filter: &Filter,
    ) -> Result<Vec<ResultRow>, ParseError> {
        let info_url = format!(
            "{}/api/loadCompetitionInfo?competitionKey={}&includeEntryCount",
            self.api_base,
            urlencoding::encode(competition_key)
        );
        let info: CompetitionInfo = fetch_json(fetcher, &info_url).await?;
        let competition_id = info.competition_id().ok_or_else(|| {
            ParseError::ApiFetchFailed("competitionId missing from competition info".to_string())
        })?;
        debug!(%competition_id, "Resolved BAP competition");

        let results_url = format!(
            "{}/api/getResults?competitionId={}",
            self.api_base,
            urlencoding::encode(&competition_id)
        );
        let results: ResultsResponse = fetch_json(fetcher, &results_url).await?;
        api_rows(&results, filter)
    }
}

impl CompetitionParser for BapParser {
    #[instrument(level = "info", skip(self, fetcher, html, filter))]
    async fn parse_results<F: Fetch>(
        &self,
        fetcher: &F,
        html: &str,
        filter: &Filter,
        source_url: Option<&str>,
    ) -> Option<ParsedResult> {
        let mut rows = Vec::new();

        if let Some(key) = source_url.and_then(extract_competition_key) {
            match self.fetch_api_rows(fetcher, &key, filter).await {
                Ok(api) => {
                    debug!(rows = api.len(), "BAP API rows");
                    rows = api;
                }
                Err(e) => warn!(error = %e, "BAP API unavailable; falling back to page cards"),
            }
        }

        if rows.is_empty() {
            rows = card_rows(html, filter);
        }

        if rows.is_empty() {
            error!(
                error = %ParseError::NoResultsFound { platform: Platform::Bap },
                "BAP page had no usable results"
            );
            return None;
        }

        info!(rows = rows.len(), "Parsed BAP results");
        Some(rows_to_result(&LAYOUT, &rows))
    }

    fn parse_metadata(&self, _html: &str) -> Result<MetadataResult, ParseError> {
        Err(ParseError::NotImplemented {
            platform: Platform::Bap,
            operation: "metadata",
        })
    }
}

/// The path segment after the BAP hostname:
/// `https://beerawardsplatform.com/2025-ash-copper-state-cup/results` →
/// `2025-ash-copper-state-cup`.
pub fn extract_competition_key(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if !parsed.host_str()?.to_lowercase().contains(BAP_HOST) {
        return None;
    }
    parsed
        .path_segments()?
        .next()
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Convert a `getResults` response into rows.
pub fn api_rows(results: &ResultsResponse, filter: &Filter) -> Result<Vec<ResultRow>, ParseError> {
    let categories = results
        .results
        .as_ref()
        .and_then(|r| r.mini_bos.as_ref())
        .ok_or_else(|| ParseError::ApiFetchFailed("results.miniBos missing".to_string()))?;

    let mut rows = Vec::new();
    for (category_id, raw) in categories {
        let category: ApiCategory = match serde_json::from_value(raw.clone()) {
            Ok(c) => c,
            Err(e) => {
                warn!(%category_id, error = %e, "Skipping malformed BAP category");
                continue;
            }
        };
        let name_raw = category
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Unknown Category");
        if name_raw.contains(BEST_OF_SHOW) {
            continue;
        }
        let (category_name, entry_count) = split_bare_count(name_raw);

        for (position, entries) in &category.positions {
            let Ok(entries) = serde_json::from_value::<Vec<ApiEntry>>(entries.clone()) else {
                debug!(%category_id, %position, "Position is not an entry list");
                continue;
            };
            for entry in entries {
                let participant = entry.participant.unwrap_or_default();
                let brewer = participant.brewer();
                let club = trimmed(&participant.club);
                if !filter.includes(&brewer, &club) {
                    continue;
                }
                rows.push(ResultRow {
                    category: category_name.clone(),
                    place: bap_placement(position),
                    entry_count: entry_count.clone(),
                    entry_name: trimmed(&entry.name),
                    style: trimmed(&entry.style_subcategory),
                    brewer,
                    club,
                });
            }
        }
    }
    Ok(rows)
}

/// Rows from the rendered category cards of a saved results page.
pub fn card_rows(html: &str, filter: &Filter) -> Vec<ResultRow> {
    let document = Html::parse_document(html);
    let mut rows = Vec::new();

    for card in document.select(&CARD) {
        let title = card.select(&CARD_TITLE).map(element_text).collect::<String>();
        let title = title.trim();
        if title.is_empty() || title.contains(BEST_OF_SHOW) {
            continue;
        }
        let (category, entry_count) = split_bare_count(title);

        for award in card.select(&AWARD) {
            if let Some(row) = award_row(award, &category, &entry_count) {
                if filter.includes(&row.brewer, &row.club) {
                    rows.push(row);
                }
            }
        }
    }
    rows
}

fn award_row(award: ElementRef<'_>, category: &str, entry_count: &str) -> Option<ResultRow> {
    if award.select(&EM).any(|em| element_text(em).contains("No award")) {
        return None;
    }
    let place_raw = award
        .select(&PLACE)
        .next()
        .and_then(|p| p.value().attr("title"))
        .unwrap_or_default();

    let paragraphs: Vec<String> = award
        .select(&DETAILS)
        .flat_map(|d| d.select(&PARAGRAPH))
        .map(element_text)
        .collect();
    if paragraphs.len() < 2 {
        return None;
    }

    let mut brewer = String::new();
    let mut club = String::new();
    for text in &paragraphs[2..] {
        if let Some(rest) = text.strip_prefix("Club:") {
            club = rest.trim().to_string();
        } else if text.starts_with("Collaboration with") {
            continue;
        } else if brewer.is_empty() {
            brewer = text.split(',').next().unwrap_or_default().trim().to_string();
        }
    }

    Some(ResultRow {
        category: category.to_string(),
        place: bap_placement(place_raw),
        entry_count: entry_count.to_string(),
        entry_name: paragraphs[0].clone(),
        style: paragraphs[1].clone(),
        brewer,
        club,
    })
}
