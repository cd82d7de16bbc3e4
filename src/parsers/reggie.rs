//! Reggie (reggiebeer.com) parser.
//!
//! Live Reggie pages ship their results as JavaScript array literals and
//! render them client-side:
//!
//! ```text
//! var saReggieGroups=[["American Lager","","",14,[]],...];
//! var aaReggieMedals=[["1","1","1st","Donald Schneider","American Lager","1B American Lager","Lager Than Life","Lakewood Fermentation Club (Lakewood, CO)",...],...];
//! ```
//!
//! Saved pages only have the rendered table, where `td.GroupHeader` rows
//! open each category. The script literals are tried first; the table is
//! the fallback.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

use super::{CompetitionParser, Platform, reggie_placement, split_entry_count, strip_location};
use crate::api::Fetch;
use crate::error::ParseError;
use crate::models::{Column, Filter, MetadataResult, ParsedResult, ResultRow, rows_to_result};
use crate::utils::element_text;

pub const LAYOUT: [(Column, &str); 7] = [
    (Column::Category, "Table / Category"),
    (Column::Place, "Medal"),
    (Column::EntryCount, "Entry Count"),
    (Column::Brewer, "Brewer"),
    (Column::Style, "Style"),
    (Column::EntryName, "Brew Name"),
    (Column::Club, "Club"),
];

static MEDALS_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"var\s+aaReggieMedals\s*=\s*\[([\S\s]*?)\];").expect("static regex")
});
static GROUPS_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"var\s+saReggieGroups\s*=\s*\[([\S\s]*?)\];").expect("static regex")
});
// ["<category>","","",<count>,
static GROUP_TUPLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\["([^"]+)(?:","[^"]*){2}",(\d+),"#).expect("static regex"));
// ["<place>","<type>","<label>","<brewer>","<category>","<style>","<beer>","<club>"
static MEDAL_TUPLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\["(\d+)","(\d+)","([^"]*)","([^"]*)","([^"]*)","([^"]*)","([^"]*)","([^"]*)""#)
        .expect("static regex")
});

static TABLE_ROWS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody tr").expect("static selector"));
static GROUP_HEADER: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.GroupHeader").expect("static selector"));
static HEADER_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("th").expect("static selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("static selector"));
static SPAN: Lazy<Selector> = Lazy::new(|| Selector::parse("span").expect("static selector"));

/// Where rows can come from, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReggieSource {
    Script,
    Table,
}

impl ReggieSource {
    pub const ORDER: [ReggieSource; 2] = [ReggieSource::Script, ReggieSource::Table];

    pub fn extract(self, html: &str, filter: &Filter) -> Vec<ResultRow> {
        match self {
            ReggieSource::Script => extract_script_rows(html, filter),
            ReggieSource::Table => extract_table_rows(html, filter),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReggieParser;

impl CompetitionParser for ReggieParser {
    #[instrument(level = "info", skip_all)]
    async fn parse_results<F: Fetch>(
        &self,
        _fetcher: &F,
        html: &str,
        filter: &Filter,
        _source_url: Option<&str>,
    ) -> Option<ParsedResult> {
        for source in ReggieSource::ORDER {
            let rows = source.extract(html, filter);
            if !rows.is_empty() {
                info!(?source, rows = rows.len(), "Parsed Reggie results");
                return Some(rows_to_result(&LAYOUT, &rows));
            }
            debug!(?source, "Reggie source produced no rows");
        }

        warn!(
            error = %ParseError::NoResultsFound { platform: Platform::Reggie },
            "Reggie page had no usable results"
        );
        None
    }

    fn parse_metadata(&self, _html: &str) -> Result<MetadataResult, ParseError> {
        Err(ParseError::NotImplemented {
            platform: Platform::Reggie,
            operation: "metadata",
        })
    }
}

/// Rows from the `aaReggieMedals` / `saReggieGroups` script literals.
///
/// Both literals must be present. Tuples that don't match the expected shape
/// are skipped and whatever matched is kept.
pub fn extract_script_rows(html: &str, filter: &Filter) -> Vec<ResultRow> {
    let (Some(medals), Some(groups)) = (MEDALS_LITERAL.captures(html), GROUPS_LITERAL.captures(html))
    else {
        return Vec::new();
    };

    let entry_counts: HashMap<String, String> = GROUP_TUPLE
        .captures_iter(&groups[1])
        .map(|caps| (caps[1].trim().to_string(), caps[2].trim().to_string()))
        .collect();
    debug!(groups = entry_counts.len(), "Read Reggie group entry counts");

    let mut rows = Vec::new();
    for caps in MEDAL_TUPLE.captures_iter(&medals[1]) {
        let brewer = caps[4].trim().to_string();
        let category = caps[5].trim().to_string();
        let club = strip_location(caps[8].trim());

        if !filter.includes(&brewer, &club) {
            continue;
        }

        rows.push(ResultRow {
            entry_count: entry_counts.get(&category).cloned().unwrap_or_default(),
            place: reggie_placement(caps[1].trim()),
            style: caps[6].trim().to_string(),
            entry_name: caps[7].trim().to_string(),
            category,
            brewer,
            club,
        });
    }
    rows
}

/// Rows from a rendered results table.
///
/// A `td.GroupHeader` row sets the category for the data rows below it.
/// Data cells are Brewer | Medal | Style | Brew Name | Club.
pub fn extract_table_rows(html: &str, filter: &Filter) -> Vec<ResultRow> {
    let document = Html::parse_document(html);
    let mut rows = Vec::new();
    let mut category = String::new();
    let mut entry_count = String::new();

    for tr in document.select(&TABLE_ROWS) {
        if let Some(group) = tr.select(&GROUP_HEADER).next() {
            (category, entry_count) = split_entry_count(&element_text(group));
            continue;
        }
        if tr.select(&HEADER_CELL).next().is_some() {
            continue;
        }

        let cells: Vec<_> = tr.select(&CELL).collect();
        if cells.len() < 5 {
            continue;
        }

        // The brewer cell may carry a badge next to the name span.
        let brewer = match cells[0].select(&SPAN).next() {
            Some(span) => element_text(span),
            None => element_text(cells[0]),
        };
        let club = strip_location(&element_text(cells[4]));

        if !filter.includes(&brewer, &club) {
            continue;
        }

        let medal = element_text(cells[1]);
        let place = if !medal.is_empty() && medal.chars().all(|c| c.is_ascii_digit()) {
            reggie_placement(&medal)
        } else {
            medal
        };

        rows.push(ResultRow {
            category: category.clone(),
            place,
            entry_count: entry_count.clone(),
            entry_name: element_text(cells[3]),
            style: element_text(cells[2]),
            brewer,
            club,
        });
    }
    rows
}
