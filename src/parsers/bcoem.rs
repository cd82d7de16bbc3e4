//! BCOEM (Brew Competition Online Entry & Management) parser.
//!
//! BCOEM is self-hosted, so any host that isn't a known platform lands
//! here. Results pages render one `.bcoem-winner-table` block per judging
//! table:
//!
//! ```html
//! <div class="bcoem-winner-table">
//!   <h3>Table 1: Light Lager (7 entries)</h3>
//!   <table>
//!     <thead><tr><th>Place</th><th>Brewer</th><th>Entry Name</th><th>Style</th><th>Club</th></tr></thead>
//!     <tbody><tr><td>1st</td><td>Jane Roe MHP</td>...</tr></tbody>
//!   </table>
//! </div>
//! ```
//!
//! Blocks headed "Brewers" or "Clubs" are leaderboards, not results, and are
//! skipped.

use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};

use super::dates::{DateWindow, extract_date_window};
use super::{CompetitionParser, split_entry_count, strip_mhp_badge};
use crate::api::Fetch;
use crate::error::ParseError;
use crate::models::{Filter, MetadataResult, ParsedResult};
use crate::utils::{element_text, sanitize_field};

static WINNER_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".bcoem-winner-table").expect("static selector"));
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h3").expect("static selector"));
static HEADER_CELLS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table thead tr th").expect("static selector"));
static BODY_ROWS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table tbody tr").expect("static selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("static selector"));

const PREFIX: [&str; 3] = ["Table / Category", "Place", "Entry Count"];
const BREWER_CELL: usize = 1;
const CLUB_CELL: usize = 4;

/// Anchors on the competition info page and which `<p>` after each one holds
/// the text. `dated` fields expand into start/end columns.
struct MetadataField {
    column: &'static str,
    anchor: &'static str,
    paragraph: usize,
    dated: bool,
}

const METADATA_FIELDS: [MetadataField; 7] = [
    MetadataField { column: "entrant_registration", anchor: "reg_window", paragraph: 0, dated: true },
    MetadataField { column: "volunteer_registration", anchor: "reg_window", paragraph: 1, dated: true },
    MetadataField { column: "entry_registration", anchor: "entry-registration", paragraph: 0, dated: true },
    MetadataField { column: "num_required", anchor: "entry-acceptance-rules", paragraph: 0, dated: false },
    MetadataField { column: "drop_off_window", anchor: "drop-off-locations", paragraph: 0, dated: true },
    MetadataField { column: "shipping_window", anchor: "shipping-info", paragraph: 0, dated: true },
    MetadataField { column: "awards_ceremony", anchor: "awards-ceremony", paragraph: 0, dated: true },
];

#[derive(Debug, Clone, Copy, Default)]
pub struct BcoemParser;

impl BcoemParser {
    /// Column names of the metadata record, in order.
    pub fn metadata_header() -> Vec<String> {
        METADATA_FIELDS
            .iter()
            .flat_map(|f| {
                let mut cols = vec![f.column.to_string()];
                if f.dated {
                    cols.push(format!("{}_start_date", f.column));
                    cols.push(format!("{}_end_date", f.column));
                }
                cols
            })
            .collect()
    }

    #[instrument(level = "info", skip_all)]
    fn extract_results(&self, html: &str, filter: &Filter) -> Option<ParsedResult> {
        let document = Html::parse_document(html);
        let tables: Vec<ElementRef<'_>> = document.select(&WINNER_TABLE).collect();
        if tables.is_empty() {
            warn!(error = %ParseError::TableNotFound, "BCOEM results page has no winner tables");
            return None;
        }

        let mut header: Vec<String> = Vec::new();
        let mut data: Vec<Vec<String>> = Vec::new();

        for table in tables {
            let heading = table.select(&HEADING).map(element_text).collect::<String>();
            if heading.contains("Brewers") || heading.contains("Clubs") {
                debug!(%heading, "Skipping leaderboard table");
                continue;
            }
            let (table_name, entry_count) = split_entry_count(&heading);

            if header.is_empty() {
                header.extend(PREFIX.iter().map(|s| s.to_string()));
                header.extend(table.select(&HEADER_CELLS).skip(1).map(element_text));
            }

            for row in table.select(&BODY_ROWS) {
                let cells: Vec<String> = row
                    .select(&CELL)
                    .map(|td| strip_mhp_badge(&element_text(td)))
                    .collect();
                if cells.is_empty() {
                    continue;
                }

                let brewer = cells.get(BREWER_CELL).map(|s| s.trim()).unwrap_or_default();
                let club = cells.get(CLUB_CELL).map(|s| s.trim()).unwrap_or_default();
                if !filter.includes(brewer, club) {
                    continue;
                }

                let mut fields = vec![
                    sanitize_field(&table_name),
                    sanitize_field(&cells[0]),
                    entry_count.clone(),
                ];
                fields.extend(cells.iter().skip(1).map(|c| sanitize_field(c)));
                data.push(fields);
            }
        }

        if header.is_empty() {
            warn!(error = %ParseError::TableNotFound, "BCOEM page only has leaderboard tables");
            return None;
        }

        info!(rows = data.len(), "Parsed BCOEM results");
        Some(ParsedResult::from_rows(&header, data))
    }
}

impl CompetitionParser for BcoemParser {
    async fn parse_results<F: Fetch>(
        &self,
        _fetcher: &F,
        html: &str,
        filter: &Filter,
        _source_url: Option<&str>,
    ) -> Option<ParsedResult> {
        self.extract_results(html, filter)
    }

    /// Read the registration, drop-off, shipping and awards windows.
    ///
    /// A field whose text holds no date (such as the bottle count, or a
    /// missing anchor) gets empty start/end columns instead of failing the
    /// whole record.
    #[instrument(level = "info", skip_all)]
    fn parse_metadata(&self, html: &str) -> Result<MetadataResult, ParseError> {
        let document = Html::parse_document(html);
        let mut values = Vec::new();

        for field in &METADATA_FIELDS {
            let text = paragraph_after_anchor(&document, field.anchor, field.paragraph)
                .map(|p| clean_metadata_text(&p))
                .unwrap_or_default();
            values.push(text.clone());

            if field.dated {
                let DateWindow { start, end } = extract_date_window(&text).unwrap_or_else(|e| {
                    debug!(column = field.column, error = %e, "No date window in field");
                    DateWindow { start: None, end: None }
                });
                values.push(start.map(format_instant).unwrap_or_default());
                values.push(end.map(format_instant).unwrap_or_default());
            }
        }

        Ok(ParsedResult::from_rows(&Self::metadata_header(), vec![values]))
    }
}

/// Text of the `nth` `<p>` sibling following `<a name="anchor">`.
fn paragraph_after_anchor(document: &Html, anchor: &str, nth: usize) -> Option<String> {
    let selector = Selector::parse(&format!(r#"a[name="{anchor}"]"#)).ok()?;
    let anchor = document.select(&selector).next()?;
    anchor
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "p")
        .nth(nth)
        .map(element_text)
}

/// Collapse whitespace and drop the field delimiter. Commas are kept since
/// they are part of the date format.
fn clean_metadata_text(s: &str) -> String {
    s.split_whitespace().join(" ").replace('|', "")
}

fn format_instant(dt: chrono::DateTime<chrono::Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HttpFetcher;
    use pretty_assertions::assert_eq;

    const RESULTS: &str = include_str!("../../tests/fixtures/bcoem_results.html");
    const INFO: &str = include_str!("../../tests/fixtures/bcoem_info.html");

    async fn parse(html: &str, filter: Filter) -> Option<ParsedResult> {
        BcoemParser.parse_results(&HttpFetcher::default(), html, &filter, None).await
    }

    #[tokio::test]
    async fn test_header_has_fixed_prefix() {
        let result = parse(RESULTS, Filter::default()).await.unwrap();
        assert_eq!(
            result.header,
            "Table / Category|Place|Entry Count|Brewer|Entry Name|Style|Club"
        );
    }

    #[tokio::test]
    async fn test_rows_split_category_and_count() {
        let result = parse(RESULTS, Filter::default()).await.unwrap();
        let rows: Vec<Vec<&str>> = result.rows().collect();
        assert_eq!(rows.len(), 5);
        assert_eq!(
            rows[0],
            vec!["Table 1: Light Lager", "1st", "7", "Jane Roe", "Crispy Boi", "1A American Light Lager", "Lakewood Fermentation Club"]
        );
        for row in &rows {
            assert_eq!(row.len(), 7);
        }
    }

    #[tokio::test]
    async fn test_leaderboards_are_skipped() {
        let result = parse(RESULTS, Filter::default()).await.unwrap();
        assert!(!result.data.contains("Top Brewers"));
        assert!(!result.data.contains("Clubs"));
    }

    #[tokio::test]
    async fn test_mhp_badge_and_commas_stripped() {
        let result = parse(RESULTS, Filter::default()).await.unwrap();
        assert!(!result.data.contains(" MHP"));
        assert!(result.data.contains("Hops Skip and Jump"));
        assert!(result.data.contains("MHP Brewing Collective"));
    }

    #[tokio::test]
    async fn test_filter_by_brewer_uses_stripped_name() {
        let filter = Filter::new(Some("Jane Roe".into()), None);
        let result = parse(RESULTS, filter).await.unwrap();
        assert_eq!(result.row_count(), 2);
        assert!(result.rows().all(|r| r[3] == "Jane Roe"));
    }

    #[tokio::test]
    async fn test_filter_by_club() {
        let filter = Filter::new(None, Some("Foam Rangers".into()));
        let result = parse(RESULTS, filter).await.unwrap();
        assert_eq!(result.row_count(), 1);
        assert!(result.data.contains("Sam Stout"));
    }

    #[tokio::test]
    async fn test_multiline_cell_stays_on_one_row() {
        let html = r#"<div class="bcoem-winner-table"><h3>Table 1: Lager (3 entries)</h3>
            <table><thead><tr><th>Place</th><th>Brewer</th><th>Entry Name</th><th>Style</th><th>Club</th></tr></thead>
            <tbody><tr><td>1st</td><td>Jane Roe</td><td>Crispy</td>
            <td><strong>1A</strong>
            <em>American Light Lager</em></td><td>Club</td></tr></tbody></table></div>"#;
        let result = parse(html, Filter::default()).await.unwrap();
        let rows: Vec<Vec<&str>> = result.rows().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), result.header_fields().len());
        assert_eq!(rows[0][5], "1A American Light Lager");
    }

    #[tokio::test]
    async fn test_no_winner_tables_is_absent() {
        let html = "<html><body><table><tr><td>x</td></tr></table></body></html>";
        assert!(parse(html, Filter::default()).await.is_none());
    }

    #[tokio::test]
    async fn test_parse_is_idempotent() {
        let a = parse(RESULTS, Filter::default()).await;
        let b = parse(RESULTS, Filter::default()).await;
        assert_eq!(a, b);
    }

    #[test]
    fn test_metadata_header_layout() {
        let header = BcoemParser::metadata_header();
        assert_eq!(header.len(), 19);
        assert_eq!(header[0], "entrant_registration");
        assert_eq!(header[9], "num_required");
        assert_eq!(header[18], "awards_ceremony_end_date");
    }

    #[test]
    fn test_metadata_extracts_windows() {
        let result = BcoemParser.parse_metadata(INFO).unwrap();
        let header = result.header_fields();
        let rows: Vec<Vec<&str>> = result.rows().collect();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.len(), header.len());

        let col = |name: &str| row[header.iter().position(|h| *h == name).unwrap()];
        assert_eq!(col("entry_registration_start_date"), "2025-03-01T16:00:00Z");
        assert_eq!(col("entry_registration_end_date"), "2025-04-01T05:59:00Z");
        assert_eq!(col("num_required"), "Each entry requires 2 bottles.");
        assert_eq!(col("awards_ceremony_start_date"), "2025-05-17T22:00:00Z");
        assert_eq!(col("awards_ceremony_end_date"), "");
        assert!(col("volunteer_registration").starts_with("Volunteer"));
    }

    #[test]
    fn test_metadata_tolerates_non_date_fields() {
        let result = BcoemParser.parse_metadata(INFO).unwrap();
        let header = result.header_fields();
        let row = result.rows().next().unwrap();
        let idx = header.iter().position(|h| *h == "shipping_window_start_date").unwrap();
        assert_eq!(row[idx], "");
        assert_eq!(row[idx - 1], "Shipping is not available for this competition.");
    }

    #[test]
    fn test_metadata_on_empty_page_has_blank_fields() {
        let result = BcoemParser.parse_metadata("<html></html>").unwrap();
        let row = result.rows().next();
        assert!(row.is_none() || row.unwrap().iter().all(|f| f.is_empty()));
    }
}
