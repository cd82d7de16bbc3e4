//! Data models shared by every competition parser.
//!
//! This module defines the normalized shapes the parsers produce:
//! - [`ParsedResult`]: header and data rows as `|`-delimited text
//! - [`Filter`]: brewer / club selection applied per result row
//! - [`ResultRow`]: one medal placement before it is flattened into fields
//! - [`Column`]: the semantic fields a platform layout is declared in
//!
//! Rows are flattened as delimiter-joined text rather than escaped CSV, so
//! every field goes through [`sanitize_field`](crate::utils::sanitize_field)
//! before it is joined.

use crate::utils::{delimiter_safe, sanitize_field};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Field separator inside header and data lines.
pub const DELIMITER: char = '|';

/// Normalized result of one parse call.
///
/// `header` is the ordered column names joined by [`DELIMITER`]; `data` is one
/// line per row, each line joined the same way. Every data line has exactly
/// as many fields as the header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedResult {
    pub header: String,
    pub data: String,
}

/// Metadata records share the result layout: a header line and one data line.
pub type MetadataResult = ParsedResult;

impl ParsedResult {
    /// Join a header and a set of rows.
    ///
    /// Rows shorter than the header are padded with empty fields and longer
    /// rows are truncated. Fields are made delimiter-safe, so a stray `|` or
    /// line break cannot add a field or a line.
    pub fn from_rows<S: AsRef<str>>(header: &[S], rows: Vec<Vec<String>>) -> Self {
        let width = header.len();
        let header = header.iter().map(|h| sanitize_field(h.as_ref())).join("|");
        let data = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row.iter().map(|field| delimiter_safe(field)).join("|")
            })
            .join("\n");
        ParsedResult { header, data }
    }

    pub fn header_fields(&self) -> Vec<&str> {
        self.header.split(DELIMITER).collect()
    }

    /// Data lines split into fields. Blank lines are skipped.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        self.data
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| line.split(DELIMITER).collect())
    }

    pub fn row_count(&self) -> usize {
        self.rows().count()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}

/// Selection criterion applied to every result row.
///
/// `brewers` is a comma-separated list of names. Empty strings count as
/// unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub brewers: Option<String>,
    pub club: Option<String>,
}

impl Filter {
    pub fn new(brewers: Option<String>, club: Option<String>) -> Self {
        Filter {
            brewers: brewers.filter(|b| !b.trim().is_empty()),
            club: club.filter(|c| !c.is_empty()),
        }
    }

    /// Decide whether a row with this brewer and club is emitted.
    ///
    /// With no criteria every row is kept. A brewer listed in `brewers`
    /// (trimmed, exact) is kept regardless of club; otherwise the row is kept
    /// only when `club` is set and equals the row's club exactly.
    pub fn includes(&self, brewer: &str, club: &str) -> bool {
        let brewers = self.brewers.as_deref().filter(|b| !b.trim().is_empty());
        let wanted_club = self.club.as_deref().filter(|c| !c.is_empty());

        if brewers.is_none() && wanted_club.is_none() {
            return true;
        }

        if let Some(list) = brewers {
            let brewer = brewer.trim();
            if list.split(',').map(str::trim).any(|b| b == brewer) {
                return true;
            }
        }

        matches!(wanted_club, Some(c) if c == club)
    }
}

/// Semantic fields of a medal row. Each platform declares its header as an
/// ordered list of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Category,
    Place,
    EntryCount,
    EntryName,
    Style,
    Brewer,
    Club,
}

/// One medal placement, collected before it is flattened into a layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultRow {
    pub category: String,
    pub place: String,
    pub entry_count: String,
    pub entry_name: String,
    pub style: String,
    pub brewer: String,
    pub club: String,
}

impl ResultRow {
    pub fn field(&self, column: Column) -> &str {
        match column {
            Column::Category => &self.category,
            Column::Place => &self.place,
            Column::EntryCount => &self.entry_count,
            Column::EntryName => &self.entry_name,
            Column::Style => &self.style,
            Column::Brewer => &self.brewer,
            Column::Club => &self.club,
        }
    }

    /// Flatten into sanitized fields in the given column order.
    pub fn into_fields(&self, layout: &[(Column, &str)]) -> Vec<String> {
        layout
            .iter()
            .map(|(column, _)| sanitize_field(self.field(*column)))
            .collect()
    }
}

/// Build a [`ParsedResult`] from collected rows using a declared layout.
pub fn rows_to_result(layout: &[(Column, &str)], rows: &[ResultRow]) -> ParsedResult {
    let header: Vec<&str> = layout.iter().map(|(_, name)| *name).collect();
    let data = rows.iter().map(|r| r.into_fields(layout)).collect();
    ParsedResult::from_rows(&header, data)
}
