//! Output generation for parsed results.
//!
//! # Submodules
//!
//! - [`json`]: groups medal rows by category, or flattens a metadata record
//! - [`csv`]: the raw `|`-delimited header and data lines
//!
//! Results are written to stdout; logs go to stderr so the two never mix.

pub mod csv;
pub mod json;

use crate::models::ParsedResult;

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

/// Which JSON shape a result is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Medals,
    Metadata,
}

/// Render a result in the requested format.
pub fn render(
    result: &ParsedResult,
    format: OutputFormat,
    kind: ResultKind,
) -> Result<String, serde_json::Error> {
    match (format, kind) {
        (OutputFormat::Csv, _) => Ok(csv::render(result)),
        (OutputFormat::Json, ResultKind::Medals) => json::render_medals(result),
        (OutputFormat::Json, ResultKind::Metadata) => json::render_metadata(result),
    }
}
