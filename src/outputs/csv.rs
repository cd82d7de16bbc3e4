//! Raw `|`-delimited output: the header line followed by the data lines.

use crate::models::ParsedResult;

pub fn render(result: &ParsedResult) -> String {
    if result.data.is_empty() {
        result.header.clone()
    } else {
        format!("{}\n{}", result.header, result.data)
    }
}
