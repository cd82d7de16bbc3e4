//! JSON output.
//!
//! Medal results are grouped by their first column:
//!
//! ```json
//! {
//!   "American Lager": [
//!     { "Medal": "1st", "Entry Count": "14", "Brewer": "Donald Schneider", ... }
//!   ]
//! }
//! ```
//!
//! Categories keep the order they first appear in. A metadata record becomes
//! `{ "data": { "<column>": "<value>", ... } }`.

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::models::ParsedResult;

/// Group medal rows into `{ category: [row, ...] }`.
#[instrument(level = "debug", skip_all)]
pub fn medals_to_json(result: &ParsedResult) -> Value {
    let header = result.header_fields();
    let mut grouped: Map<String, Value> = Map::new();

    for row in result.rows() {
        let Some((category, fields)) = row.split_first() else {
            continue;
        };
        let object: Map<String, Value> = fields
            .iter()
            .enumerate()
            .filter_map(|(i, value)| {
                header
                    .get(i + 1)
                    .map(|column| (column.to_string(), Value::String(value.to_string())))
            })
            .collect();

        if let Value::Array(rows) = grouped
            .entry(category.to_string())
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            rows.push(Value::Object(object));
        }
    }

    grouped.retain(|_, rows| rows.as_array().is_some_and(|r| !r.is_empty()));
    debug!(categories = grouped.len(), "Grouped medal rows");
    Value::Object(grouped)
}

/// Flatten a metadata record into `{ "data": { column: value } }`.
///
/// When several data lines are present the last one wins.
pub fn metadata_to_json(result: &ParsedResult) -> Value {
    let header = result.header_fields();
    let mut record = Map::new();
    if let Some(row) = result.rows().last() {
        for (column, value) in header.iter().zip(row) {
            record.insert(column.to_string(), Value::String(value.to_string()));
        }
    }
    let mut root = Map::new();
    root.insert("data".to_string(), Value::Object(record));
    Value::Object(root)
}

pub fn render_medals(result: &ParsedResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&medals_to_json(result))
}

pub fn render_metadata(result: &ParsedResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&metadata_to_json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn medals() -> ParsedResult {
        ParsedResult {
            header: "Table / Category|Medal|Brewer".to_string(),
            data: "Stout|1st|Alice Malt\nLager|2nd|Ryan Wankel\nStout|HM|Bob Barley".to_string(),
        }
    }

    #[test]
    fn test_medals_grouped_by_category() {
        let value = medals_to_json(&medals());
        assert_eq!(
            value,
            json!({
                "Stout": [
                    { "Medal": "1st", "Brewer": "Alice Malt" },
                    { "Medal": "HM", "Brewer": "Bob Barley" }
                ],
                "Lager": [
                    { "Medal": "2nd", "Brewer": "Ryan Wankel" }
                ]
            })
        );
    }

    #[test]
    fn test_categories_keep_first_seen_order() {
        let value = medals_to_json(&medals());
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["Stout", "Lager"]);
    }

    #[test]
    fn test_empty_data_is_empty_object() {
        let result = ParsedResult {
            header: "Table / Category|Medal".to_string(),
            data: String::new(),
        };
        assert_eq!(medals_to_json(&result), json!({}));
    }

    #[test]
    fn test_metadata_record() {
        let result = ParsedResult {
            header: "num_required|awards_ceremony".to_string(),
            data: "2 bottles|Saturday".to_string(),
        };
        assert_eq!(
            metadata_to_json(&result),
            json!({ "data": { "num_required": "2 bottles", "awards_ceremony": "Saturday" } })
        );
    }

    #[test]
    fn test_render_is_pretty() {
        let text = render_medals(&medals()).unwrap();
        assert!(text.starts_with("{\n"));
        assert!(text.contains("\"Alice Malt\""));
    }
}
