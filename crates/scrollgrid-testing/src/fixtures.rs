//! Record fixtures.

use scrollgrid::{record, GridTemplates, MarkupTemplate, Record};
use serde_json::json;

/// Header markup used by [`record_templates`].
pub const HEADER_MARKUP: &str = "<tr><th>Name</th></tr>";

/// Row markup used by [`record_templates`].
pub const ROW_MARKUP: &str = "<tr><td>${item.name}</td></tr>";

/// One `{ name }` record per name.
pub fn records(names: &[&str]) -> Vec<Record> {
    names
        .iter()
        .map(|name| record([("name", json!(name))]))
        .collect()
}

/// `{ id, name }` record for position `i`.
pub fn numbered_record(i: usize) -> Record {
    record([("id", json!(i)), ("name", json!(format!("item-{i}")))])
}

/// Markup templates rendering the `name` field.
pub fn record_templates() -> GridTemplates<Record> {
    GridTemplates::new(MarkupTemplate::new(HEADER_MARKUP), MarkupTemplate::new(ROW_MARKUP))
}
