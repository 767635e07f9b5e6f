//! Builders for titled panels and key/value tables.
//!
//! Pure functions, no hidden state.

use serde::Serialize;

use crate::ocr::SectionMap;

/// Substituted for empty, zero, false or null values.
pub const FALLBACK_VALUE: &str = "-";
/// Leading column of every key/value table.
pub const SERIAL_HEADER: &str = "S/N";

/// One table row: 1-based ordinal, key and display value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyValueRow {
    pub ordinal: usize,
    pub key: String,
    pub value: String,
}

impl KeyValueRow {
    pub fn cells(&self) -> [String; 3] {
        [self.ordinal.to_string(), self.key.clone(), self.value.clone()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Includes the leading `S/N` column.
    pub headers: Vec<String>,
    pub rows: Vec<KeyValueRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum CardBody {
    Text(String),
    Table(Table),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Card {
    Results { title: String, body: CardBody },
    Error { message: String },
}

impl Card {
    pub fn is_error(&self) -> bool {
        matches!(self, Card::Error { .. })
    }
}

/// Convert a section mapping into ordered rows, ordinals starting at 1.
pub fn key_value_rows(map: &SectionMap) -> Vec<KeyValueRow> {
    map.iter()
        .enumerate()
        .map(|(i, (key, value))| KeyValueRow {
            ordinal: i + 1,
            key: key.to_string(),
            value: value.display().unwrap_or_else(|| FALLBACK_VALUE.to_string()),
        })
        .collect()
}

/// Build a table with a leading `S/N` column followed by `column_headers`.
pub fn build_table(column_headers: &[&str], rows: Vec<KeyValueRow>) -> Table {
    let headers = std::iter::once(SERIAL_HEADER)
        .chain(column_headers.iter().copied())
        .map(str::to_string)
        .collect();

    // Ordinals follow row position regardless of what the caller supplied
    let rows = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| KeyValueRow {
            ordinal: i + 1,
            ..row
        })
        .collect();

    Table { headers, rows }
}

pub fn build_card(title: &str, body: CardBody) -> Card {
    Card::Results {
        title: title.to_string(),
        body,
    }
}

pub fn build_error_card(message: &str) -> Card {
    Card::Error {
        message: message.to_string(),
    }
}

pub fn build_key_value_table_card(title: &str, column_headers: &[&str], map: &SectionMap) -> Card {
    let table = build_table(column_headers, key_value_rows(map));
    build_card(title, CardBody::Table(table))
}
