use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A single spreadsheet value after decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl Cell {
    /// Empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            Cell::Number(_) | Cell::Bool(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Numeric reading of the cell, following spreadsheet coercion rules:
    /// blank text reads as zero, booleans as 0/1, empty cells and
    /// non-numeric text have no numeric value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) if value.is_finite() => Some(*value),
            Cell::Number(_) | Cell::Empty => None,
            Cell::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            Cell::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Some(0.0);
                }
                trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
            }
        }
    }

    /// Boolean `true`, or the literal text `"true"`.
    pub fn is_true(&self) -> bool {
        match self {
            Cell::Bool(flag) => *flag,
            Cell::Text(text) => text == "true",
            _ => false,
        }
    }

    /// Only an actual boolean `false` counts.
    pub fn is_false(&self) -> bool {
        matches!(self, Cell::Bool(false))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => f.write_str(text),
            Cell::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    write!(f, "{}", *value as i64)
                } else {
                    write!(f, "{value}")
                }
            }
            Cell::Bool(flag) => write!(f, "{flag}"),
            Cell::Empty => Ok(()),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Text(text) => serializer.serialize_str(text),
            Cell::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    serializer.serialize_i64(*value as i64)
                } else {
                    serializer.serialize_f64(*value)
                }
            }
            Cell::Bool(flag) => serializer.serialize_bool(*flag),
            Cell::Empty => serializer.serialize_none(),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

/// One data row keyed by header, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    fields: Vec<(String, Cell)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Cell> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, cell)| cell)
    }

    /// Present and not blank.
    pub fn value(&self, key: &str) -> Option<&Cell> {
        self.get(key).filter(|cell| !cell.is_blank())
    }

    /// Inserts or replaces a field; replacement keeps the original column position.
    pub fn insert(&mut self, key: impl Into<String>, cell: Cell) -> Option<Cell> {
        let key = key.into();
        match self.fields.iter_mut().find(|(name, _)| *name == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, cell)),
            None => {
                self.fields.push((key, cell));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Cell> {
        let index = self.fields.iter().position(|(name, _)| name == key)?;
        Some(self.fields.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.fields.iter().map(|(name, cell)| (name.as_str(), cell))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, cell)| cell.is_blank())
    }
}

impl<K: Into<String>> FromIterator<(K, Cell)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, Cell)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (key, cell) in iter {
            row.insert(key, cell);
        }
        row
    }
}

impl Serialize for RawRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, cell) in &self.fields {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Workbook,
    Csv,
}

impl TableFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableFormat::Workbook => "workbook",
            TableFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub format: TableFormat,
    pub sheet_name: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}
