//! Typed coercion of raw spreadsheet cells
//!
//! Numbers use `.` for thousands and `,` for decimals; dates are `dd/mm/yyyy`.

use crate::ExtractError;
use chrono::NaiveDate;
use serde::Serialize;

/// Date the sheet uses in place of an empty date
pub const NULL_DATE: &str = "01/01/0001";

const DATE_FORMAT: &str = "%d/%m/%Y";

/// Declared type of a section column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Int,
    Float,
    Date,
    /// Any other type: the raw cell text passes through unchanged
    Raw,
}

impl FieldKind {
    fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Date => "date",
            Self::Raw => "raw",
        }
    }
}

/// A named, typed column of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// A coerced cell value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Int(i64),
    Float(f64),
    Date(Option<NaiveDate>),
    Raw(String),
}

/// Coerces a raw cell into its declared type
pub fn coerce(field: &FieldSpec, raw: &str) -> Result<CellValue, ExtractError> {
    let invalid = || ExtractError::InvalidValue {
        field: field.name.to_string(),
        kind: field.kind.name(),
        value: raw.to_string(),
    };

    match field.kind {
        FieldKind::String => Ok(CellValue::Text(collapse_whitespace(raw))),
        FieldKind::Int => parse_int(raw).map(CellValue::Int).ok_or_else(invalid),
        FieldKind::Float => parse_float(raw).map(CellValue::Float).ok_or_else(invalid),
        FieldKind::Date => parse_date(raw).map(CellValue::Date).ok_or_else(invalid),
        FieldKind::Raw => Ok(CellValue::Raw(raw.to_string())),
    }
}

/// Trims and collapses inner runs of whitespace to a single space
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses an integer, ignoring thousands separators
pub fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().replace('.', "").parse().ok()
}

/// Parses a decimal with `.` thousands and `,` decimal separators
pub fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().replace('.', "").replace(',', ".").parse().ok()
}

/// Parses a `dd/mm/yyyy` date
///
/// Returns `Some(None)` for the null date and `None` when unparseable.
pub fn parse_date(raw: &str) -> Option<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw == NULL_DATE {
        return Some(None);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok().map(Some)
}
