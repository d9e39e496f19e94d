//! Section-scoped extraction from an unstructured worksheet
//!
//! A section is the block of rows between a start marker and an end marker
//! found in a designated column. Column headers in these sheets are not
//! stable, so cells are mapped onto fields by position only.

use crate::spreadsheet::coerce::{coerce, parse_date, CellValue, FieldSpec};
use crate::{ExtractError, ExtractResult};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;
use std::path::Path;

/// Prefix of the summary row carrying the statement's reference date
pub const BALANCE_SUMMARY_PREFIX: &str = "Resumo dos saldos em";

/// Describes one named section of a worksheet
#[derive(Debug, Clone, Copy)]
pub struct SectionSpec {
    /// Column holding the section markers
    pub marker_column: usize,

    /// Marker text of the row just above the section
    pub start_marker: &'static str,

    /// Marker text of the row just below the section
    pub end_marker: &'static str,

    /// Declared fields, in column order
    pub fields: &'static [FieldSpec],

    /// Skip the column-label row repeated under the start marker
    pub skip_header_row: bool,
}

/// One decoded row of a section
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRow {
    pub values: Vec<(&'static str, CellValue)>,

    /// Shared reference date of the workbook
    pub ref_date: Option<NaiveDate>,
}

impl TypedRow {
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.values
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }
}

/// Loads the first worksheet as rows of cell text
///
/// Column positions are absolute: leading empty columns the reader trims
/// are restored so marker columns can be addressed by index.
pub fn load_first_sheet(path: &Path) -> ExtractResult<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| ExtractError::Open {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ExtractError::NoSheet {
            path: path.display().to_string(),
        })?
        .map_err(|e| ExtractError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    let offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    Ok(range
        .rows()
        .map(|cells| {
            std::iter::repeat(String::new())
                .take(offset)
                .chain(cells.iter().map(cell_text))
                .collect()
        })
        .collect())
}

/// Renders a cell the way the sheet displays it
///
/// Numeric cells use a comma decimal separator so they coerce like text
/// cells; date cells render as `dd/mm/yyyy`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string().replace('.', ","),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

/// Extracts one section of the first worksheet of `path`
pub fn extract(path: &Path, spec: &SectionSpec) -> ExtractResult<Vec<TypedRow>> {
    let rows = load_first_sheet(path)?;
    extract_rows(&rows, spec)
}

/// Extracts one section from already loaded rows
///
/// Missing start or end markers yield an empty result. Rows in between are
/// decoded positionally; a row whose non-empty cell count differs from the
/// declared field count fails the extraction.
pub fn extract_rows(rows: &[Vec<String>], spec: &SectionSpec) -> ExtractResult<Vec<TypedRow>> {
    let column = spec.marker_column;
    let start = rows
        .iter()
        .position(|row| marker_cell(row, column) == spec.start_marker);
    let end = rows
        .iter()
        .position(|row| marker_cell(row, column) == spec.end_marker);

    let (Some(start), Some(end)) = (start, end) else {
        tracing::debug!("Section '{}' not found", spec.start_marker);
        return Ok(Vec::new());
    };

    let ref_date = find_reference_date(rows, column);
    let first = start + 1 + usize::from(spec.skip_header_row);
    if first >= end {
        return Ok(Vec::new());
    }

    let mut decoded = Vec::with_capacity(end - first);
    for (index, row) in rows.iter().enumerate().take(end).skip(first) {
        let cells: Vec<&str> = row
            .iter()
            .map(String::as_str)
            .filter(|cell| !cell.trim().is_empty())
            .collect();

        if cells.is_empty() {
            continue;
        }

        if cells.len() != spec.fields.len() {
            return Err(ExtractError::ColumnMismatch {
                row: index + 1,
                expected: spec.fields.len(),
                found: cells.len(),
            });
        }

        let values = spec
            .fields
            .iter()
            .zip(cells)
            .map(|(field, raw)| coerce(field, raw).map(|value| (field.name, value)))
            .collect::<ExtractResult<Vec<_>>>()?;

        decoded.push(TypedRow { values, ref_date });
    }

    tracing::debug!(
        "Section '{}' yielded {} rows",
        spec.start_marker,
        decoded.len()
    );
    Ok(decoded)
}

/// Finds the reference date in the balances summary row
pub fn find_reference_date(rows: &[Vec<String>], column: usize) -> Option<NaiveDate> {
    rows.iter()
        .map(|row| marker_cell(row, column))
        .find_map(|cell| cell.strip_prefix(BALANCE_SUMMARY_PREFIX))
        .and_then(|rest| rest.split_whitespace().last())
        .and_then(parse_date)
        .flatten()
}

fn marker_cell(row: &[String], column: usize) -> &str {
    row.get(column).map(|cell| cell.trim()).unwrap_or_default()
}
