//! Spreadsheet module for downloaded statement reports
//!
//! Reports are flat worksheets where meaningful blocks are delimited by
//! marker rows rather than by column structure. This module locates those
//! blocks, decodes their rows by position, and maps them onto records.

mod coerce;
mod extractor;
mod records;

pub use coerce::{
    coerce, collapse_whitespace, parse_date, parse_float, parse_int, CellValue, FieldKind,
    FieldSpec, NULL_DATE,
};
pub use extractor::{
    extract, extract_rows, find_reference_date, load_first_sheet, SectionSpec, TypedRow,
    BALANCE_SUMMARY_PREFIX,
};
pub use records::{
    to_records, StatementRecord, CUSTODY_SECTION, GUARANTEE_SECTION, STATEMENT_FIELDS,
};
