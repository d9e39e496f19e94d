//! Statement records and the two sections of a custody report

use crate::spreadsheet::coerce::{CellValue, FieldKind, FieldSpec};
use crate::spreadsheet::extractor::{SectionSpec, TypedRow};
use crate::{ExtractError, ExtractResult};
use chrono::NaiveDate;
use serde::Serialize;

/// Column layout shared by both sections
pub const STATEMENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("asset_id", FieldKind::String),
    FieldSpec::new("specification", FieldKind::String),
    FieldSpec::new("classifier", FieldKind::String),
    FieldSpec::new("ticker", FieldKind::String),
    FieldSpec::new("quantity", FieldKind::Int),
    FieldSpec::new("price", FieldKind::Float),
    FieldSpec::new("value", FieldKind::Float),
];

/// Assets held in custody
pub const CUSTODY_SECTION: SectionSpec = SectionSpec {
    marker_column: 0,
    start_marker: "Ativos em Custódia",
    end_marker: "Total em Custódia",
    fields: STATEMENT_FIELDS,
    skip_header_row: true,
};

/// Assets pledged as collateral for derivatives markets
pub const GUARANTEE_SECTION: SectionSpec = SectionSpec {
    marker_column: 0,
    start_marker: "Ativos Depositados em Garantia para os Mercados de Derivativos",
    end_marker: "Total em Garantia",
    fields: STATEMENT_FIELDS,
    skip_header_row: true,
};

/// One holding line of a custody statement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementRecord {
    pub asset_id: String,
    pub specification: String,
    pub classifier: String,
    pub ticker: String,
    pub quantity: i64,
    pub price: f64,
    pub value: f64,
    pub ref_date: Option<NaiveDate>,
}

impl TryFrom<&TypedRow> for StatementRecord {
    type Error = ExtractError;

    fn try_from(row: &TypedRow) -> ExtractResult<Self> {
        Ok(Self {
            asset_id: text(row, "asset_id")?,
            specification: text(row, "specification")?,
            classifier: text(row, "classifier")?,
            ticker: text(row, "ticker")?,
            quantity: int(row, "quantity")?,
            price: float(row, "price")?,
            value: float(row, "value")?,
            ref_date: row.ref_date,
        })
    }
}

/// Converts decoded section rows into statement records
pub fn to_records(rows: &[TypedRow]) -> ExtractResult<Vec<StatementRecord>> {
    rows.iter().map(StatementRecord::try_from).collect()
}

fn text(row: &TypedRow, name: &str) -> ExtractResult<String> {
    match row.get(name) {
        Some(CellValue::Text(s)) | Some(CellValue::Raw(s)) => Ok(s.clone()),
        _ => Err(ExtractError::MissingField(name.to_string())),
    }
}

fn int(row: &TypedRow, name: &str) -> ExtractResult<i64> {
    match row.get(name) {
        Some(CellValue::Int(i)) => Ok(*i),
        _ => Err(ExtractError::MissingField(name.to_string())),
    }
}

fn float(row: &TypedRow, name: &str) -> ExtractResult<f64> {
    match row.get(name) {
        Some(CellValue::Float(f)) => Ok(*f),
        Some(CellValue::Int(i)) => Ok(*i as f64),
        _ => Err(ExtractError::MissingField(name.to_string())),
    }
}
