//! Statement report fetching
//!
//! Submitting the report postback makes the server emit an inline script
//! that triggers a download. The fetcher finds that script, downloads the
//! file it names, extracts both holdings sections, and removes the file.

use crate::crawler::log_delta;
use crate::postback::controls::{EVENT_TARGET, LAST_FOCUS, REPORT_BUTTON, SCRIPT_MANAGER};
use crate::postback::{decode, encode, FormState, PostbackKind};
use crate::session::Session;
use crate::spreadsheet::{
    extract_rows, load_first_sheet, to_records, StatementRecord, CUSTODY_SECTION,
    GUARANTEE_SECTION,
};
use crate::storage::ReportStorage;
use crate::{DecodeError, ExtractResult, StatementError};
use serde::Serialize;
use std::path::Path;

/// Text identifying the download script among the script directives
pub const DOWNLOAD_TRIGGER: &str = "ExibirDownload";

const REPORT_ID_PREFIX: &str = "ExibirDownload('";
const REPORT_ID_SUFFIX: &str = "')";

const XLSX_SIGNATURE: &[u8] = b"PK";
const XLS_SIGNATURE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

/// Holdings extracted from one statement report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Holdings {
    pub custody: Vec<StatementRecord>,
    pub guarantee: Vec<StatementRecord>,
}

/// Extracts the report identifier from a download script
///
/// # Example
///
/// ```
/// use custody_statement::crawler::parse_report_id;
///
/// assert_eq!(parse_report_id("CEIWeb.ExibirDownload('r-1');"), Some("r-1"));
/// assert_eq!(parse_report_id("alert('x');"), None);
/// ```
pub fn parse_report_id(script: &str) -> Option<&str> {
    let start = script.find(REPORT_ID_PREFIX)? + REPORT_ID_PREFIX.len();
    let rest = &script[start..];
    let end = rest.find(REPORT_ID_SUFFIX)?;
    let id = rest[..end].trim();
    (!id.is_empty()).then_some(id)
}

/// File extension matching the workbook format of `contents`
pub fn report_extension(contents: &[u8]) -> &'static str {
    if contents.starts_with(XLS_SIGNATURE) {
        "xls"
    } else if contents.starts_with(XLSX_SIGNATURE) {
        "xlsx"
    } else {
        tracing::warn!("Unrecognized report signature, assuming xlsx");
        "xlsx"
    }
}

/// Local file name for a downloaded report
fn report_file_name(report_id: &str, contents: &[u8]) -> String {
    let stem: String = report_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("statement-{}.{}", stem, report_extension(contents))
}

/// Extracts both holdings sections from a saved report
pub fn extract_holdings(path: &Path) -> ExtractResult<Holdings> {
    let rows = load_first_sheet(path)?;
    Ok(Holdings {
        custody: to_records(&extract_rows(&rows, &CUSTODY_SECTION)?)?,
        guarantee: to_records(&extract_rows(&rows, &GUARANTEE_SECTION)?)?,
    })
}

/// Generates, downloads, and extracts statement reports
pub struct ReportFetcher<'a, S: ReportStorage> {
    session: &'a Session,
    storage: &'a S,
    trace: bool,
}

impl<'a, S: ReportStorage> ReportFetcher<'a, S> {
    pub fn new(session: &'a Session, storage: &'a S, trace: bool) -> Self {
        Self {
            session,
            storage,
            trace,
        }
    }

    /// Submits the report postback for the selection held in `state`
    ///
    /// # Arguments
    ///
    /// * `state` - Form state with account and month already selected
    ///
    /// # Returns
    ///
    /// * `Ok((FormState, Holdings))` - The updated form state and the
    ///   extracted holdings; holdings are empty when the server generated no
    ///   report
    /// * `Err(StatementError)` - The server rejected the submission, or the
    ///   download or extraction failed
    pub async fn fetch(&self, state: &FormState) -> Result<(FormState, Holdings), StatementError> {
        let kind = PostbackKind::SubmitReport;
        let mut next = state.clone();
        next.set_value(EVENT_TARGET, REPORT_BUTTON);
        next.set_value(LAST_FOCUS, "");

        let target = kind.script_manager_target();
        let body = encode(
            &next,
            kind.fields(),
            &[(SCRIPT_MANAGER, target.as_str()), (EVENT_TARGET, kind.event_target())],
        );

        let text = self.session.post_statement(&body).await?;
        let delta = decode(&text, true)?.check()?;
        log_delta(&delta, self.trace);
        next.apply_updates(&delta.field_updates);

        let Some(directive) = delta.find_script(DOWNLOAD_TRIGGER) else {
            tracing::info!("No report generated for the current selection");
            return Ok((next, Holdings::default()));
        };
        let report_id = parse_report_id(&directive.id)
            .ok_or_else(|| DecodeError::MalformedDirective(directive.id.clone()))?;

        let contents = self.session.download_report(report_id).await?;
        let holdings = self.extract(report_id, &contents)?;
        Ok((next, holdings))
    }

    /// Saves, extracts, and removes one report file
    ///
    /// The file is removed whatever happened before, including a save that
    /// failed partway through.
    fn extract(&self, report_id: &str, contents: &[u8]) -> Result<Holdings, StatementError> {
        let file_name = report_file_name(report_id, contents);

        let result = self
            .storage
            .save(&file_name, contents)
            .map_err(StatementError::from)
            .and_then(|path| extract_holdings(&path).map_err(StatementError::from));

        if let Err(e) = self.storage.remove(&file_name) {
            tracing::warn!("Failed to remove report {}: {}", file_name, e);
        }

        let holdings = result?;
        tracing::info!(
            "Report {}: {} custody rows, {} guarantee rows",
            report_id,
            holdings.custody.len(),
            holdings.guarantee.len()
        );
        Ok(holdings)
    }
}
