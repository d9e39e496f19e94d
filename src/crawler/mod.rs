//! Crawler module for the statement selection cascade
//!
//! This module contains the collection logic, including:
//! - Dropdown option parsing and placeholder filtering
//! - Target month resolution
//! - Report generation, download, and extraction
//! - Overall cascade coordination

mod coordinator;
mod dates;
mod options;
mod report;

pub use coordinator::{
    AccountWallet, InstitutionOptions, StatementCollection, StatementCrawler, StatementOptions,
    UnitFailure,
};
pub use dates::{
    available_range, clamp_date, format_date, month_end, month_value, parse_option_date,
    resolve_target,
};
pub use options::{parse_options, selectable_options, SelectionOption};
pub use report::{
    extract_holdings, parse_report_id, report_extension, Holdings, ReportFetcher,
    DOWNLOAD_TRIGGER,
};

use crate::config::CrawlOptions;
use crate::postback::DeltaResponse;
use crate::session::Session;
use crate::storage::FolderStorage;
use crate::StatementError;
use chrono::NaiveDate;

/// Collects the statement of every account for the month of `date`
///
/// This is the main entry point for bulk collection. It will:
/// 1. Load the statement page and list institutions
/// 2. Select each institution and read its accounts and months
/// 3. Resolve the target month per account (clamped when `cap_dates` is set)
/// 4. Generate, download, and extract each report
///
/// Institutions or accounts the server refuses are skipped with a warning.
///
/// # Arguments
///
/// * `session` - An authenticated session
/// * `options` - Crawl options; reports are saved under `downloaded_folder`
/// * `date` - Requested statement date
///
/// # Returns
///
/// * `Ok(Vec<AccountWallet>)` - One wallet per collected account
/// * `Err(StatementError)` - Collection aborted
pub async fn get_statement(
    session: &Session,
    options: &CrawlOptions,
    date: NaiveDate,
) -> Result<Vec<AccountWallet>, StatementError> {
    let collection = get_statement_collection(session, options, date).await?;

    for failure in &collection.failures {
        tracing::warn!(
            "Skipped institution {} account {}: {}",
            failure.institution,
            failure.account.as_deref().unwrap_or("-"),
            failure.message
        );
    }

    Ok(collection.wallets)
}

/// Like `get_statement`, but also returns the units the server refused
pub async fn get_statement_collection(
    session: &Session,
    options: &CrawlOptions,
    date: NaiveDate,
) -> Result<StatementCollection, StatementError> {
    let storage = FolderStorage::new(&options.downloaded_folder)?;
    StatementCrawler::new(session, options)
        .collect_statement(&storage, date)
        .await
}

/// Lists the accounts and months selectable for each institution
pub async fn get_statement_options(
    session: &Session,
    options: &CrawlOptions,
) -> Result<StatementOptions, StatementError> {
    StatementCrawler::new(session, options)
        .discover_options()
        .await
}

/// Logs what a decoded postback changed; per-item detail only when tracing
pub(crate) fn log_delta(delta: &DeltaResponse, trace: bool) {
    tracing::debug!(
        "Delta: {} field updates, {} script directives",
        delta.field_updates.len(),
        delta.script_directives.len()
    );

    if !trace {
        return;
    }

    for update in &delta.field_updates {
        tracing::info!("Field update {} ({} bytes)", update.id, update.value.len());
    }
    for directive in &delta.script_directives {
        tracing::info!("Script directive: {}", directive.id);
    }
    if let Some(message) = &delta.message {
        tracing::info!("Server message (severity {}): {}", message.severity, message.text);
    }
}
