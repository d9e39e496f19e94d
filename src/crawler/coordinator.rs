//! Crawl coordinator - walks the institution → account → month cascade
//!
//! One coordinator drives one session sequentially:
//! - Loads the statement page and its initial form state
//! - Selects each institution through a partial postback
//! - Resolves the target month for every account of that institution
//! - Hands each selection to the report fetcher

use crate::config::CrawlOptions;
use crate::crawler::dates::{available_range, month_end, month_value, resolve_target};
use crate::crawler::options::{parse_options, selectable_options, SelectionOption};
use crate::crawler::report::{Holdings, ReportFetcher};
use crate::crawler::{log_delta, parse_option_date};
use crate::postback::controls::{
    ACCOUNT_FIELD, ACCOUNT_OPTIONS, EVENT_TARGET, INSTITUTION_FIELD, INSTITUTION_OPTIONS,
    MONTH_FIELD, MONTH_OPTIONS, SCRIPT_MANAGER,
};
use crate::postback::{decode, encode, FormState, PostbackKind};
use crate::session::Session;
use crate::spreadsheet::StatementRecord;
use crate::state::{CrawlStage, CrawlTracker};
use crate::storage::ReportStorage;
use crate::StatementError;
use chrono::NaiveDate;
use serde::Serialize;

/// Controls the cascade writes into; the page must declare all of them
const REQUIRED_CONTROLS: &[&str] = &[INSTITUTION_FIELD, ACCOUNT_FIELD, MONTH_FIELD];

/// Holdings of one account for one month
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountWallet {
    /// Institution option value, as posted to the server
    pub institution: String,
    /// Institution name as shown in the dropdown
    pub institution_label: String,
    pub account: String,
    /// Month-end date the statement was requested for
    pub month: NaiveDate,
    pub assets_custody: Vec<StatementRecord>,
    pub assets_guarantee: Vec<StatementRecord>,
}

impl AccountWallet {
    fn new(
        institution: &SelectionOption,
        account: &SelectionOption,
        month: NaiveDate,
        holdings: Holdings,
    ) -> Self {
        Self {
            institution: institution.value.clone(),
            institution_label: institution.label.clone(),
            account: account.value.clone(),
            month,
            assets_custody: holdings.custody,
            assets_guarantee: holdings.guarantee,
        }
    }
}

/// Selectable accounts and months of one institution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstitutionOptions {
    pub label: String,
    pub value: String,
    pub accounts: Vec<String>,
    pub months: Vec<SelectionOption>,
}

/// Everything a caller may choose from, per institution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatementOptions {
    pub institutions: Vec<InstitutionOptions>,
}

/// A unit of work the server refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitFailure {
    pub institution: String,
    pub account: Option<String>,
    pub message: String,
}

/// Result of a bulk collection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatementCollection {
    pub wallets: Vec<AccountWallet>,
    pub failures: Vec<UnitFailure>,
}

/// Options the server offered after an institution was selected
#[derive(Debug, Clone, Default)]
struct InstitutionPage {
    accounts: Vec<SelectionOption>,
    months: Vec<SelectionOption>,
}

impl InstitutionPage {
    /// Reads the refreshed account and month dropdowns from a delta response
    fn parse(text: &str) -> Result<Self, StatementError> {
        let accounts = selectable_options(text, ACCOUNT_OPTIONS)?;
        let months = parse_options(text, MONTH_OPTIONS)?
            .into_iter()
            .filter(|option| parse_option_date(&option.value).is_some())
            .collect();
        Ok(Self { accounts, months })
    }
}

/// Drives the selection cascade for one session
pub struct StatementCrawler<'a> {
    session: &'a Session,
    options: &'a CrawlOptions,
}

impl<'a> StatementCrawler<'a> {
    pub fn new(session: &'a Session, options: &'a CrawlOptions) -> Self {
        Self { session, options }
    }

    /// Collects the statement of every account of every institution
    ///
    /// A submission the server rejects skips that institution or account and
    /// is recorded as a failure; any other error aborts the collection.
    ///
    /// # Arguments
    ///
    /// * `storage` - Where downloaded reports are kept while being extracted
    /// * `date` - Requested statement date; normalized to its month end
    ///
    /// # Returns
    ///
    /// * `Ok(StatementCollection)` - Wallets in institution then account order
    /// * `Err(StatementError)` - Collection aborted
    pub async fn collect_statement<S: ReportStorage>(
        &self,
        storage: &S,
        date: NaiveDate,
    ) -> Result<StatementCollection, StatementError> {
        let mut tracker = CrawlTracker::new();
        let mut collection = StatementCollection::default();
        let fetcher = ReportFetcher::new(self.session, storage, self.options.trace);

        let (mut state, institutions) = self.open_page().await?;
        tracing::info!("Found {} institutions", institutions.len());

        for institution in &institutions {
            tracker.advance(CrawlStage::PerInstitution)?;
            tracing::info!(
                "Selecting institution {} ({})",
                institution.label,
                institution.value
            );

            let page = match self.select_institution(&state, institution).await {
                Ok((next, page)) => {
                    state = next;
                    page
                }
                Err(StatementError::Submission { message }) => {
                    tracing::warn!("Skipping institution {}: {}", institution.value, message);
                    collection.failures.push(UnitFailure {
                        institution: institution.value.clone(),
                        account: None,
                        message,
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };

            let range = available_range(&page.months);
            tracing::debug!(
                "Institution {}: {} accounts, month range {:?}",
                institution.value,
                page.accounts.len(),
                range
            );

            for account in &page.accounts {
                tracker.advance(CrawlStage::PerAccount)?;

                let Some(range) = range else {
                    tracing::warn!("No months available for account {}", account.value);
                    collection.wallets.push(AccountWallet::new(
                        institution,
                        account,
                        month_end(date),
                        Holdings::default(),
                    ));
                    continue;
                };

                let target = resolve_target(date, range, self.options.cap_dates);
                let mut selected = state.clone();
                selected.select(ACCOUNT_FIELD, &account.value)?;
                selected.select(MONTH_FIELD, &month_value(&page.months, target))?;
                tracker.advance(CrawlStage::PerMonth)?;
                tracing::info!("Requesting account {} for {}", account.value, target);

                match fetcher.fetch(&selected).await {
                    Ok((next, holdings)) => {
                        state = next;
                        tracker.advance(CrawlStage::ReportReady)?;
                        collection
                            .wallets
                            .push(AccountWallet::new(institution, account, target, holdings));
                    }
                    Err(StatementError::Submission { message }) => {
                        tracing::warn!("Skipping account {}: {}", account.value, message);
                        collection.failures.push(UnitFailure {
                            institution: institution.value.clone(),
                            account: Some(account.value.clone()),
                            message,
                        });
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        tracker.advance(CrawlStage::Done)?;
        tracing::info!(
            "Collected {} wallets ({} skipped units)",
            collection.wallets.len(),
            collection.failures.len()
        );
        Ok(collection)
    }

    /// Lists accounts and months for every institution without downloading reports
    pub async fn discover_options(&self) -> Result<StatementOptions, StatementError> {
        let mut tracker = CrawlTracker::new();
        let mut discovered = StatementOptions::default();

        let (mut state, institutions) = self.open_page().await?;

        for institution in &institutions {
            tracker.advance(CrawlStage::PerInstitution)?;

            match self.select_institution(&state, institution).await {
                Ok((next, page)) => {
                    state = next;
                    discovered.institutions.push(InstitutionOptions {
                        label: institution.label.clone(),
                        value: institution.value.clone(),
                        accounts: page.accounts.into_iter().map(|a| a.value).collect(),
                        months: page.months,
                    });
                }
                Err(StatementError::Submission { message }) => {
                    tracing::warn!("Skipping institution {}: {}", institution.value, message);
                }
                Err(e) => return Err(e),
            }
        }

        tracker.advance(CrawlStage::Done)?;
        Ok(discovered)
    }

    /// Loads the statement page and lists its selectable institutions
    async fn open_page(&self) -> Result<(FormState, Vec<SelectionOption>), StatementError> {
        let html = self.session.get_statement_page().await?;
        let state = FormState::load(&html);
        if let Some(missing) = REQUIRED_CONTROLS
            .iter()
            .find(|control| !state.contains(**control))
        {
            return Err(StatementError::MissingControl {
                selector: missing.to_string(),
            });
        }

        let institutions = selectable_options(&html, INSTITUTION_OPTIONS)?;
        tracing::debug!("Initial form state has {} fields", state.len());
        Ok((state, institutions))
    }

    /// Selects an institution and reads the accounts and months it offers
    ///
    /// The returned form state carries the server's field updates; on error
    /// the caller's state is left untouched.
    async fn select_institution(
        &self,
        state: &FormState,
        institution: &SelectionOption,
    ) -> Result<(FormState, InstitutionPage), StatementError> {
        let kind = PostbackKind::SelectInstitution;
        let mut next = state.clone();
        next.select(INSTITUTION_FIELD, &institution.value)?;

        let target = kind.script_manager_target();
        let body = encode(
            &next,
            kind.fields(),
            &[(SCRIPT_MANAGER, target.as_str()), (EVENT_TARGET, kind.event_target())],
        );

        let text = self.session.post_statement(&body).await?;
        let delta = decode(&text, false)?.check()?;
        log_delta(&delta, self.options.trace);
        next.apply_updates(&delta.field_updates);

        let page = InstitutionPage::parse(&text)?;
        Ok((next, page))
    }
}
