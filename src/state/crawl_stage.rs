/// Crawl stage definitions for the cascading selection walk
///
/// The walk is depth-first with no backtracking: institutions contain
/// accounts, each account resolves one month, each month produces one report.
use crate::StatementError;
use std::fmt;

/// Represents where the crawler is in the institution → account → month cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlStage {
    /// Initial page fetched, form state not yet positioned
    Init,

    /// An institution has been selected and its postback is in flight
    PerInstitution,

    /// An account of the current institution has been selected
    PerAccount,

    /// The target month is set and the report postback is in flight
    PerMonth,

    /// The report for the current account has been collected
    ReportReady,

    /// All institutions exhausted
    Done,
}

impl CrawlStage {
    /// Returns true if the walk is allowed to move from `self` to `next`
    ///
    /// Besides the forward path, every stage that finishes (or abandons) a
    /// unit of work may move on to the next account, the next institution,
    /// or finish the walk.
    pub fn can_transition_to(&self, next: CrawlStage) -> bool {
        use CrawlStage::*;
        match (self, next) {
            (Init, PerInstitution) | (Init, Done) => true,
            (PerInstitution, PerAccount) => true,
            (PerAccount, PerMonth) => true,
            (PerMonth, ReportReady) => true,
            (PerInstitution | PerAccount | PerMonth | ReportReady, PerInstitution) => true,
            (PerAccount | PerMonth | ReportReady, PerAccount) => true,
            (PerInstitution | PerAccount | PerMonth | ReportReady, Done) => true,
            _ => false,
        }
    }

    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Short lowercase name used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::PerInstitution => "per_institution",
            Self::PerAccount => "per_account",
            Self::PerMonth => "per_month",
            Self::ReportReady => "report_ready",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks the current stage of a single crawl invocation
#[derive(Debug, Clone)]
pub struct CrawlTracker {
    stage: CrawlStage,
}

impl CrawlTracker {
    pub fn new() -> Self {
        Self {
            stage: CrawlStage::Init,
        }
    }

    pub fn stage(&self) -> CrawlStage {
        self.stage
    }

    /// Moves to `next`, rejecting transitions the cascade does not allow
    pub fn advance(&mut self, next: CrawlStage) -> Result<(), StatementError> {
        if !self.stage.can_transition_to(next) {
            return Err(StatementError::InvalidTransition {
                from: self.stage,
                to: next,
            });
        }
        tracing::trace!("Crawl stage {} -> {}", self.stage, next);
        self.stage = next;
        Ok(())
    }
}

impl Default for CrawlTracker {
    fn default() -> Self {
        Self::new()
    }
}
