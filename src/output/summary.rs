//! Human-readable collection summaries

use crate::crawler::{AccountWallet, StatementCollection, StatementOptions, UnitFailure};

/// Formats one summary line per wallet
pub fn format_wallet_summary(wallets: &[AccountWallet]) -> Vec<String> {
    wallets
        .iter()
        .map(|wallet| {
            format!(
                "{} / {} ({}): {} in custody, {} in guarantee, total value {:.2}",
                wallet.institution_label,
                wallet.account,
                wallet.month.format("%m/%Y"),
                wallet.assets_custody.len(),
                wallet.assets_guarantee.len(),
                total_value(wallet)
            )
        })
        .collect()
}

/// Sum of the value column over both sections of a wallet
pub fn total_value(wallet: &AccountWallet) -> f64 {
    wallet
        .assets_custody
        .iter()
        .chain(&wallet.assets_guarantee)
        .map(|record| record.value)
        .sum()
}

/// Logs the per-account summary of a collection
pub fn log_wallet_summary(wallets: &[AccountWallet]) {
    tracing::info!("=== Statement Summary ({} accounts) ===", wallets.len());
    for line in format_wallet_summary(wallets) {
        tracing::info!("  {}", line);
    }
}

/// Formats one line per refused unit
pub fn format_failures(failures: &[UnitFailure]) -> Vec<String> {
    failures
        .iter()
        .map(|failure| match &failure.account {
            Some(account) => format!(
                "{} / {}: {}",
                failure.institution, account, failure.message
            ),
            None => format!("{}: {}", failure.institution, failure.message),
        })
        .collect()
}

/// Logs the per-account summary and the skipped units of a collection
pub fn log_collection_summary(collection: &StatementCollection) {
    log_wallet_summary(&collection.wallets);
    if collection.failures.is_empty() {
        return;
    }

    tracing::warn!("Skipped {} units:", collection.failures.len());
    for line in format_failures(&collection.failures) {
        tracing::warn!("  {}", line);
    }
}

/// Logs the institutions, accounts and month counts that were discovered
pub fn log_options_summary(options: &StatementOptions) {
    tracing::info!(
        "=== Statement Options ({} institutions) ===",
        options.institutions.len()
    );
    for institution in &options.institutions {
        tracing::info!(
            "  {} ({}): {} accounts, {} months",
            institution.label,
            institution.value,
            institution.accounts.len(),
            institution.months.len()
        );
    }
}
