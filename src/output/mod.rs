//! Output module for collected statements
//!
//! This module handles:
//! - Writing wallets and discovered options as JSON
//! - Logging per-account summaries

mod json;
mod summary;
mod traits;

pub use json::{write_json, write_to};
pub use summary::{
    format_failures, format_wallet_summary, log_collection_summary, log_options_summary,
    log_wallet_summary, total_value,
};
pub use traits::{OutputError, OutputResult};
