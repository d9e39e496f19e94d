//! Custody-Statement: a postback-driven custody statement collector
//!
//! This crate drives a server-rendered statement page through its
//! institution → account → month cascade using simulated partial-page
//! postbacks, then extracts typed holdings from the downloaded spreadsheet.

pub mod config;
pub mod crawler;
pub mod output;
pub mod postback;
pub mod session;
pub mod spreadsheet;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for statement collection
#[derive(Debug, Error)]
pub enum StatementError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Server rejected the submission: {message}")]
    Submission { message: String },

    #[error("Postback decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Spreadsheet extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Control not found on page: {selector}")]
    MissingControl { selector: String },

    #[error("Invalid crawl transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlStage,
        to: state::CrawlStage,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StatementError {
    /// Returns true if the failure came from the transport and may succeed
    /// on another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { source, .. } => source.is_timeout() || source.is_connect(),
            Self::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while decoding a partial-postback delta response
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Empty postback response")]
    EmptyResponse,

    #[error("Response is not a delta payload: {0}")]
    NotDelta(String),

    #[error("Marker '{marker}' at token {index} is missing its id/value tokens")]
    TruncatedMarker { marker: String, index: usize },

    #[error("Malformed script directive: {0}")]
    MalformedDirective(String),
}

/// Errors raised while extracting a section from a spreadsheet
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to open workbook {path}: {message}")]
    Open { path: String, message: String },

    #[error("Workbook {path} has no worksheets")]
    NoSheet { path: String },

    #[error("Row {row} has {found} cells, expected {expected}")]
    ColumnMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid {kind} value '{value}' for field '{field}'")]
    InvalidValue {
        field: String,
        kind: &'static str,
        value: String,
    },

    #[error("Field '{0}' missing from extracted row")]
    MissingField(String),
}

/// Result type alias for statement operations
pub type Result<T> = std::result::Result<T, StatementError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for spreadsheet extraction
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

// Re-export commonly used types
pub use config::{Config, CrawlOptions};
pub use crawler::{
    get_statement, get_statement_collection, get_statement_options, AccountWallet,
    StatementCollection, StatementOptions,
};
pub use postback::FormState;
pub use session::{RetryPolicy, Session};
pub use spreadsheet::StatementRecord;
pub use state::CrawlStage;
