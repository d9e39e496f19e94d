use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub session: SessionConfig,
    #[serde(default)]
    pub crawl: CrawlOptions,
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Transport configuration for the statement site
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Base URL every page path is resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the statement page holding the selection controls
    #[serde(rename = "statement-page", default = "default_statement_page")]
    pub statement_page: String,

    /// Path of the page serving generated reports by id
    #[serde(rename = "report-page", default = "default_report_page")]
    pub report_page: String,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Cookies of an already authenticated session, in `Set-Cookie` form
    #[serde(default)]
    pub cookies: Vec<String>,
}

/// Options recognized by the statement collection entry points
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlOptions {
    /// Clamp an out-of-range target date to the available month range
    #[serde(rename = "cap-dates", default)]
    pub cap_dates: bool,

    /// Folder where report files are saved before extraction
    #[serde(rename = "downloaded-folder", default = "std::env::temp_dir")]
    pub downloaded_folder: PathBuf,

    /// Log every decoded field update and script directive
    #[serde(default)]
    pub trace: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            cap_dates: false,
            downloaded_folder: std::env::temp_dir(),
            trace: false,
        }
    }
}

/// Bounded retry configuration for network calls
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Pause between attempts in milliseconds
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

fn default_statement_page() -> String {
    "ConsultarCarteiraAtivos.aspx".to_string()
}

fn default_report_page() -> String {
    "DownloadRelatorio.aspx".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    1000
}
