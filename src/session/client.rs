//! HTTP session for the statement site
//!
//! This module wraps a cookie-preserving `reqwest` client with:
//! - Pre-authenticated session cookies seeded into the jar
//! - Page fetches and partial-postback submissions
//! - Report downloads
//! - Bounded retry around every network call

use crate::config::SessionConfig;
use crate::session::RetryPolicy;
use crate::StatementError;
use reqwest::cookie::Jar;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// A single logical session against the statement site
///
/// All postbacks depend on the server's view of the previous one, so a
/// session is meant to be driven sequentially.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    base_url: Url,
    statement_page: String,
    report_page: String,
    retry: RetryPolicy,
}

/// Builds an HTTP client with a cookie jar seeded from the configuration
///
/// # Arguments
///
/// * `config` - The session configuration
/// * `base_url` - URL the configured cookies are scoped to
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &SessionConfig, base_url: &Url) -> Result<Client, reqwest::Error> {
    let jar = Arc::new(Jar::default());
    for cookie in &config.cookies {
        jar.add_cookie_str(cookie, base_url);
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .cookie_provider(jar)
        .gzip(true)
        .brotli(true)
        .build()
}

impl Session {
    /// Creates a session from configuration
    pub fn new(config: &SessionConfig, retry: RetryPolicy) -> Result<Self, StatementError> {
        let base_url = Url::parse(&config.base_url)?;
        let client = build_http_client(config, &base_url)?;

        Ok(Self {
            client,
            base_url,
            statement_page: config.statement_page.clone(),
            report_page: config.report_page.clone(),
            retry,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Fetches the statement page with its initial form state
    pub async fn get_statement_page(&self) -> Result<String, StatementError> {
        let url = &self.base_url.join(&self.statement_page)?;
        self.retry
            .run(
                || async move {
                    let response = self.send(self.client.get(url.clone()), url).await?;
                    read_text(response, url).await
                },
                StatementError::is_retryable,
            )
            .await
    }

    /// Submits a partial postback to the statement page and returns the raw delta text
    pub async fn post_statement(&self, body: &str) -> Result<String, StatementError> {
        let url = &self.base_url.join(&self.statement_page)?;
        tracing::debug!("Posting {} bytes to {}", body.len(), url);

        self.retry
            .run(
                || async move {
                    let request = self
                        .client
                        .post(url.clone())
                        .headers(postback_headers())
                        .body(body.to_string());
                    let response = self.send(request, url).await?;
                    read_text(response, url).await
                },
                StatementError::is_retryable,
            )
            .await
    }

    /// Downloads a generated report by its identifier
    pub async fn download_report(&self, report_id: &str) -> Result<Vec<u8>, StatementError> {
        let mut url = self.base_url.join(&self.report_page)?;
        url.query_pairs_mut().append_pair("id", report_id);
        tracing::debug!("Downloading report from {}", url);
        let url = &url;

        self.retry
            .run(
                || async move {
                    let response = self.send(self.client.get(url.clone()), url).await?;
                    let bytes = response.bytes().await.map_err(|e| StatementError::Http {
                        url: url.to_string(),
                        source: e,
                    })?;
                    Ok(bytes.to_vec())
                },
                StatementError::is_retryable,
            )
            .await
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<Response, StatementError> {
        let response = request.send().await.map_err(|e| StatementError::Http {
            url: url.to_string(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatementError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

/// Headers the server expects on an asynchronous (partial) postback
fn postback_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
    headers.insert("X-MicrosoftAjax", HeaderValue::from_static("Delta=true"));
    headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers
}

async fn read_text(response: Response, url: &Url) -> Result<String, StatementError> {
    response.text().await.map_err(|e| StatementError::Http {
        url: url.to_string(),
        source: e,
    })
}
