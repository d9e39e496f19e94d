//! Session module: the HTTP transport the crawler drives
//!
//! - `Session`: cookie-preserving client bound to the statement site
//! - `RetryPolicy`: bounded retry wrapped around each network call

mod client;
mod retry;

pub use client::{build_http_client, Session};
pub use retry::{RetryPolicy, DEFAULT_ATTEMPTS, DEFAULT_DELAY};
