//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlStage`: where the walk is in the institution → account → month cascade
//! - `CrawlTracker`: validates stage transitions for one crawl invocation

mod crawl_stage;

// Re-export main types
pub use crawl_stage::{CrawlStage, CrawlTracker};
