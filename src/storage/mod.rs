//! Storage module for transient report files
//!
//! Downloaded reports live on disk only long enough to be extracted:
//! - `ReportStorage`: the save/remove interface the crawler depends on
//! - `FolderStorage`: saves reports into a local folder

mod folder;
mod traits;

pub use folder::FolderStorage;
pub use traits::{ReportStorage, StorageError, StorageResult};
