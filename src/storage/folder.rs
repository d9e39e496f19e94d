use crate::storage::{ReportStorage, StorageError, StorageResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Saves report files into a single local folder
#[derive(Debug, Clone)]
pub struct FolderStorage {
    root: PathBuf,
}

impl FolderStorage {
    /// Opens (creating if needed) the folder reports are saved into
    pub fn new(root: &Path) -> StorageResult<Self> {
        fs::create_dir_all(root).map_err(|e| io_error(root, e))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, file_name: &str) -> StorageResult<PathBuf> {
        let is_plain = !file_name.is_empty()
            && Path::new(file_name).file_name().and_then(|n| n.to_str()) == Some(file_name);
        if !is_plain {
            return Err(StorageError::InvalidFileName(file_name.to_string()));
        }
        Ok(self.root.join(file_name))
    }
}

impl ReportStorage for FolderStorage {
    fn save(&self, file_name: &str, contents: &[u8]) -> StorageResult<PathBuf> {
        let path = self.path_for(file_name)?;
        fs::write(&path, contents).map_err(|e| io_error(&path, e))?;
        tracing::debug!("Saved {} bytes to {}", contents.len(), path.display());
        Ok(path)
    }

    fn remove(&self, file_name: &str) -> StorageResult<()> {
        let path = self.path_for(file_name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}
