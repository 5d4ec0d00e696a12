use crate::error::{ArchiveError, Result};
use log::{debug, info};
use std::path::Path;
use tokio::fs;

/// Filesystem mutations, skipped and logged when running dry.
#[derive(Debug, Clone, Copy)]
pub struct Storage {
    dry_run: bool,
}

impl Storage {
    pub fn new(dry_run: bool) -> Self {
        Storage { dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub async fn create_dir_all(&self, path: &Path) -> Result<()> {
        if self.dry_run {
            info!("[dry-run] create directory {}", path.display());
            return Ok(());
        }
        debug!("Creating {}", path.display());
        fs::create_dir_all(path)
            .await
            .map_err(|e| ArchiveError::io(path, e))
    }

    /// Writes `contents` to `path`, creating missing parent directories.
    pub async fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if self.dry_run {
            info!(
                "[dry-run] write {} ({} bytes)",
                path.display(),
                contents.len()
            );
            return Ok(());
        }
        ensure_parent(path).await?;
        info!("Writing {}", path.display());
        fs::write(path, contents)
            .await
            .map_err(|e| ArchiveError::io(path, e))
    }
}

pub(crate) async fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .await
            .map_err(|e| ArchiveError::io(parent, e)),
        _ => Ok(()),
    }
}
