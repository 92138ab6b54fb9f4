//! File I/O operations

use crate::{Result, StoreError};
use std::path::Path;

/// Read presentation bytes from a file
pub async fn read_presentation(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();

    if !tokio::fs::try_exists(path).await? {
        return Err(StoreError::FileNotFound(path.display().to_string()));
    }

    Ok(tokio::fs::read(path).await?)
}

/// Write presentation bytes to a file, creating parent directories
pub async fn write_presentation(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// Read presentation bytes synchronously
pub fn read_presentation_sync(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(StoreError::FileNotFound(path.display().to_string()));
    }

    Ok(std::fs::read(path)?)
}

/// Write presentation bytes synchronously
pub fn write_presentation_sync(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}
