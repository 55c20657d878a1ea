//! Where index blobs live.
//!
//! The catalogue only produces and consumes bytes; implementations of
//! [`BlobStorage`] decide where those bytes go.

use std::fs;
use std::path::Path;

use crate::models::types::Result;

/// Load and save whole blobs by path
pub trait BlobStorage {
    fn load(&self, path: &Path) -> Result<Vec<u8>>;

    fn save(&self, path: &Path, data: &[u8]) -> Result<()>;

    fn exists(&self, path: &Path) -> bool;
}

/// Plain files on the local filesystem.
///
/// Saves go through a sibling temporary file and a rename, so a reader never
/// sees a half-written index.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileStorage;

impl BlobStorage for FileStorage {
    fn load(&self, path: &Path) -> Result<Vec<u8>> {
        let data = fs::read(path)?;
        log::debug!("Read {} bytes from {}", data.len(), path.display());
        Ok(data)
    }

    fn save(&self, path: &Path, data: &[u8]) -> Result<()> {
        let mut staging = path.as_os_str().to_owned();
        staging.push(".tmp");

        fs::write(&staging, data)?;
        fs::rename(&staging, path)?;
        log::debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}
