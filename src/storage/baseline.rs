//! Filesystem baseline archive
//!
//! Each source keeps exactly one baseline file, `source-{id}.pdf` for PDF
//! sources and `source-{id}.txt` (stripped text) for HTML sources. Writes go
//! through a temp file in the same directory and are renamed into place.

use crate::storage::traits::{BaselineStore, StorageResult};
use crate::storage::SourceType;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// [`BaselineStore`] backed by a directory
#[derive(Debug, Clone)]
pub struct FsBaselineStore {
    dir: PathBuf,
}

impl FsBaselineStore {
    /// Uses `dir` as the archive, creating it if needed
    pub fn new(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, source_id: i64, source_type: SourceType) -> PathBuf {
        let extension = match source_type {
            SourceType::Pdf => "pdf",
            SourceType::Html => "txt",
        };
        self.dir.join(format!("source-{}.{}", source_id, extension))
    }
}

impl BaselineStore for FsBaselineStore {
    fn load(&self, source_id: i64, source_type: SourceType) -> StorageResult<Option<Vec<u8>>> {
        match fs::read(self.path_for(source_id, source_type)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(
        &self,
        source_id: i64,
        source_type: SourceType,
        content: &[u8],
    ) -> StorageResult<()> {
        let mut file = NamedTempFile::new_in(&self.dir)?;
        file.write_all(content)?;
        file.flush()?;
        file.persist(self.path_for(source_id, source_type))
            .map_err(|e| e.error)?;

        tracing::debug!(
            "Stored {} byte baseline for source {}",
            content.len(),
            source_id
        );
        Ok(())
    }
}
