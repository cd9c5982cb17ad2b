// Filesystem sink adapter - Writes finished documents into a directory

use crate::domain::errors::*;
use crate::output::OverwritePolicy;
use crate::ports::*;
use async_trait::async_trait;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Writes documents atomically: a temp file in the target directory is
/// persisted onto the final name.
pub struct FsDocumentSink {
    out_dir: PathBuf,
    overwrite: OverwritePolicy,
}

impl FsDocumentSink {
    pub fn new(out_dir: impl Into<PathBuf>, overwrite: OverwritePolicy) -> Self {
        Self {
            out_dir: out_dir.into(),
            overwrite,
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    fn target_for(&self, filename: &str) -> Result<PathBuf, DomainError> {
        let name = Path::new(filename);
        let is_plain = name.components().count() == 1 && name.file_name().is_some();
        if !is_plain {
            return Err(DomainError::Sink(format!(
                "Refusing to write outside the output directory: {}",
                filename
            )));
        }
        Ok(self.out_dir.join(name))
    }
}

#[async_trait]
impl DocumentSinkPort for FsDocumentSink {
    async fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<String, DomainError> {
        let target = self.target_for(filename)?;

        fs::create_dir_all(&self.out_dir).map_err(|e| {
            DomainError::Sink(format!(
                "Failed to create output directory {}: {}",
                self.out_dir.display(),
                e
            ))
        })?;

        if self.overwrite == OverwritePolicy::Never && target.exists() {
            return Err(DomainError::Sink(format!(
                "Output file already exists: {} (overwrite policy is never)",
                target.display()
            )));
        }

        let mut temp = NamedTempFile::new_in(&self.out_dir)
            .map_err(|e| DomainError::Sink(format!("Failed to create temporary file: {}", e)))?;
        temp.write_all(bytes)
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| DomainError::Sink(format!("Failed to write document: {}", e)))?;

        match self.overwrite {
            OverwritePolicy::Always => temp.persist(&target).map(|_| ()),
            OverwritePolicy::Never => temp.persist_noclobber(&target).map(|_| ()),
        }
        .map_err(|e| DomainError::Sink(format!("Failed to move document into place: {}", e.error)))?;

        tracing::info!("Wrote {} ({} bytes)", target.display(), bytes.len());
        Ok(target.to_string_lossy().to_string())
    }
}
