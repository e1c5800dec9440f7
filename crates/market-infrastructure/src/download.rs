//! Writing downloaded results to disk.

use std::path::{Path, PathBuf};

use market_core::error::{MarketError, Result};
use tokio::io::AsyncWriteExt;

use crate::storage::temp_path;

/// Writes result files into one output directory.
///
/// Files are written to a temporary sibling and renamed into place. An
/// existing file with the same name is replaced.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    directory: PathBuf,
}

impl OutputWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Writes `bytes` as `filename` and returns the final path.
    pub async fn write(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        if filename.is_empty() || filename.contains(['/', '\\']) {
            return Err(MarketError::validation(format!(
                "invalid output file name: '{filename}'"
            )));
        }

        tokio::fs::create_dir_all(&self.directory).await?;
        let target = self.directory.join(filename);
        let tmp_path = temp_path(&target)?;

        let mut tmp_file = tokio::fs::File::create(&tmp_path).await?;
        tmp_file.write_all(bytes).await?;
        tmp_file.sync_all().await?;
        drop(tmp_file);

        tokio::fs::rename(&tmp_path, &target).await?;
        tracing::info!(path = %target.display(), len = bytes.len(), "Wrote output file");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_directory_and_replaces() {
        let temp_dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp_dir.path().join("outputs"));

        let path = writer.write("variacao-ia.png", b"first").await.unwrap();
        assert_eq!(path, temp_dir.path().join("outputs").join("variacao-ia.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"first");

        writer.write("variacao-ia.png", b"second").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert_eq!(std::fs::read_dir(writer.directory()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_rejects_path_like_names() {
        let temp_dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp_dir.path());
        assert!(writer.write("../escape.png", b"x").await.is_err());
        assert!(writer.write("", b"x").await.is_err());
    }
}
