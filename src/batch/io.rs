//! Injected file capabilities of the batch processor.
//!
//! The processor never touches the filesystem directly: it reads source bytes
//! through an [`AudioReader`] and hands encoded WAVs to an [`AudioWriter`].
//! [`FsReader`] and [`ProcessedDirWriter`] are the production implementations;
//! tests substitute in-memory doubles.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::project::PROCESSED_DIR;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Reads the raw bytes of a source recording.
#[async_trait]
pub trait AudioReader: Send + Sync {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Persists an encoded recording under `name` and returns where it landed.
#[async_trait]
pub trait AudioWriter: Send + Sync {
    async fn write(&self, bytes: Vec<u8>, name: &str) -> io::Result<PathBuf>;
}

const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn AudioReader>, _: Box<dyn AudioWriter>) {}
};

// ---------------------------------------------------------------------------
// FsReader
// ---------------------------------------------------------------------------

/// Reads files with `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

#[async_trait]
impl AudioReader for FsReader {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }
}

// ---------------------------------------------------------------------------
// ProcessedDirWriter
// ---------------------------------------------------------------------------

/// Writes into `<project>/wavs_processed/`, creating it on first use.
#[derive(Debug, Clone)]
pub struct ProcessedDirWriter {
    dir: PathBuf,
}

impl ProcessedDirWriter {
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: project_dir.as_ref().join(PROCESSED_DIR),
        }
    }
}

#[async_trait]
impl AudioWriter for ProcessedDirWriter {
    async fn write(&self, bytes: Vec<u8>, name: &str) -> io::Result<PathBuf> {
        // Output names are generated from item ids; refuse anything that
        // would land outside the processed directory.
        let file_name = Path::new(name)
            .file_name()
            .filter(|f| *f == std::ffi::OsStr::new(name))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("invalid output file name {name:?}"),
                )
            })?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn writer_creates_processed_dir() {
        let dir = tempdir().unwrap();
        let writer = ProcessedDirWriter::new(dir.path());

        let path = writer.write(b"RIFF".to_vec(), "processed_a.wav").await.unwrap();
        assert_eq!(path, dir.path().join(PROCESSED_DIR).join("processed_a.wav"));
        assert_eq!(std::fs::read(&path).unwrap(), b"RIFF");
    }

    #[tokio::test]
    async fn writer_rejects_path_components() {
        let dir = tempdir().unwrap();
        let writer = ProcessedDirWriter::new(dir.path());

        for name in ["../escape.wav", "sub/dir.wav", "..", ""] {
            let err = writer.write(Vec::new(), name).await.unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput, "{name}");
        }
    }

    #[tokio::test]
    async fn reader_round_trips_writer_output() {
        let dir = tempdir().unwrap();
        let path = ProcessedDirWriter::new(dir.path())
            .write(vec![1, 2, 3], "x.wav")
            .await
            .unwrap();
        assert_eq!(FsReader.read(&path).await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn reader_reports_missing_file() {
        let dir = tempdir().unwrap();
        let err = FsReader.read(&dir.path().join("nope.wav")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
