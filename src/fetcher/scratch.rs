use crate::constants::{SCRATCH_PREFIX, STREAM_CHUNK_SIZE};
use std::io;
use std::path::Path;
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Request-scoped scratch file a download is streamed into.
///
/// The file is deleted when this value (or the `TempPath` it hands out) is dropped.
pub struct ScratchFile {
    writer: BufWriter<File>,
    path: TempPath,
    written: u64,
}

impl ScratchFile {
    /// Create a new scratch file in `dir`
    pub fn create(dir: &Path, suffix: Option<&str>) -> io::Result<Self> {
        let named = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .suffix(suffix.unwrap_or(".tmp"))
            .tempfile_in(dir)?;
        let (file, path) = named.into_parts();

        Ok(Self {
            writer: BufWriter::with_capacity(STREAM_CHUNK_SIZE, File::from_std(file)),
            path,
            written: 0,
        })
    }

    pub async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.writer.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Bytes accepted so far
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush, read the content back and hand over ownership of the file
    pub async fn finish(mut self) -> io::Result<(Vec<u8>, TempPath)> {
        self.writer.flush().await?;
        let Self { writer, path, .. } = self;
        drop(writer);

        let bytes = tokio::fs::read(&path).await?;
        Ok((bytes, path))
    }

    /// Drop partial content right away
    pub fn discard(self) {
        let Self { writer, path, .. } = self;
        drop(writer);
        let shown = path.display().to_string();
        if let Err(e) = path.close() {
            tracing::warn!("Failed to delete temp file {}: {}", shown, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_scratch_write_and_finish() {
        let dir = tempfile::tempdir().unwrap();
        let mut scratch = ScratchFile::create(dir.path(), Some(".txt")).unwrap();
        assert!(scratch.path().to_string_lossy().ends_with(".txt"));

        scratch.write(b"hello ").await.unwrap();
        scratch.write(b"world").await.unwrap();
        assert_eq!(scratch.written(), 11);

        let (bytes, path) = scratch.finish().await.unwrap();
        assert_eq!(bytes, b"hello world");
        assert_eq!(entries(dir.path()), 1);

        drop(path);
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_scratch_discard_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut scratch = ScratchFile::create(dir.path(), None).unwrap();
        scratch.write(&[0u8; 100]).await.unwrap();
        assert_eq!(entries(dir.path()), 1);

        scratch.discard();
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_scratch_drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        {
            let _scratch = ScratchFile::create(dir.path(), None).unwrap();
            assert_eq!(entries(dir.path()), 1);
        }
        assert_eq!(entries(dir.path()), 0);
    }
}
