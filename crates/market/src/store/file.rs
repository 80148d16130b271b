//! Directory-backed record store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use uuid::Uuid;

use super::{RecordStore, StoreError};

/// Stores each key as `<dir>/<key>.csv`.
///
/// Writes go to a uniquely named temp file in the same directory that is
/// then renamed over the target, so readers never observe a half-written
/// collection.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    load_delay: Duration,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            load_delay: Duration::ZERO,
        }
    }

    /// Simulate a slow medium by sleeping before every read.
    #[must_use]
    pub const fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// The directory holding the collection files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.csv"))
    }
}

impl RecordStore for FileStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }

        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_owned(),
                source,
            }),
        }
    }

    async fn write(&self, key: &str, blob: String) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            key: key.to_owned(),
            source,
        };

        tokio::fs::create_dir_all(&self.dir).await.map_err(io_err)?;

        let path = self.path_for(key);
        let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        tokio::fs::write(&temp_path, blob).await.map_err(io_err)?;

        if let Err(source) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(io_err(source));
        }

        tracing::trace!(key, path = %path.display(), "Collection written");
        Ok(())
    }
}
