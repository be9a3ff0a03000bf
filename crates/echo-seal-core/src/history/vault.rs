use crate::{HistoryError, HistoryResult};

use std::{
    io,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use image::ImageFormat;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, warn};
use uuid::Uuid;

/// Directory of seal images, one file per artifact.
#[derive(Debug, Clone)]
pub struct SealVault {
    dir: PathBuf,
}

impl SealVault {
    /// Vault rooted at `dir`; created on first store.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` as the image for artifact `id`, named `<id>.<ext>` after
    /// `format`.
    ///
    /// A failed write leaves neither the final file nor its temp file behind.
    pub async fn store(
        &self,
        id: Uuid,
        format: ImageFormat,
        bytes: &[u8],
    ) -> HistoryResult<PathBuf> {
        let caller = Location::caller();
        let io_err = |source| HistoryError::Io {
            source,
            location: ErrorLocation::from(caller),
        };

        fs::create_dir_all(&self.dir).await.map_err(io_err)?;

        let extension = format.extensions_str().first().copied().unwrap_or("img");
        let path = self.dir.join(format!("{}.{}", id, extension));
        let tmp = path.with_extension(format!("{}.tmp", extension));

        if let Err(e) = write_then_rename(&tmp, &path, bytes).await {
            match fs::remove_file(&tmp).await {
                Ok(()) => {}
                Err(cleanup) if cleanup.kind() == io::ErrorKind::NotFound => {}
                Err(cleanup) => {
                    warn!(path = %tmp.display(), error = %cleanup, "Failed to remove temp image")
                }
            }
            return Err(io_err(e));
        }

        debug!(path = %path.display(), bytes = bytes.len(), "Seal image stored");
        Ok(path)
    }

    /// Read an image back.
    pub async fn read(&self, path: &Path) -> HistoryResult<Vec<u8>> {
        fs::read(path).await.map_err(|source| HistoryError::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Remove an image. A missing file is already discarded.
    pub async fn discard(&self, path: &Path) {
        match fs::remove_file(path).await {
            Ok(()) => debug!(path = %path.display(), "Seal image discarded"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to discard seal image"),
        }
    }
}

async fn write_then_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(tmp).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(tmp, path).await
}
