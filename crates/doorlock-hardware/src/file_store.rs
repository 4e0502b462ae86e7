//! File-backed persistent store.
//!
//! Maps store indices to byte offsets in a plain file. The file outlives the
//! process, which makes it the host's stand-in for an EEPROM that survives
//! power cycles. A missing file is created erased (`0xFF`), and a short one
//! is padded with erased bytes.

use std::path::{Path, PathBuf};

use doorlock_core::constants::ERASED_BYTE;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt, SeekFrom};
use tracing::{debug, info};

use crate::{HardwareError, Result, traits::PersistentStore};

/// Persistent store kept in a file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    file: File,
    capacity: u16,
}

impl FileStore {
    /// Open (or create) the store at `path` with `capacity` cells.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::Io` if the file cannot be opened, created or
    /// extended.
    pub async fn open(path: impl AsRef<Path>, capacity: u16) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .await?;

        let len = file.metadata().await?.len();
        if let Ok(len) = u16::try_from(len)
            && len < capacity
        {
            let missing = usize::from(capacity - len);
            file.seek(SeekFrom::End(0)).await?;
            file.write_all(&vec![ERASED_BYTE; missing]).await?;
            file.sync_data().await?;
            info!(path = %path.display(), missing, "Initialized erased store cells");
        }

        Ok(Self {
            path,
            file,
            capacity,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_index(&self, index: u16) -> Result<()> {
        if index >= self.capacity {
            return Err(HardwareError::out_of_range(index, self.capacity));
        }
        Ok(())
    }
}

impl PersistentStore for FileStore {
    async fn write(&mut self, index: u16, byte: u8) -> Result<()> {
        self.check_index(index)?;
        self.file.seek(SeekFrom::Start(u64::from(index))).await?;
        self.file.write_all(&[byte]).await?;
        self.file.sync_data().await?;
        debug!(index, "Store cell written");
        Ok(())
    }

    async fn read(&mut self, index: u16) -> Result<u8> {
        self.check_index(index)?;
        self.file.seek(SeekFrom::Start(u64::from(index))).await?;
        let mut byte = [0u8; 1];
        self.file.read_exact(&mut byte).await?;
        Ok(byte[0])
    }
}
