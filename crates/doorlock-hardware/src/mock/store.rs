//! In-memory persistent store.
//!
//! Behaves like a freshly erased EEPROM: every cell reads `0xFF` until
//! written. The handle lets a test seed the content, look at it afterwards
//! and make reads or writes fail.

use std::sync::{Arc, Mutex};

use doorlock_core::constants::ERASED_BYTE;

use super::lock;
use crate::{HardwareError, Result, traits::PersistentStore};

#[derive(Debug)]
struct Cells {
    bytes: Vec<u8>,
    writes: usize,
    fail_reads: bool,
    fail_writes: bool,
}

/// Byte store backed by a `Vec<u8>`.
///
/// # Examples
///
/// ```
/// use doorlock_hardware::mock::MemoryStore;
/// use doorlock_hardware::traits::PersistentStore;
///
/// # #[tokio::main]
/// # async fn main() -> doorlock_hardware::Result<()> {
/// let (mut store, handle) = MemoryStore::new(5);
/// assert_eq!(store.read(0).await?, 0xFF);
///
/// store.write(0, b'7').await?;
/// assert_eq!(handle.snapshot()[0], b'7');
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    cells: Arc<Mutex<Cells>>,
}

impl MemoryStore {
    /// Create an erased store of `capacity` bytes.
    pub fn new(capacity: u16) -> (Self, MemoryStoreHandle) {
        let cells = Arc::new(Mutex::new(Cells {
            bytes: vec![ERASED_BYTE; usize::from(capacity)],
            writes: 0,
            fail_reads: false,
            fail_writes: false,
        }));
        (
            Self {
                cells: Arc::clone(&cells),
            },
            MemoryStoreHandle { cells },
        )
    }
}

impl PersistentStore for MemoryStore {
    async fn write(&mut self, index: u16, byte: u8) -> Result<()> {
        let mut cells = lock(&self.cells);
        if cells.fail_writes {
            return Err(HardwareError::storage(format!("write at {index} failed")));
        }
        let capacity = cells.bytes.len();
        let cell = cells
            .bytes
            .get_mut(usize::from(index))
            .ok_or_else(|| HardwareError::out_of_range(index, capacity as u16))?;
        *cell = byte;
        cells.writes += 1;
        Ok(())
    }

    async fn read(&mut self, index: u16) -> Result<u8> {
        let cells = lock(&self.cells);
        if cells.fail_reads {
            return Err(HardwareError::storage(format!("read at {index} failed")));
        }
        cells
            .bytes
            .get(usize::from(index))
            .copied()
            .ok_or_else(|| HardwareError::out_of_range(index, cells.bytes.len() as u16))
    }
}

/// Test-side access to a [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryStoreHandle {
    cells: Arc<Mutex<Cells>>,
}

impl MemoryStoreHandle {
    /// Current content of every cell.
    pub fn snapshot(&self) -> Vec<u8> {
        lock(&self.cells).bytes.clone()
    }

    /// Overwrite the cells starting at index 0, bypassing the write counter.
    pub fn seed(&self, bytes: &[u8]) {
        let mut cells = lock(&self.cells);
        for (cell, byte) in cells.bytes.iter_mut().zip(bytes) {
            *cell = *byte;
        }
    }

    /// Number of successful writes.
    pub fn writes(&self) -> usize {
        lock(&self.cells).writes
    }

    pub fn fail_reads(&self, fail: bool) {
        lock(&self.cells).fail_reads = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        lock(&self.cells).fail_writes = fail;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_store_is_erased() {
        let (mut store, handle) = MemoryStore::new(5);
        assert_eq!(handle.snapshot(), vec![0xFF; 5]);
        assert_eq!(store.read(4).await.unwrap(), 0xFF);
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let (mut store, handle) = MemoryStore::new(5);
        store.write(2, b'x').await.unwrap();

        assert_eq!(store.read(2).await.unwrap(), b'x');
        assert_eq!(handle.writes(), 1);
    }

    #[tokio::test]
    async fn test_out_of_range() {
        let (mut store, _handle) = MemoryStore::new(5);

        let write = store.write(5, b'1').await;
        assert!(matches!(
            write,
            Err(HardwareError::OutOfRange {
                index: 5,
                capacity: 5
            })
        ));
        assert!(store.read(9).await.is_err());
    }

    #[tokio::test]
    async fn test_seed_and_failure_injection() {
        let (mut store, handle) = MemoryStore::new(5);
        handle.seed(b"1234#");
        assert_eq!(store.read(0).await.unwrap(), b'1');
        assert_eq!(handle.writes(), 0);

        handle.fail_reads(true);
        assert!(matches!(
            store.read(0).await,
            Err(HardwareError::Storage { .. })
        ));

        handle.fail_writes(true);
        assert!(store.write(0, b'9').await.is_err());
        assert_eq!(handle.snapshot()[0], b'1');
    }
}
