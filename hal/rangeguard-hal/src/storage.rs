//! Persistent storage abstractions
//!
//! The distance log is an append-only sequence of text records. The
//! storage implementation decides where they live (flash partition, SD
//! card) and handles wear leveling and integrity.
//!
//! [`QueueLog`] is the NOR flash implementation: a sequential-storage queue
//! over any `embedded_storage_async` flash, so the same code runs on the
//! chip and against a RAM flash in host tests.

use core::ops::Range;

use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::{queue, Error};

/// Largest record accepted by [`QueueLog`]
pub const MAX_RECORD_SIZE: usize = 64;

/// Read buffer for one record, rounded up for word-aligned reads
const READ_BUFFER_SIZE: usize = 2 * MAX_RECORD_SIZE;

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Underlying medium operation failed
    Medium,
    /// Storage is full and old records may not be overwritten
    Full,
    /// Record larger than the implementation supports
    RecordTooLarge,
    /// Data corrupted or invalid
    Corrupted,
}

/// Append-only record log
///
/// Implementations should handle:
/// - Wear leveling across sectors
/// - Data integrity (CRC or similar)
/// - Atomic appends (a record is either fully stored or absent)
pub trait RecordLog {
    /// Discard every stored record
    ///
    /// Called once per power cycle before the session header is written.
    fn clear(&mut self) -> impl core::future::Future<Output = Result<(), StorageError>>;

    /// Append one record
    ///
    /// # Arguments
    /// * `record` - Record bytes (one text line, without terminator)
    fn append(
        &mut self,
        record: &[u8],
    ) -> impl core::future::Future<Output = Result<(), StorageError>>;

    /// Visit every stored record, oldest first
    ///
    /// Returns the number of records visited.
    fn for_each<V: FnMut(&[u8])>(
        &mut self,
        visit: V,
    ) -> impl core::future::Future<Output = Result<usize, StorageError>>;
}

/// Record log in a NOR flash partition
///
/// When the partition fills up the oldest records are overwritten.
pub struct QueueLog<F> {
    flash: F,
    range: Range<u32>,
}

impl<F: NorFlash> QueueLog<F> {
    /// Use `range` of `flash` as the log partition
    ///
    /// The range must be aligned to the flash erase size and span at
    /// least two erase pages.
    pub fn new(flash: F, range: Range<u32>) -> Self {
        Self { flash, range }
    }

    pub fn range(&self) -> Range<u32> {
        self.range.clone()
    }

    /// Give back the flash
    pub fn release(self) -> F {
        self.flash
    }
}

fn storage_error<E>(e: Error<E>) -> StorageError {
    match e {
        Error::FullStorage => StorageError::Full,
        Error::ItemTooBig => StorageError::RecordTooLarge,
        Error::Corrupted { .. } => StorageError::Corrupted,
        _ => StorageError::Medium,
    }
}

impl<F: NorFlash> RecordLog for QueueLog<F> {
    async fn clear(&mut self) -> Result<(), StorageError> {
        sequential_storage::erase_all(&mut self.flash, self.range.clone())
            .await
            .map_err(storage_error)
    }

    async fn append(&mut self, record: &[u8]) -> Result<(), StorageError> {
        if record.len() > MAX_RECORD_SIZE {
            return Err(StorageError::RecordTooLarge);
        }

        queue::push(
            &mut self.flash,
            self.range.clone(),
            &mut NoCache::new(),
            record,
            true, // overwrite the oldest records when full
        )
        .await
        .map_err(storage_error)
    }

    async fn for_each<V: FnMut(&[u8])>(&mut self, mut visit: V) -> Result<usize, StorageError> {
        let mut cache = NoCache::new();
        let mut records = queue::iter(&mut self.flash, self.range.clone(), &mut cache)
            .await
            .map_err(storage_error)?;

        let mut buffer = [0u8; READ_BUFFER_SIZE];
        let mut count = 0;
        while let Some(entry) = records.next(&mut buffer).await.map_err(storage_error)? {
            visit(&*entry);
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embedded_storage_async::nor_flash::{
        ErrorType, NorFlashError, NorFlashErrorKind, ReadNorFlash,
    };

    const PAGE_SIZE: usize = 4096;
    const PAGES: usize = 4;

    /// NOR flash in RAM: erase sets 0xFF, writes can only clear bits
    struct RamFlash {
        data: Vec<u8>,
    }

    impl RamFlash {
        fn new() -> Self {
            Self {
                data: vec![0xFF; PAGE_SIZE * PAGES],
            }
        }
    }

    #[derive(Debug)]
    enum RamFlashError {
        OutOfBounds,
        NotAligned,
    }

    impl NorFlashError for RamFlashError {
        fn kind(&self) -> NorFlashErrorKind {
            match self {
                RamFlashError::OutOfBounds => NorFlashErrorKind::OutOfBounds,
                RamFlashError::NotAligned => NorFlashErrorKind::NotAligned,
            }
        }
    }

    impl ErrorType for RamFlash {
        type Error = RamFlashError;
    }

    impl ReadNorFlash for RamFlash {
        const READ_SIZE: usize = 1;

        async fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
            let start = offset as usize;
            let end = start + bytes.len();
            if end > self.data.len() {
                return Err(RamFlashError::OutOfBounds);
            }
            bytes.copy_from_slice(&self.data[start..end]);
            Ok(())
        }

        fn capacity(&self) -> usize {
            self.data.len()
        }
    }

    impl NorFlash for RamFlash {
        const WRITE_SIZE: usize = 4;
        const ERASE_SIZE: usize = PAGE_SIZE;

        async fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
            let (from, to) = (from as usize, to as usize);
            if from % PAGE_SIZE != 0 || to % PAGE_SIZE != 0 {
                return Err(RamFlashError::NotAligned);
            }
            if to > self.data.len() || from > to {
                return Err(RamFlashError::OutOfBounds);
            }
            self.data[from..to].fill(0xFF);
            Ok(())
        }

        async fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
            let start = offset as usize;
            if start % Self::WRITE_SIZE != 0 || bytes.len() % Self::WRITE_SIZE != 0 {
                return Err(RamFlashError::NotAligned);
            }
            let end = start + bytes.len();
            if end > self.data.len() {
                return Err(RamFlashError::OutOfBounds);
            }
            for (cell, byte) in self.data[start..end].iter_mut().zip(bytes) {
                *cell &= *byte;
            }
            Ok(())
        }
    }

    fn log() -> QueueLog<RamFlash> {
        QueueLog::new(RamFlash::new(), 0..(PAGE_SIZE * PAGES) as u32)
    }

    fn dump<L: RecordLog>(log: &mut L) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        let count = block_on(log.for_each(|line| lines.push(line.to_vec()))).unwrap();
        assert_eq!(count, lines.len());
        lines
    }

    #[test]
    fn test_empty_log_reads_nothing() {
        let mut log = log();
        assert!(dump(&mut log).is_empty());
    }

    #[test]
    fn test_records_read_back_in_order() {
        let mut log = log();
        block_on(async {
            log.clear().await.unwrap();
            log.append(b"Time,Distance,Unit,Status").await.unwrap();
            log.append(b"00:01,5,cm,OPEN").await.unwrap();
            log.append(b"00:02,1.50,m,CLOSE").await.unwrap();
        });

        assert_eq!(
            dump(&mut log),
            vec![
                b"Time,Distance,Unit,Status".to_vec(),
                b"00:01,5,cm,OPEN".to_vec(),
                b"00:02,1.50,m,CLOSE".to_vec(),
            ]
        );

        // Reading does not consume
        assert_eq!(dump(&mut log).len(), 3);
    }

    #[test]
    fn test_records_survive_power_cycle() {
        let mut log = log();
        block_on(log.append(b"00:07,42,cm,CLOSE")).unwrap();

        let range = log.range();
        let mut reopened = QueueLog::new(log.release(), range);
        assert_eq!(dump(&mut reopened), vec![b"00:07,42,cm,CLOSE".to_vec()]);

        block_on(reopened.clear()).unwrap();
        assert!(dump(&mut reopened).is_empty());
    }

    #[test]
    fn test_oversized_record_rejected() {
        let mut log = log();
        let record = [b'x'; MAX_RECORD_SIZE + 1];
        assert_eq!(
            block_on(log.append(&record)),
            Err(StorageError::RecordTooLarge)
        );
        assert!(dump(&mut log).is_empty());

        let record = [b'x'; MAX_RECORD_SIZE];
        assert_eq!(block_on(log.append(&record)), Ok(()));
        assert_eq!(dump(&mut log), vec![record.to_vec()]);
    }

    #[test]
    fn test_full_log_drops_oldest() {
        let mut log = log();
        let total = 1000;
        block_on(async {
            for i in 0..total {
                let line = format!("{:05},{:02},cm,CLOSE,{:024}", i, i % 100, i);
                log.append(line.as_bytes()).await.unwrap();
            }
        });

        let lines = dump(&mut log);
        assert!(!lines.is_empty());
        assert!(lines.len() < total);

        // Newest record kept, oldest ones gone, order preserved
        let last = format!("{:05},{:02},cm,CLOSE,{:024}", total - 1, (total - 1) % 100, total - 1);
        assert_eq!(lines.last().unwrap(), last.as_bytes());
        assert_ne!(&lines[0][..5], b"00000");
        let indices: Vec<usize> = lines
            .iter()
            .map(|l| core::str::from_utf8(&l[..5]).unwrap().parse().unwrap())
            .collect();
        assert!(indices.windows(2).all(|w| w[1] == w[0] + 1));
    }
}
