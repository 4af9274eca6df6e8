use crate::error::{Error, Result};
use crate::record::PageNum;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Access mode of a page within one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadWriteMode {
    ReadOnly,
    ReadWrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockInfo {
    pub mode: ReadWriteMode,
}

/// IntraTrxLockTable tracks the mode in which one transaction accessed
/// each page.
///
/// It only reconciles repeated accesses of the same transaction.
/// Isolation between transactions is provided by row versions, lock
/// tables of different transactions never interact.
#[derive(Debug, Default)]
pub struct IntraTrxLockTable {
    locks: Mutex<HashMap<PageNum, LockInfo>>,
}

impl IntraTrxLockTable {
    /// Check requested mode against the held one.
    ///
    /// Missing entry is not created. An existing entry is switched
    /// to the requested mode, both upgrade and downgrade are allowed.
    #[inline]
    pub fn check(&self, page_num: PageNum, mode: ReadWriteMode) -> Result<()> {
        let mut g = self.locks.lock();
        let Some(info) = g.get_mut(&page_num) else {
            return Ok(());
        };
        match (info.mode, mode) {
            (held, requested) if held == requested => Ok(()),
            (ReadWriteMode::ReadOnly, ReadWriteMode::ReadWrite)
            | (ReadWriteMode::ReadWrite, ReadWriteMode::ReadOnly) => {
                log::trace!(
                    "switch intra-trx lock of page {} from {:?} to {:?}",
                    page_num,
                    info.mode,
                    mode
                );
                info.mode = mode;
                Ok(())
            }
            _ => Err(Error::LockConflict(page_num)),
        }
    }

    /// Record an access. Recording only upgrades, never downgrades.
    #[inline]
    pub fn record(&self, page_num: PageNum, mode: ReadWriteMode) {
        let mut g = self.locks.lock();
        let info = g.entry(page_num).or_insert(LockInfo { mode });
        if mode == ReadWriteMode::ReadWrite && info.mode != ReadWriteMode::ReadWrite {
            log::trace!("upgrade intra-trx lock of page {} to {:?}", page_num, mode);
            info.mode = ReadWriteMode::ReadWrite;
        }
    }

    #[inline]
    pub fn mode_of(&self, page_num: PageNum) -> Option<ReadWriteMode> {
        self.locks.lock().get(&page_num).map(|info| info.mode)
    }

    #[inline]
    pub fn clear(&self) {
        self.locks.lock().clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReadWriteMode::*;

    #[test]
    fn test_check_without_entry() {
        let locks = IntraTrxLockTable::default();
        locks.check(1, ReadOnly).unwrap();
        locks.check(1, ReadWrite).unwrap();
        assert!(locks.is_empty());
        assert_eq!(locks.mode_of(1), None);
    }

    #[test]
    fn test_check_transitions() {
        let cases = [
            (ReadOnly, ReadOnly, ReadOnly),
            (ReadOnly, ReadWrite, ReadWrite),
            (ReadWrite, ReadWrite, ReadWrite),
            (ReadWrite, ReadOnly, ReadOnly),
        ];
        for (held, requested, after) in cases {
            let locks = IntraTrxLockTable::default();
            locks.record(7, held);
            assert_eq!(locks.mode_of(7), Some(held));
            locks.check(7, requested).unwrap();
            assert_eq!(locks.mode_of(7), Some(after));
            assert_eq!(locks.len(), 1);
        }
    }

    #[test]
    fn test_record_never_downgrades() {
        let locks = IntraTrxLockTable::default();
        locks.record(3, ReadOnly);
        assert_eq!(locks.mode_of(3), Some(ReadOnly));
        locks.record(3, ReadOnly);
        assert_eq!(locks.mode_of(3), Some(ReadOnly));
        locks.record(3, ReadWrite);
        assert_eq!(locks.mode_of(3), Some(ReadWrite));
        locks.record(3, ReadOnly);
        assert_eq!(locks.mode_of(3), Some(ReadWrite));

        locks.record(4, ReadWrite);
        assert_eq!(locks.len(), 2);
        locks.clear();
        assert!(locks.is_empty());
    }
}
