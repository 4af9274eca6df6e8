//! MutDB's concurrency control is MVCC with per-row version chains.
//!
//! The basic MVCC logic is described as below.
//! 1. When starting a native transaction, a snapshot timestamp(STS) is generated, and
//!    transaction id is derived from STS by setting highest bit to 1.
//! 2. Every row version refers to the shared status of the transaction that created it,
//!    and optionally of the transaction that deleted it. The status holds the
//!    transaction id while the transaction is active.
//! 3. When the transaction commits, a commit timestamp(CTS) is stored in the shared status,
//!    so all versions of this transaction switch to CTS at once.
//! 4. A reader sees a version if its creator is the reader itself, or committed with
//!    CTS less than the reader's STS. As active ids are always greater than any STS,
//!    the check is simplified to "STS is larger".
//!
//! On top of the native transaction, `Trx` is the handle the executor mutates through.
//! It starts the native transaction lazily on first write and keeps an intra-transaction
//! lock table per page.
pub mod lock;
pub mod purge;
pub mod sys;

use crate::error::Result;
use crate::record::{PageNum, RID, Record};
use crate::table::Table;
use crate::trx::lock::{IntraTrxLockTable, ReadWriteMode};
use crate::trx::purge::SnapshotPin;
use crate::trx::sys::TransactionSystem;
use parking_lot::Mutex;
use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub type TrxID = u64;
pub const MIN_SNAPSHOT_TS: TrxID = 1;
pub const MAX_SNAPSHOT_TS: TrxID = 1 << 63;
// data inserted outside any transaction is treated as committed at 0.
pub const GLOBAL_VISIBLE_COMMIT_TS: TrxID = 0;
pub const MIN_ACTIVE_TRX_ID: TrxID = (1 << 63) + 1;

/// Returns whether the transaction is committed.
#[inline]
pub fn trx_is_committed(ts: TrxID) -> bool {
    ts < MIN_ACTIVE_TRX_ID
}

#[derive(Debug)]
pub struct SharedTrxStatus {
    ts: AtomicU64,
}

impl SharedTrxStatus {
    /// Create a new shared transaction status for given transaction id.
    #[inline]
    pub fn new(trx_id: TrxID) -> Self {
        SharedTrxStatus {
            ts: AtomicU64::new(trx_id),
        }
    }

    /// Create a new transaction status that is globally visible for all
    /// transactions.
    #[inline]
    pub fn global_visible() -> Self {
        SharedTrxStatus::new(GLOBAL_VISIBLE_COMMIT_TS)
    }

    /// Returns transaction id if active, or commit timestamp if committed.
    #[inline]
    pub fn ts(&self) -> TrxID {
        self.ts.load(Ordering::Acquire)
    }

    #[inline]
    fn set_ts(&self, ts: TrxID) {
        self.ts.store(ts, Ordering::Release);
    }
}

/// Snapshot used to decide version visibility.
#[derive(Debug, Clone)]
pub struct ReadView {
    sts: TrxID,
    status: Option<Arc<SharedTrxStatus>>,
    // keeps the snapshot registered for purge if not owned by a native transaction.
    pin: Option<Arc<SnapshotPin>>,
}

impl ReadView {
    #[inline]
    pub fn new(sts: TrxID, status: Option<Arc<SharedTrxStatus>>) -> Self {
        ReadView {
            sts,
            status,
            pin: None,
        }
    }

    #[inline]
    pub(crate) fn pinned(sts: TrxID, pin: SnapshotPin) -> Self {
        ReadView {
            sts,
            status: None,
            pin: Some(Arc::new(pin)),
        }
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin.is_some()
    }

    #[inline]
    pub fn sts(&self) -> TrxID {
        self.sts
    }

    /// Returns whether changes of the given transaction are visible.
    #[inline]
    pub fn sees(&self, status: &Arc<SharedTrxStatus>) -> bool {
        if self.is_own(status) {
            return true;
        }
        let ts = status.ts();
        trx_is_committed(ts) && ts < self.sts
    }

    /// Returns whether the status belongs to the reader itself.
    #[inline]
    pub fn is_own(&self, status: &Arc<SharedTrxStatus>) -> bool {
        self.status
            .as_ref()
            .map(|s| Arc::ptr_eq(s, status))
            .unwrap_or(false)
    }
}

/// Native transaction of the MVCC engine.
pub struct NativeTrx {
    // Every row version created or deleted by this transaction
    // refers to this object, so commit is a single store.
    status: Arc<SharedTrxStatus>,
    sts: TrxID,
    // rows to restore on rollback.
    touched: Mutex<Vec<(Arc<Table>, RID)>>,
}

impl NativeTrx {
    #[inline]
    fn new(trx_id: TrxID, sts: TrxID) -> Self {
        NativeTrx {
            status: Arc::new(SharedTrxStatus::new(trx_id)),
            sts,
            touched: Mutex::new(vec![]),
        }
    }

    #[inline]
    pub fn sts(&self) -> TrxID {
        self.sts
    }

    #[inline]
    pub fn status(&self) -> &Arc<SharedTrxStatus> {
        &self.status
    }

    #[inline]
    pub fn read_view(&self) -> ReadView {
        ReadView::new(self.sts, Some(Arc::clone(&self.status)))
    }

    #[inline]
    fn touch(&self, table: &Arc<Table>, rid: RID) {
        self.touched.lock().push((Arc::clone(table), rid));
    }

    #[inline]
    fn take_touched(&self) -> Vec<(Arc<Table>, RID)> {
        mem::take(&mut *self.touched.lock())
    }
}

/// Trx is the transaction handle statements mutate through.
///
/// It owns at most one native transaction, created on first write,
/// and the intra-transaction lock table of its pages.
pub struct Trx {
    sys: Arc<TransactionSystem>,
    native: Mutex<Option<Arc<NativeTrx>>>,
    locks: IntraTrxLockTable,
}

impl Trx {
    #[inline]
    pub(crate) fn new(sys: Arc<TransactionSystem>) -> Self {
        Trx {
            sys,
            native: Mutex::new(None),
            locks: IntraTrxLockTable::default(),
        }
    }

    /// Start native transaction if not started. Repeated calls
    /// return the same native transaction.
    #[inline]
    pub fn start_if_need(&self) -> Arc<NativeTrx> {
        let mut g = self.native.lock();
        let native = g.get_or_insert_with(|| Arc::new(self.sys.begin_transaction()));
        Arc::clone(native)
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.native.lock().is_some()
    }

    /// Returns the read view of this transaction.
    /// Before first write, it is the latest committed view.
    #[inline]
    pub fn read_view(&self) -> ReadView {
        match self.native.lock().as_ref() {
            Some(native) => native.read_view(),
            None => self.sys.latest_view(),
        }
    }

    #[inline]
    pub fn insert_record(&self, table: &Arc<Table>, data: Box<[u8]>) -> Result<RID> {
        let native = self.start_if_need();
        let rid = table.insert_record_with_trx(&native, data)?;
        native.touch(table, rid);
        self.record_intra_transaction_lock(rid.page_num, ReadWriteMode::ReadWrite);
        Ok(rid)
    }

    #[inline]
    pub fn delete_record(&self, table: &Arc<Table>, record: &Record) -> Result<()> {
        let native = self.start_if_need();
        table.delete_record_with_trx(&native, record)?;
        native.touch(table, record.rid());
        self.record_intra_transaction_lock(record.rid().page_num, ReadWriteMode::ReadWrite);
        Ok(())
    }

    /// Atomically replace the row identified by `old` with bytes of `new`.
    #[inline]
    pub fn update_record(&self, table: &Arc<Table>, old: &Record, new: Record) -> Result<()> {
        let native = self.start_if_need();
        let rid = old.rid();
        table.update_record_with_trx(&native, old, new)?;
        native.touch(table, rid);
        self.record_intra_transaction_lock(rid.page_num, ReadWriteMode::ReadWrite);
        Ok(())
    }

    /// Visit a row through an index-driven access path.
    /// Version chains already isolate transactions, no local lock is taken.
    #[inline]
    pub fn visit_record(
        &self,
        _table: &Arc<Table>,
        _record: &Record,
        _mode: ReadWriteMode,
    ) -> Result<()> {
        Ok(())
    }

    /// Commit the native transaction. No-op if it was never started.
    #[inline]
    pub fn commit(&self) -> Result<()> {
        if let Some(native) = self.native.lock().take() {
            self.sys.commit(&native);
        }
        self.locks.clear();
        Ok(())
    }

    /// Rollback the native transaction. No-op if it was never started.
    #[inline]
    pub fn rollback(&self) -> Result<()> {
        if let Some(native) = self.native.lock().take() {
            self.sys.rollback(&native);
        }
        self.locks.clear();
        Ok(())
    }

    #[inline]
    pub fn check_intra_transaction_lock(
        &self,
        page_num: PageNum,
        mode: ReadWriteMode,
    ) -> Result<()> {
        self.locks.check(page_num, mode)
    }

    #[inline]
    pub fn record_intra_transaction_lock(&self, page_num: PageNum, mode: ReadWriteMode) {
        self.locks.record(page_num, mode)
    }

    #[inline]
    pub fn lock_mode_of(&self, page_num: PageNum) -> Option<ReadWriteMode> {
        self.locks.mode_of(page_num)
    }
}

impl Drop for Trx {
    #[inline]
    fn drop(&mut self) {
        if let Some(native) = self.native.get_mut().take() {
            log::debug!("rollback unfinished trx with sts={} on drop", native.sts);
            self.sys.rollback(&native);
        }
    }
}
