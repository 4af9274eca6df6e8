use crate::trx::purge::{ActiveStsList, SnapshotPin};
use crate::trx::{
    MAX_SNAPSHOT_TS, MIN_SNAPSHOT_TS, NativeTrx, ReadView, SharedTrxStatus, Trx, TrxID,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// TransactionSystem controls lifecycle of all native transactions.
///
/// 1. Transaction begin: read current timestamp as STS, derive the
///    transaction id by setting highest bit of STS.
/// 2. Transaction commit: generate CTS and backfill it into the shared
///    status, so every version created or deleted by the transaction
///    becomes visible to snapshots taken afterwards at once.
/// 3. Transaction rollback: restore every row the transaction touched.
/// 4. Purge: after commit, versions of the touched rows which no active
///    snapshot can read any more are removed.
///
/// Begin and commit are serialized on a commit lock, so a snapshot never
/// observes a CTS which is not yet backfilled.
pub struct TransactionSystem {
    /// A sequence to generate snapshot timestamp and commit timestamp.
    /// They share the same sequence and start from 1.
    ts: AtomicU64,
    commit_lock: Mutex<()>,
    /// Snapshot timestamps of active transactions and pinned read views.
    active_sts: Arc<Mutex<ActiveStsList>>,
}

impl TransactionSystem {
    #[inline]
    pub fn new() -> Self {
        TransactionSystem {
            ts: AtomicU64::new(MIN_SNAPSHOT_TS),
            commit_lock: Mutex::new(()),
            active_sts: Arc::new(Mutex::new(ActiveStsList::default())),
        }
    }

    /// Start a native transaction.
    #[inline]
    pub fn begin_transaction(&self) -> NativeTrx {
        let _g = self.commit_lock.lock();
        let mut active = self.active_sts.lock();
        let sts = self.ts.load(Ordering::Acquire);
        active.insert(sts);
        let trx_id = sts | MAX_SNAPSHOT_TS;
        log::debug!("begin trx {:#x}, sts={}", trx_id, sts);
        NativeTrx::new(trx_id, sts)
    }

    /// Commit a native transaction and return its commit timestamp.
    #[inline]
    pub fn commit(&self, trx: &NativeTrx) -> TrxID {
        let cts = {
            let _g = self.commit_lock.lock();
            let cts = self.ts.fetch_add(1, Ordering::AcqRel);
            trx.status.set_ts(cts);
            cts
        };
        self.active_sts.lock().remove(trx.sts);
        let touched = trx.take_touched();
        let min_active_sts = self.min_active_sts();
        let mut purged = 0;
        for (table, rid) in &touched {
            purged += table.purge_row(*rid, min_active_sts);
        }
        log::debug!(
            "commit trx with sts={}, cts={}, rows={}, purged versions={}",
            trx.sts,
            cts,
            touched.len(),
            purged
        );
        cts
    }

    /// Rollback a native transaction.
    #[inline]
    pub fn rollback(&self, trx: &NativeTrx) {
        let touched = trx.take_touched();
        log::debug!("rollback trx with sts={}, rows={}", trx.sts, touched.len());
        for (table, rid) in touched {
            table.rollback_row(rid, &trx.status);
        }
        self.active_sts.lock().remove(trx.sts);
    }

    /// Returns the smallest snapshot timestamp any reader may still use.
    /// A version committed before it is visible to every reader.
    #[inline]
    pub fn min_active_sts(&self) -> TrxID {
        let active = self.active_sts.lock();
        active
            .min()
            .unwrap_or_else(|| self.ts.load(Ordering::Acquire))
    }

    /// Read view of a reader without native transaction.
    /// It sees everything committed so far, and keeps the versions it
    /// sees from purge until dropped.
    #[inline]
    pub fn latest_view(&self) -> ReadView {
        let _g = self.commit_lock.lock();
        let mut active = self.active_sts.lock();
        let sts = self.ts.load(Ordering::Acquire);
        let pin = SnapshotPin::new(Arc::clone(&self.active_sts), &mut active, sts);
        ReadView::pinned(sts, pin)
    }

    /// Status of data which is visible to every transaction.
    #[inline]
    pub fn global_visible_status(&self) -> Arc<SharedTrxStatus> {
        Arc::new(SharedTrxStatus::global_visible())
    }
}

impl Default for TransactionSystem {
    #[inline]
    fn default() -> Self {
        TransactionSystem::new()
    }
}

/// TrxKit creates transaction handles bound to one transaction system.
/// Dropping the handle destroys it.
pub trait TrxKit {
    fn create_trx(&self) -> Trx;
}

impl TrxKit for Arc<TransactionSystem> {
    #[inline]
    fn create_trx(&self) -> Trx {
        Trx::new(Arc::clone(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trx::{MIN_ACTIVE_TRX_ID, trx_is_committed};

    #[test]
    fn test_trx_sys_timestamps() {
        let sys = TransactionSystem::new();
        let t1 = sys.begin_transaction();
        assert_eq!(t1.sts(), MIN_SNAPSHOT_TS);
        assert!(t1.status().ts() >= MIN_ACTIVE_TRX_ID);
        assert!(!trx_is_committed(t1.status().ts()));

        let t2 = sys.begin_transaction();
        let cts = sys.commit(&t1);
        assert_eq!(cts, MIN_SNAPSHOT_TS);
        assert!(trx_is_committed(t1.status().ts()));

        // snapshot taken before commit does not see it.
        assert!(!t2.read_view().sees(t1.status()));
        // snapshot taken after commit does.
        let t3 = sys.begin_transaction();
        assert!(t3.read_view().sees(t1.status()));
        assert!(sys.latest_view().sees(t1.status()));
        // own changes are always visible.
        assert!(t2.read_view().sees(t2.status()));
        assert!(!t3.read_view().sees(t2.status()));
        assert!(t3.read_view().sees(&sys.global_visible_status()));
    }

    #[test]
    fn test_trx_sys_min_active_sts() {
        let sys = TransactionSystem::new();
        assert_eq!(sys.min_active_sts(), MIN_SNAPSHOT_TS);
        let t1 = sys.begin_transaction();
        let t2 = sys.begin_transaction();
        sys.commit(&t2);
        // t1 still holds the oldest snapshot.
        assert_eq!(sys.min_active_sts(), t1.sts());
        let view = sys.latest_view();
        sys.rollback(&t1);
        assert_eq!(sys.min_active_sts(), view.sts());
        let t3 = sys.begin_transaction();
        sys.commit(&t3);
        assert_eq!(sys.min_active_sts(), view.sts());
        drop(view);
        assert_eq!(sys.min_active_sts(), sys.latest_view().sts());
        assert_eq!(sys.active_sts.lock().len(), 0);
    }
}
