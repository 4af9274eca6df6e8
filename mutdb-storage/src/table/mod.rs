pub mod scan;

use crate::error::{Error, Result};
use crate::record::{RID, Record};
use crate::trx::{NativeTrx, ReadView, SharedTrxStatus, TrxID, trx_is_committed};
use mutdb_catalog::{TableID, TableMeta};
use mutdb_datatype::Value;
use parking_lot::RwLock;
use semistr::SemiStr;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub use scan::RecordScanner;

/// Table is a logical data set of fixed-width rows.
///
/// Each row id maps to a version chain ordered from oldest to newest.
/// Every version refers to the status of the transaction which created
/// it, and of the transaction which deleted or replaced it if any.
///
/// 1. Insert creates a chain with one version.
///
/// 2. Update by the creator of the newest version rewrites it in place,
///    otherwise the newest version is marked deleted and a new version
///    is appended. Readers never see a half-written row because the
///    whole buffer is swapped under the write lock.
///
/// 3. Delete marks the newest version deleted.
///
/// 4. Read walks the chain backwards and returns the first version whose
///    creator is visible, unless its deleter is visible too.
///
/// A writer must see the newest version and it must not be deleted by
/// anyone else, otherwise a write conflict is reported.
#[derive(Debug)]
pub struct Table {
    meta: Arc<TableMeta>,
    rows_per_page: usize,
    next_seq: AtomicU64,
    rows: RwLock<BTreeMap<RID, Vec<RowVersion>>>,
}

#[derive(Debug)]
struct RowVersion {
    data: Box<[u8]>,
    creator: Arc<SharedTrxStatus>,
    deleter: Option<Arc<SharedTrxStatus>>,
}

impl RowVersion {
    #[inline]
    fn new(data: Box<[u8]>, creator: Arc<SharedTrxStatus>) -> Self {
        RowVersion {
            data,
            creator,
            deleter: None,
        }
    }

    /// Returns whether the version is owned by the writer.
    #[inline]
    fn check_writable(&self, rid: RID, view: &ReadView) -> Result<bool> {
        let own = view.is_own(&self.creator);
        if !own && !view.sees(&self.creator) {
            return Err(Error::WriteConflict(rid));
        }
        match &self.deleter {
            None => Ok(own),
            Some(deleter) if view.sees(deleter) => Err(Error::RecordNotFound(rid)),
            Some(_) => Err(Error::WriteConflict(rid)),
        }
    }
}

impl Table {
    #[inline]
    pub(crate) fn new(meta: Arc<TableMeta>, rows_per_page: usize) -> Self {
        Table {
            meta,
            rows_per_page,
            next_seq: AtomicU64::new(0),
            rows: RwLock::new(BTreeMap::new()),
        }
    }

    #[inline]
    pub fn meta(&self) -> &Arc<TableMeta> {
        &self.meta
    }

    #[inline]
    pub fn table_id(&self) -> TableID {
        self.meta.table_id()
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.meta.name()
    }

    #[inline]
    pub fn record_size(&self) -> usize {
        self.meta.record_size()
    }

    /// Build row bytes from one value per field.
    /// INT and FLOAT values are coerced to the declared type.
    #[inline]
    pub fn new_row_data(&self, vals: &[Value]) -> Result<Box<[u8]>> {
        if vals.len() != self.meta.field_count() {
            return Err(Error::InvalidArgument("value count not match field count"));
        }
        let mut data = vec![0u8; self.meta.record_size()];
        for (field, val) in self.meta.fields().zip(vals) {
            let val = val
                .cast_to(field.attr_type())
                .map_err(|_| Error::FieldTypeMismatch {
                    field: SemiStr::new(field.name()),
                    expected: field.attr_type(),
                    actual: val.attr_type(),
                })?;
            mutdb_datatype::codec::encode_field(
                field.attr_type(),
                &val,
                &mut data[field.range()],
            )?;
        }
        Ok(data.into_boxed_slice())
    }

    #[inline]
    pub fn insert_record_with_trx(&self, trx: &NativeTrx, data: Box<[u8]>) -> Result<RID> {
        self.check_record_len(data.len())?;
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let rid = RID::from_seq(seq, self.rows_per_page)
            .ok_or(Error::InvalidArgument("row id space exhausted"))?;
        let version = RowVersion::new(data, Arc::clone(trx.status()));
        self.rows.write().insert(rid, vec![version]);
        Ok(rid)
    }

    #[inline]
    pub fn delete_record_with_trx(&self, trx: &NativeTrx, record: &Record) -> Result<()> {
        let rid = record.rid();
        let view = trx.read_view();
        let mut rows = self.rows.write();
        let latest = rows
            .get_mut(&rid)
            .and_then(|chain| chain.last_mut())
            .ok_or(Error::RecordNotFound(rid))?;
        latest.check_writable(rid, &view)?;
        latest.deleter = Some(Arc::clone(trx.status()));
        Ok(())
    }

    /// Replace the row of `old` with bytes of `new` in one step.
    #[inline]
    pub fn update_record_with_trx(&self, trx: &NativeTrx, old: &Record, new: Record) -> Result<()> {
        self.check_record_len(new.len())?;
        let rid = old.rid();
        let view = trx.read_view();
        let mut rows = self.rows.write();
        let chain = rows.get_mut(&rid).ok_or(Error::RecordNotFound(rid))?;
        let latest = chain.last_mut().ok_or(Error::RecordNotFound(rid))?;
        if latest.check_writable(rid, &view)? {
            latest.data = new.into_data();
        } else {
            latest.deleter = Some(Arc::clone(trx.status()));
            chain.push(RowVersion::new(new.into_data(), Arc::clone(trx.status())));
        }
        Ok(())
    }

    /// Undo all changes of given transaction on one row.
    #[inline]
    pub fn rollback_row(&self, rid: RID, status: &Arc<SharedTrxStatus>) {
        let mut rows = self.rows.write();
        let Some(chain) = rows.get_mut(&rid) else {
            return;
        };
        chain.retain(|v| !Arc::ptr_eq(&v.creator, status));
        for v in chain.iter_mut() {
            if v.deleter.as_ref().is_some_and(|d| Arc::ptr_eq(d, status)) {
                v.deleter = None;
            }
        }
        if chain.is_empty() {
            rows.remove(&rid);
        }
    }

    /// Remove versions of one row which no snapshot at or after
    /// `min_active_sts` can read, and return how many were removed.
    ///
    /// Readers stop at the newest version they see, so everything older
    /// than the newest globally visible version is obsolete. A row whose
    /// deletion is globally visible is removed entirely.
    #[inline]
    pub fn purge_row(&self, rid: RID, min_active_sts: TrxID) -> usize {
        let globally_visible = |status: &Arc<SharedTrxStatus>| {
            let ts = status.ts();
            trx_is_committed(ts) && ts < min_active_sts
        };
        let mut rows = self.rows.write();
        let Some(chain) = rows.get_mut(&rid) else {
            return 0;
        };
        let count = chain.len();
        if let Some(idx) = chain.iter().rposition(|v| globally_visible(&v.creator)) {
            chain.drain(..idx);
        }
        let deleted = chain.len() == 1
            && globally_visible(&chain[0].creator)
            && chain[0].deleter.as_ref().is_some_and(globally_visible);
        if deleted {
            rows.remove(&rid);
            return count;
        }
        count - chain.len()
    }

    #[cfg(test)]
    pub(crate) fn version_count(&self, rid: RID) -> usize {
        self.rows.read().get(&rid).map(|chain| chain.len()).unwrap_or(0)
    }

    /// Returns first visible record after given row id, or from the
    /// beginning if no row id is given.
    #[inline]
    pub fn next_visible(&self, view: &ReadView, after: Option<RID>) -> Option<Record> {
        let rows = self.rows.read();
        let mut range = match after {
            Some(rid) => rows.range((Bound::Excluded(rid), Bound::Unbounded)),
            None => rows.range(..),
        };
        range.find_map(|(rid, chain)| {
            visible_version(chain, view).map(|data| Record::new(*rid, Box::from(data)))
        })
    }

    #[inline]
    pub fn get_record(&self, view: &ReadView, rid: RID) -> Option<Record> {
        let rows = self.rows.read();
        let chain = rows.get(&rid)?;
        visible_version(chain, view).map(|data| Record::new(rid, Box::from(data)))
    }

    #[inline]
    fn check_record_len(&self, len: usize) -> Result<()> {
        if len != self.meta.record_size() {
            return Err(Error::InvalidRecordLength {
                expected: self.meta.record_size(),
                actual: len,
            });
        }
        Ok(())
    }
}

#[inline]
fn visible_version<'a>(chain: &'a [RowVersion], view: &ReadView) -> Option<&'a [u8]> {
    let v = chain.iter().rev().find(|v| view.sees(&v.creator))?;
    match &v.deleter {
        Some(deleter) if view.sees(deleter) => None,
        _ => Some(&v.data),
    }
}
