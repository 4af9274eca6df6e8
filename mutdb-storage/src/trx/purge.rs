use crate::trx::TrxID;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;

/// ActiveStsList maintains snapshot timestamps still in use, with the
/// number of readers holding each of them.
/// It is used to calculate min_active_sts for garbage collection.
#[derive(Debug, Default)]
pub(crate) struct ActiveStsList {
    active: BTreeMap<TrxID, usize>,
}

impl ActiveStsList {
    #[inline]
    pub fn insert(&mut self, sts: TrxID) {
        *self.active.entry(sts).or_insert(0) += 1;
    }

    #[inline]
    pub fn remove(&mut self, sts: TrxID) {
        if let Entry::Occupied(mut ent) = self.active.entry(sts) {
            *ent.get_mut() -= 1;
            if *ent.get() == 0 {
                ent.remove();
            }
        }
    }

    /// Returns the smallest snapshot timestamp in use.
    #[inline]
    pub fn min(&self) -> Option<TrxID> {
        self.active.keys().next().copied()
    }

    /// Returns number of readers registered.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.active.values().sum()
    }
}

/// Registration of a snapshot which is not owned by a native transaction.
/// The snapshot is released on drop.
#[derive(Debug)]
pub struct SnapshotPin {
    list: Arc<Mutex<ActiveStsList>>,
    sts: TrxID,
}

impl SnapshotPin {
    /// Register the snapshot timestamp. Caller must hold the list lock
    /// while reading the timestamp, so minimum calculation never misses it.
    #[inline]
    pub(crate) fn new(list: Arc<Mutex<ActiveStsList>>, active: &mut ActiveStsList, sts: TrxID) -> Self {
        active.insert(sts);
        SnapshotPin { list, sts }
    }
}

impl Drop for SnapshotPin {
    #[inline]
    fn drop(&mut self) {
        self.list.lock().remove(self.sts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_sts_list() {
        let mut list = ActiveStsList::default();
        assert_eq!(list.min(), None);
        list.insert(5);
        list.insert(3);
        list.insert(3);
        assert_eq!(list.min(), Some(3));
        assert_eq!(list.len(), 3);
        list.remove(3);
        assert_eq!(list.min(), Some(3));
        list.remove(3);
        assert_eq!(list.min(), Some(5));
        // unknown timestamp is ignored.
        list.remove(7);
        list.remove(5);
        assert_eq!(list.min(), None);
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_snapshot_pin_release() {
        let list = Arc::new(Mutex::new(ActiveStsList::default()));
        let pin = {
            let mut g = list.lock();
            SnapshotPin::new(Arc::clone(&list), &mut g, 4)
        };
        assert_eq!(list.lock().min(), Some(4));
        drop(pin);
        assert_eq!(list.lock().min(), None);
    }
}
