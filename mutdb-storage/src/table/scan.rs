use crate::error::{Error, Result};
use crate::record::{PageNum, RID, Record};
use crate::table::Table;
use crate::trx::lock::ReadWriteMode;
use crate::trx::{ReadView, Trx};
use std::sync::Arc;

/// RecordScanner is a forward-only cursor over rows visible to one
/// transaction.
///
/// The cursor is positioned by row id, so a row replaced during the scan
/// is never visited twice. The scanner is closed on drop if the consumer
/// returns early.
pub struct RecordScanner<'a> {
    table: Arc<Table>,
    trx: &'a Trx,
    mode: ReadWriteMode,
    view: Option<ReadView>,
    cursor: Option<RID>,
    page_num: Option<PageNum>,
}

impl<'a> RecordScanner<'a> {
    #[inline]
    pub fn new(table: Arc<Table>, trx: &'a Trx, mode: ReadWriteMode) -> Self {
        RecordScanner {
            table,
            trx,
            mode,
            view: None,
            cursor: None,
            page_num: None,
        }
    }

    /// Open the scanner. Write intent starts the native transaction, so
    /// the scan sees the transaction's own changes.
    #[inline]
    pub fn open(&mut self) -> Result<()> {
        if self.mode == ReadWriteMode::ReadWrite {
            self.trx.start_if_need();
        }
        self.view = Some(self.trx.read_view());
        self.cursor = None;
        self.page_num = None;
        Ok(())
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.view.is_some()
    }

    #[inline]
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Returns next visible row, or None at end of scan.
    #[inline]
    pub fn next(&mut self) -> Result<Option<Record>> {
        let view = self
            .view
            .as_ref()
            .ok_or(Error::Internal("scanner is not opened"))?;
        let Some(record) = self.table.next_visible(view, self.cursor) else {
            return Ok(None);
        };
        let rid = record.rid();
        self.cursor = Some(rid);
        if self.page_num != Some(rid.page_num) {
            self.page_num = Some(rid.page_num);
            self.trx
                .check_intra_transaction_lock(rid.page_num, self.mode)?;
        }
        self.trx.visit_record(&self.table, &record, self.mode)?;
        Ok(Some(record))
    }

    /// Release the cursor. Closing twice is harmless.
    #[inline]
    pub fn close(&mut self) {
        if self.view.take().is_some() {
            log::trace!(
                "close scanner of table {}, last row {:?}",
                self.table.name(),
                self.cursor
            );
        }
    }
}

impl Drop for RecordScanner<'_> {
    #[inline]
    fn drop(&mut self) {
        self.close();
    }
}
