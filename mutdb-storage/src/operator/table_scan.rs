use crate::error::{Error, Result};
use crate::expr::{RowTuple, Tuple};
use crate::operator::Operator;
use crate::table::{RecordScanner, Table};
use crate::trx::Trx;
use crate::trx::lock::ReadWriteMode;
use std::sync::Arc;

/// Leaf operator producing every visible row of a table as a row tuple.
pub struct TableScanOperator<'a> {
    table: Arc<Table>,
    mode: ReadWriteMode,
    scanner: Option<RecordScanner<'a>>,
    tuple: Option<Tuple<'static>>,
}

impl TableScanOperator<'_> {
    #[inline]
    pub fn new(table: Arc<Table>, mode: ReadWriteMode) -> Self {
        TableScanOperator {
            table,
            mode,
            scanner: None,
            tuple: None,
        }
    }

    #[inline]
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }
}

impl<'a> Operator<'a> for TableScanOperator<'a> {
    #[inline]
    fn open(&mut self, trx: &'a Trx) -> Result<()> {
        let mut scanner = RecordScanner::new(Arc::clone(&self.table), trx, self.mode);
        scanner.open()?;
        self.scanner = Some(scanner);
        Ok(())
    }

    #[inline]
    fn next(&mut self) -> Result<bool> {
        let scanner = self
            .scanner
            .as_mut()
            .ok_or(Error::Internal("table scan is not opened"))?;
        match scanner.next()? {
            Some(record) => {
                let row = RowTuple::new(Arc::clone(self.table.meta()), record);
                self.tuple = Some(Tuple::Row(row));
                Ok(true)
            }
            None => {
                self.tuple = None;
                Ok(false)
            }
        }
    }

    #[inline]
    fn close(&mut self) -> Result<()> {
        if let Some(mut scanner) = self.scanner.take() {
            scanner.close();
        }
        self.tuple = None;
        Ok(())
    }

    #[inline]
    fn current_tuple(&self) -> Option<&Tuple<'_>> {
        self.tuple.as_ref()
    }
}
