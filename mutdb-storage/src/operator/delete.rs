use crate::error::{Error, Result};
use crate::expr::Tuple;
use crate::operator::{Operator, PhysicalOperator};
use crate::table::Table;
use crate::trx::Trx;
use std::sync::Arc;

/// DeleteOperator deletes every row produced by its child, one at a
/// time as encountered.
pub struct DeleteOperator<'a> {
    table: Arc<Table>,
    children: Vec<PhysicalOperator<'a>>,
    trx: Option<&'a Trx>,
    affected_rows: usize,
}

impl<'a> DeleteOperator<'a> {
    #[inline]
    pub fn new(table: Arc<Table>) -> Self {
        DeleteOperator {
            table,
            children: vec![],
            trx: None,
            affected_rows: 0,
        }
    }

    #[inline]
    pub fn add_child(&mut self, child: PhysicalOperator<'a>) {
        self.children.push(child);
    }

    #[inline]
    pub fn affected_rows(&self) -> usize {
        self.affected_rows
    }
}

impl<'a> Operator<'a> for DeleteOperator<'a> {
    #[inline]
    fn open(&mut self, trx: &'a Trx) -> Result<()> {
        if self.children.len() != 1 {
            log::warn!(
                "delete operator must have one child, but got {}",
                self.children.len()
            );
            return Err(Error::Internal("delete operator must have one child"));
        }
        self.affected_rows = 0;
        self.children[0].open(trx)?;
        self.trx = Some(trx);
        Ok(())
    }

    #[inline]
    fn next(&mut self) -> Result<bool> {
        let trx = self
            .trx
            .ok_or(Error::Internal("delete operator is not opened"))?;
        let child = &mut self.children[0];
        while child.next()? {
            let record = child
                .current_tuple()
                .and_then(Tuple::record)
                .ok_or(Error::Internal("delete expects row tuple"))?;
            trx.delete_record(&self.table, record)
                .inspect_err(|e| log::warn!("failed to delete row {}: {}", record.rid(), e))?;
            self.affected_rows += 1;
        }
        Ok(false)
    }

    #[inline]
    fn close(&mut self) -> Result<()> {
        self.trx = None;
        match self.children.first_mut() {
            Some(child) => child.close(),
            None => Ok(()),
        }
    }

    #[inline]
    fn current_tuple(&self) -> Option<&Tuple<'_>> {
        None
    }
}
