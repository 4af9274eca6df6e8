//! Volcano-style operators.
//!
//! Every operator follows `Closed -> Opened -> (Producing)* -> Closed`.
//! `open` binds the operator to a transaction, `next` advances and
//! returns false on exhaustion, `close` releases resources and must be
//! called even if `open` or `next` failed.
pub mod delete;
pub mod logical;
pub mod predicate;
pub mod table_scan;
pub mod update;

use crate::error::Result;
use crate::expr::Tuple;
use crate::trx::Trx;

pub use delete::DeleteOperator;
pub use logical::{LogicalOperator, LogicalPlanGenerator, PhysicalPlanGenerator};
pub use predicate::PredicateOperator;
pub use table_scan::TableScanOperator;
pub use update::UpdateOperator;

pub trait Operator<'a> {
    fn open(&mut self, trx: &'a Trx) -> Result<()>;

    fn next(&mut self) -> Result<bool>;

    fn close(&mut self) -> Result<()>;

    /// Tuple produced by last successful `next`.
    fn current_tuple(&self) -> Option<&Tuple<'_>>;
}

pub enum PhysicalOperator<'a> {
    TableScan(TableScanOperator<'a>),
    Predicate(PredicateOperator<'a>),
    Update(UpdateOperator<'a>),
    Delete(DeleteOperator<'a>),
}

impl PhysicalOperator<'_> {
    /// Rows changed so far by a mutation operator.
    #[inline]
    pub fn affected_rows(&self) -> usize {
        match self {
            PhysicalOperator::Update(op) => op.affected_rows(),
            PhysicalOperator::Delete(op) => op.affected_rows(),
            PhysicalOperator::TableScan(_) | PhysicalOperator::Predicate(_) => 0,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            PhysicalOperator::TableScan(_) => "TableScan",
            PhysicalOperator::Predicate(_) => "Predicate",
            PhysicalOperator::Update(_) => "Update",
            PhysicalOperator::Delete(_) => "Delete",
        }
    }
}

impl<'a> Operator<'a> for PhysicalOperator<'a> {
    #[inline]
    fn open(&mut self, trx: &'a Trx) -> Result<()> {
        match self {
            PhysicalOperator::TableScan(op) => op.open(trx),
            PhysicalOperator::Predicate(op) => op.open(trx),
            PhysicalOperator::Update(op) => op.open(trx),
            PhysicalOperator::Delete(op) => op.open(trx),
        }
    }

    #[inline]
    fn next(&mut self) -> Result<bool> {
        match self {
            PhysicalOperator::TableScan(op) => op.next(),
            PhysicalOperator::Predicate(op) => op.next(),
            PhysicalOperator::Update(op) => op.next(),
            PhysicalOperator::Delete(op) => op.next(),
        }
    }

    #[inline]
    fn close(&mut self) -> Result<()> {
        match self {
            PhysicalOperator::TableScan(op) => op.close(),
            PhysicalOperator::Predicate(op) => op.close(),
            PhysicalOperator::Update(op) => op.close(),
            PhysicalOperator::Delete(op) => op.close(),
        }
    }

    #[inline]
    fn current_tuple(&self) -> Option<&Tuple<'_>> {
        match self {
            PhysicalOperator::TableScan(op) => op.current_tuple(),
            PhysicalOperator::Predicate(op) => op.current_tuple(),
            PhysicalOperator::Update(op) => op.current_tuple(),
            PhysicalOperator::Delete(op) => op.current_tuple(),
        }
    }
}
