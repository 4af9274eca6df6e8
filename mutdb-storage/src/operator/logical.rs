use crate::error::{Error, Result};
use crate::filter::CompositeConditionFilter;
use crate::operator::{
    DeleteOperator, PhysicalOperator, PredicateOperator, TableScanOperator, UpdateOperator,
};
use crate::stmt::{Stmt, UpdateTarget};
use crate::table::Table;
use crate::trx::lock::ReadWriteMode;
use std::sync::Arc;

/// Logical plan of a mutation statement.
pub enum LogicalOperator {
    TableGet {
        table: Arc<Table>,
        mode: ReadWriteMode,
    },
    Predicate {
        filter: CompositeConditionFilter,
        child: Box<LogicalOperator>,
    },
    Update {
        table: Arc<Table>,
        targets: Vec<UpdateTarget>,
        children: Vec<LogicalOperator>,
    },
    Delete {
        table: Arc<Table>,
        children: Vec<LogicalOperator>,
    },
}

/// Builds `TableGet -> [Predicate] -> Update|Delete` from a bound statement.
pub struct LogicalPlanGenerator;

impl LogicalPlanGenerator {
    #[inline]
    pub fn create(stmt: Stmt) -> Result<LogicalOperator> {
        match stmt {
            Stmt::Update(stmt) => {
                let (table, targets, filter) = stmt.into_parts();
                let child = Self::scan(Arc::clone(&table), filter);
                Ok(LogicalOperator::Update {
                    table,
                    targets,
                    children: vec![child],
                })
            }
            Stmt::Delete(stmt) => {
                let (table, filter) = stmt.into_parts();
                let child = Self::scan(Arc::clone(&table), filter);
                Ok(LogicalOperator::Delete {
                    table,
                    children: vec![child],
                })
            }
            Stmt::DropTable(_) => Err(Error::Unimplemented("drop table")),
        }
    }

    #[inline]
    fn scan(table: Arc<Table>, filter: CompositeConditionFilter) -> LogicalOperator {
        let get = LogicalOperator::TableGet {
            table,
            mode: ReadWriteMode::ReadWrite,
        };
        if filter.is_empty() {
            get
        } else {
            LogicalOperator::Predicate {
                filter,
                child: Box::new(get),
            }
        }
    }
}

/// Converts logical operators one to one into physical operators.
pub struct PhysicalPlanGenerator;

impl PhysicalPlanGenerator {
    #[inline]
    pub fn create<'a>(oper: LogicalOperator) -> Result<PhysicalOperator<'a>> {
        match oper {
            LogicalOperator::TableGet { table, mode } => Ok(PhysicalOperator::TableScan(
                TableScanOperator::new(table, mode),
            )),
            LogicalOperator::Predicate { filter, child } => {
                let child = Self::create(*child)?;
                Ok(PhysicalOperator::Predicate(PredicateOperator::new(
                    filter, child,
                )))
            }
            LogicalOperator::Update {
                table,
                targets,
                children,
            } => {
                let mut oper = UpdateOperator::new(table, targets);
                for child in children {
                    oper.add_child(Self::create(child)?);
                }
                Ok(PhysicalOperator::Update(oper))
            }
            LogicalOperator::Delete { table, children } => {
                let mut oper = DeleteOperator::new(table);
                for child in children {
                    oper.add_child(Self::create(child)?);
                }
                Ok(PhysicalOperator::Delete(oper))
            }
        }
    }
}
