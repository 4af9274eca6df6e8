use crate::error::{Error, Result};
use crate::operator::{LogicalPlanGenerator, Operator, PhysicalOperator, PhysicalPlanGenerator};
use crate::stmt::Stmt;
use crate::trx::Trx;

/// Execute a bound mutation statement within the transaction and return
/// number of affected rows.
///
/// The first error aborts the statement. Rows changed before the error
/// stay changed in the transaction, only the transaction rollback can
/// undo them. The plan is always closed before returning.
#[inline]
pub fn execute(stmt: Stmt, trx: &Trx) -> Result<usize> {
    let kind = stmt.kind();
    if let Stmt::DropTable(drop) = &stmt {
        log::warn!("drop table {} is not supported", drop.table_name());
        return Err(Error::Unimplemented("drop table"));
    }
    let logical = LogicalPlanGenerator::create(stmt)?;
    let mut oper = PhysicalPlanGenerator::create(logical)?;
    let res = drain(&mut oper, trx);
    let close_res = oper.close();
    match res {
        Ok(affected_rows) => {
            close_res?;
            log::debug!("{} affected {} rows", kind, affected_rows);
            Ok(affected_rows)
        }
        Err(e) => {
            log::warn!(
                "{} aborted after {} rows: {}",
                kind,
                oper.affected_rows(),
                e
            );
            Err(e)
        }
    }
}

#[inline]
fn drain<'a>(oper: &mut PhysicalOperator<'a>, trx: &'a Trx) -> Result<usize> {
    oper.open(trx)?;
    while oper.next()? {}
    Ok(oper.affected_rows())
}
